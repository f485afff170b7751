// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::{Actor, HistoryEntry, LifecycleEvent};
use plotdesk_domain::{ActorRole, BookingId, BookingStatus};
use time::OffsetDateTime;
use time::macros::datetime;

fn create_test_admin() -> Actor {
    Actor::new(String::from("admin-1"), ActorRole::Admin)
}

#[test]
fn test_actor_creation_requires_all_fields() {
    let actor: Actor = Actor::new(String::from("surveyor-7"), ActorRole::Surveyor);

    assert_eq!(actor.id, "surveyor-7");
    assert_eq!(actor.role, ActorRole::Surveyor);
    assert_eq!(actor.to_string(), "surveyor-7 (surveyor)");
}

#[test]
fn test_actor_equality() {
    let admin: Actor = create_test_admin();
    let same: Actor = Actor::new(String::from("admin-1"), ActorRole::Admin);
    let as_client: Actor = Actor::new(String::from("admin-1"), ActorRole::Client);

    assert_eq!(admin, same);
    assert_ne!(admin, as_client);
}

#[test]
fn test_history_entry_copies_actor() {
    let at: OffsetDateTime = datetime!(2026-03-02 09:15:00 UTC);
    let entry: HistoryEntry = HistoryEntry::new(
        at,
        &create_test_admin(),
        BookingStatus::Pending,
        BookingStatus::Assigned,
        Some(String::from("assigned to surveyor-7 (surveyor)")),
    );

    assert_eq!(entry.timestamp, at);
    assert_eq!(entry.actor_id, "admin-1");
    assert_eq!(entry.actor_role, ActorRole::Admin);
    assert_eq!(entry.actor(), create_test_admin());
    assert_eq!(entry.from_status, BookingStatus::Pending);
    assert_eq!(entry.to_status, BookingStatus::Assigned);
}

#[test]
fn test_history_entry_serializes_rfc3339_timestamp() {
    let entry: HistoryEntry = HistoryEntry::new(
        datetime!(2026-03-02 09:15:00 UTC),
        &create_test_admin(),
        BookingStatus::Pending,
        BookingStatus::Rejected,
        None,
    );

    let json: serde_json::Value = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["timestamp"], "2026-03-02T09:15:00Z");
    assert_eq!(json["actor_role"], "admin");
    assert_eq!(json["to_status"], "rejected");
    assert!(json["note"].is_null());

    let back: HistoryEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_lifecycle_event_wire_shape() {
    let event: LifecycleEvent = LifecycleEvent {
        booking_id: BookingId::new(42),
        action: String::from("reject"),
        from_status: Some(BookingStatus::Assigned),
        to_status: BookingStatus::Pending,
        actor_id: String::from("gis-3"),
        actor_role: ActorRole::GisExpert,
        version: 6,
        escalated: true,
        occurred_at: datetime!(2026-03-02 10:00:00 UTC),
    };

    let json: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(json["booking_id"], 42);
    assert_eq!(json["from_status"], "assigned");
    assert_eq!(json["to_status"], "pending");
    assert_eq!(json["actor_role"], "gis-expert");
    assert_eq!(json["version"], 6);
    assert_eq!(json["escalated"], true);
}
