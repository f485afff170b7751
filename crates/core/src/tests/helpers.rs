// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Booking, Command, LifecyclePolicy, NewBooking, TransitionResult, apply};
use plotdesk_audit::Actor;
use plotdesk_domain::{ActorRole, Assignment, BookingId, BookingPayload, WorkerRole};
use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime};

pub const CLIENT_ID: &str = "client-1";
pub const SURVEYOR_ID: &str = "surveyor-1";

pub fn create_test_admin() -> Actor {
    Actor::new(String::from("admin-1"), ActorRole::Admin)
}

pub fn create_test_client() -> Actor {
    Actor::new(String::from(CLIENT_ID), ActorRole::Client)
}

pub fn create_test_surveyor() -> Actor {
    Actor::new(String::from(SURVEYOR_ID), ActorRole::Surveyor)
}

pub fn surveyor_assignment() -> Assignment {
    Assignment::new(String::from(SURVEYOR_ID), WorkerRole::Surveyor)
}

pub fn create_test_payload() -> BookingPayload {
    BookingPayload::new(
        String::from("boundary"),
        String::from("Plot 14, Kiambu Road"),
        String::from("Beacon re-establishment"),
        date!(2026 - 03 - 02),
    )
}

pub fn t0() -> OffsetDateTime {
    datetime!(2026-02-20 08:00:00 UTC)
}

/// Returns `t0` plus `minutes`.
pub fn at(minutes: i64) -> OffsetDateTime {
    t0() + Duration::minutes(minutes)
}

pub fn create_pending_booking() -> Booking {
    NewBooking {
        client_id: String::from(CLIENT_ID),
        payload: create_test_payload(),
        coordinates: None,
        created_at: t0(),
    }
    .into_booking(BookingId::new(1))
}

/// Applies `command` at its own current version, panicking on failure.
pub fn step(booking: &Booking, command: Command, actor: &Actor, minute: i64) -> Booking {
    let result: TransitionResult = apply(
        booking,
        command,
        actor,
        booking.version,
        at(minute),
        &LifecyclePolicy::default(),
    )
    .expect("step should be allowed");
    result.new_booking
}

pub fn create_assigned_booking() -> Booking {
    step(
        &create_pending_booking(),
        Command::AssignWorker {
            assignment: surveyor_assignment(),
        },
        &create_test_admin(),
        1,
    )
}
