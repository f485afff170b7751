// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use plotdesk_domain::{ActorRole, BookingId, BookingStatus};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
///
/// The identity and role are supplied by the auth collaborator and are
/// trusted as authenticated. Whether the actor may perform a given action is
/// decided by the transition validator, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role the actor is acting in.
    pub role: ActorRole,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role the actor is acting in
    #[must_use]
    pub const fn new(id: String, role: ActorRole) -> Self {
        Self { id, role }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}

/// One entry in a booking's append-only history.
///
/// Every successful transition produces exactly one entry. Entries are never
/// edited or reordered once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the transition was applied.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Who applied it.
    pub actor_id: String,
    /// The role they acted in.
    pub actor_role: ActorRole,
    /// The status before the transition.
    pub from_status: BookingStatus,
    /// The status after the transition.
    pub to_status: BookingStatus,
    /// Free-form detail, such as the worker involved or a decline reason.
    pub note: Option<String>,
}

impl HistoryEntry {
    /// Creates a new history entry attributed to `actor`.
    #[must_use]
    pub fn new(
        timestamp: OffsetDateTime,
        actor: &Actor,
        from_status: BookingStatus,
        to_status: BookingStatus,
        note: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            actor_id: actor.id.clone(),
            actor_role: actor.role,
            from_status,
            to_status,
            note,
        }
    }

    /// Returns the actor that recorded this entry.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.actor_id.clone(), self.actor_role)
    }
}

/// A committed change announced to notification subscribers.
///
/// Emitted after the store has accepted the write, so subscribers never see
/// an event for a change that did not persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// The booking that changed.
    pub booking_id: BookingId,
    /// The action that was applied (e.g. "create", "assign", "reject").
    pub action: String,
    /// The status before the change. `None` for a newly created booking.
    pub from_status: Option<BookingStatus>,
    /// The status after the change.
    pub to_status: BookingStatus,
    /// Who applied the change.
    pub actor_id: String,
    /// The role they acted in.
    pub actor_role: ActorRole,
    /// The booking version after the change.
    pub version: u64,
    /// Whether the booking has been rejected often enough to need an admin.
    pub escalated: bool,
    /// When the change was applied.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}
