// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotdesk_audit::{Actor, HistoryEntry, LifecycleEvent};
use plotdesk_domain::{
    Assignment, BookingId, BookingPayload, BookingStatus, Coordinates, TransitionContext,
};
use time::OffsetDateTime;

/// Tunables for the lifecycle coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// How many times a transition is attempted before a lost
    /// compare-and-swap race is reported as a conflict.
    pub max_attempts: u32,
    /// Rejection count at which a pending booking needs an admin.
    /// `None` disables escalation.
    pub escalation_threshold: Option<u32>,
}

impl LifecyclePolicy {
    /// Default number of write attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default escalation threshold.
    pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 3;

    /// Creates a policy with explicit values.
    ///
    /// A `max_attempts` of zero is treated as one.
    #[must_use]
    pub const fn new(max_attempts: u32, escalation_threshold: Option<u32>) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            escalation_threshold,
        }
    }

    /// Returns true if a booking in `status` with `rejection_count`
    /// rejections should be flagged for an admin.
    #[must_use]
    pub const fn is_escalated(&self, status: BookingStatus, rejection_count: u32) -> bool {
        match self.escalation_threshold {
            Some(threshold) => {
                matches!(status, BookingStatus::Pending) && rejection_count >= threshold
            }
            None => false,
        }
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_ATTEMPTS,
            Some(Self::DEFAULT_ESCALATION_THRESHOLD),
        )
    }
}

/// A booking that has been validated but not yet stored.
///
/// The store assigns the identifier on insert; see [`NewBooking::into_booking`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    /// The owning client.
    pub client_id: String,
    /// The descriptive payload.
    pub payload: BookingPayload,
    /// Optional site coordinates.
    pub coordinates: Option<Coordinates>,
    /// When the booking was opened.
    pub created_at: OffsetDateTime,
}

impl NewBooking {
    /// Materializes the stored form of this booking under `id`.
    ///
    /// A fresh booking is `Pending`, unassigned, at version 1 and has no
    /// history.
    #[must_use]
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            client_id: self.client_id,
            payload: self.payload,
            coordinates: self.coordinates,
            status: BookingStatus::Pending,
            assignment: None,
            version: 1,
            rejection_count: 0,
            history: Vec::new(),
            created_at: self.created_at,
        }
    }
}

/// The authoritative record of one survey booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Store-assigned identifier. Immutable.
    pub id: BookingId,
    /// The owning client. Immutable.
    pub client_id: String,
    /// The descriptive payload. Editable only while pending.
    pub payload: BookingPayload,
    /// Optional site coordinates set at creation.
    pub coordinates: Option<Coordinates>,
    /// The current lifecycle status.
    pub status: BookingStatus,
    /// The current worker, present exactly when the status requires one.
    pub assignment: Option<Assignment>,
    /// Optimistic concurrency version. Equals `history.len() + 1`.
    pub version: u64,
    /// How many times a worker has rejected this booking.
    pub rejection_count: u32,
    /// Append-only transition log, oldest first.
    pub history: Vec<HistoryEntry>,
    /// When the booking was opened.
    pub created_at: OffsetDateTime,
}

impl Booking {
    /// Returns the slice of state the transition validator needs.
    #[must_use]
    pub fn transition_context(&self) -> TransitionContext<'_> {
        TransitionContext {
            status: self.status,
            assignment: self.assignment.as_ref(),
            client_id: &self.client_id,
            current_version: self.version,
        }
    }

    /// Returns the time of the most recent change, or the creation time for
    /// a booking that has never transitioned.
    #[must_use]
    pub fn last_activity(&self) -> OffsetDateTime {
        self.history
            .last()
            .map_or(self.created_at, |entry| entry.timestamp)
    }

    /// Returns true if the booking needs an admin under `policy`.
    #[must_use]
    pub const fn is_escalated(&self, policy: &LifecyclePolicy) -> bool {
        policy.is_escalated(self.status, self.rejection_count)
    }

    /// Returns true if the stored fields agree with each other.
    ///
    /// Checks that an assignment is present exactly when the status requires
    /// one and that the version matches the history length.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.status.requires_assignment() == self.assignment.is_some()
            && u64::try_from(self.history.len()).is_ok_and(|len| self.version == len + 1)
    }

    /// Builds the event announcing that this booking was just created.
    #[must_use]
    pub fn creation_event(&self, actor: &Actor) -> LifecycleEvent {
        LifecycleEvent {
            booking_id: self.id,
            action: String::from("create"),
            from_status: None,
            to_status: self.status,
            actor_id: actor.id.clone(),
            actor_role: actor.role,
            version: self.version,
            escalated: false,
            occurred_at: self.created_at,
        }
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The booking after the transition, with the new history entry appended.
    pub new_booking: Booking,
    /// The event to announce once the new booking is stored.
    pub event: LifecycleEvent,
}
