// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The lifecycle coordinator.
//!
//! Every write to a booking goes through [`LifecycleCoordinator`]. Each
//! transition reads the booking, validates the request against what was
//! read, builds the next state with one history entry, and writes it back
//! with a compare-and-swap on the version it read. A lost race is retried
//! against fresh state up to [`LifecyclePolicy::max_attempts`] times.

use std::str::FromStr;
use std::sync::Arc;

use plotdesk::{
    Booking, Command, CoreError, LifecyclePolicy, NewBooking, TransitionResult, apply, create,
};
use plotdesk_audit::{Actor, HistoryEntry, LifecycleEvent};
use plotdesk_domain::{
    Assignment, BookingId, BookingPayload, BookingStatus, Coordinates, DenialReason, DomainError,
};
use plotdesk_persistence::{BookingFilter, BookingStore, PersistenceError};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{
    LifecycleError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notifier::{LifecycleNotifier, NoopNotifier};

/// Source of transition timestamps.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// How an assigned worker answers an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerResponse {
    /// Take the job.
    Accept,
    /// Turn the job down and return it to the pending pool.
    Reject,
}

impl FromStr for WorkerResponse {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" | "accepted" => Ok(Self::Accept),
            "reject" | "rejected" => Ok(Self::Reject),
            _ => Err(DomainError::InvalidField {
                field: "response",
                message: format!("'{s}' is not one of accept, reject"),
            }),
        }
    }
}

/// Coordinates every booking write.
pub struct LifecycleCoordinator<S: BookingStore> {
    store: Arc<S>,
    policy: LifecyclePolicy,
    notifier: Arc<dyn LifecycleNotifier>,
    clock: Clock,
}

impl<S: BookingStore> LifecycleCoordinator<S> {
    /// Creates a coordinator that writes through `store` and discards
    /// lifecycle events.
    #[must_use]
    pub fn new(store: Arc<S>, policy: LifecyclePolicy) -> Self {
        Self {
            store,
            policy,
            notifier: Arc::new(NoopNotifier),
            clock: Arc::new(OffsetDateTime::now_utc),
        }
    }

    /// Replaces the event notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn LifecycleNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the clock used to timestamp history entries.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the policy this coordinator applies.
    #[must_use]
    pub const fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Opens a new booking in `Pending` at version 1.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client id or payload is invalid
    /// - The actor is neither an admin nor the client named by `client_id`
    /// - The store cannot be written
    pub fn create_booking(
        &self,
        actor: &Actor,
        client_id: String,
        payload: BookingPayload,
        coordinates: Option<Coordinates>,
    ) -> Result<Booking, LifecycleError> {
        let now: OffsetDateTime = (self.clock)();
        let new_booking: NewBooking =
            create(actor, client_id, payload, coordinates, now).map_err(translate_core_error)?;

        let booking: Booking = self
            .store
            .insert(new_booking)
            .map_err(translate_persistence_error)?;

        info!(
            booking_id = %booking.id,
            client_id = %booking.client_id,
            actor = %actor,
            "Booking created"
        );
        self.dispatch(&booking.creation_event(actor));
        Ok(booking)
    }

    /// Assigns a pending booking to a worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment is refused, the caller's version
    /// is stale, or the store fails.
    pub fn assign_worker(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        assignment: Assignment,
    ) -> Result<Booking, LifecycleError> {
        self.transition(
            actor,
            booking_id,
            expected_version,
            &Command::AssignWorker { assignment },
        )
    }

    /// Records the assigned worker's answer to an assignment.
    ///
    /// A rejection returns the booking to `Pending`, clears the worker and
    /// counts toward escalation.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not the assigned worker, the booking
    /// is not awaiting an answer, the caller's version is stale, or the store
    /// fails.
    pub fn worker_respond(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        response: WorkerResponse,
    ) -> Result<Booking, LifecycleError> {
        let command: Command = match response {
            WorkerResponse::Accept => Command::Accept,
            WorkerResponse::Reject => Command::Reject,
        };
        self.transition(actor, booking_id, expected_version, &command)
    }

    /// Moves an accepted booking forward one step.
    ///
    /// Progress is sequential: `InProgress` follows `Accepted` and
    /// `Completed` follows `InProgress`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `target` is not `InProgress` or
    /// `Completed`, and otherwise the same errors as any transition.
    pub fn advance_progress(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        target: BookingStatus,
    ) -> Result<Booking, LifecycleError> {
        let command: Command = match target {
            BookingStatus::InProgress => Command::StartWork,
            BookingStatus::Completed => Command::CompleteWork,
            other => {
                return Err(translate_domain_error(DomainError::InvalidField {
                    field: "status",
                    message: format!(
                        "progress can only move to in_progress or completed, not {}",
                        other.as_str()
                    ),
                }));
            }
        };
        self.transition(actor, booking_id, expected_version, &command)
    }

    /// Moves a booking to a different worker in one step.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the new worker is the one already
    /// assigned, and otherwise the same errors as any transition.
    pub fn reassign(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        assignment: Assignment,
    ) -> Result<Booking, LifecycleError> {
        self.transition(
            actor,
            booking_id,
            expected_version,
            &Command::Reassign { assignment },
        )
    }

    /// Replaces the payload of a pending booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is invalid, the actor is not the
    /// owning client, or the booking is no longer pending.
    pub fn amend_booking(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        payload: BookingPayload,
    ) -> Result<Booking, LifecycleError> {
        self.transition(
            actor,
            booking_id,
            expected_version,
            &Command::Amend { payload },
        )
    }

    /// Closes a pending booking without fulfilling it.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin or the booking is not
    /// pending.
    pub fn decline_booking(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        reason: Option<String>,
    ) -> Result<Booking, LifecycleError> {
        self.transition(
            actor,
            booking_id,
            expected_version,
            &Command::Decline { reason },
        )
    }

    /// Loads the authoritative record of a booking.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the booking does not exist.
    pub fn get_booking(&self, booking_id: BookingId) -> Result<Booking, LifecycleError> {
        self.store
            .get(booking_id)
            .map_err(translate_persistence_error)
    }

    /// Loads a booking's history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the booking does not exist.
    pub fn booking_history(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<HistoryEntry>, LifecycleError> {
        Ok(self.get_booking(booking_id)?.history)
    }

    /// Lists bookings matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, LifecycleError> {
        self.store.list(filter).map_err(translate_persistence_error)
    }

    /// Runs one transition through read, validate, compare-and-swap.
    ///
    /// The caller's version is checked against the first read only. After a
    /// lost race the command is validated again against the fresh booking at
    /// its fresh version, so the retry may be denied by the new state.
    fn transition(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        expected_version: u64,
        command: &Command,
    ) -> Result<Booking, LifecycleError> {
        let mut caller_version: Option<u64> = Some(expected_version);
        let mut attempt: u32 = 1;

        loop {
            let current: Booking = self.get_booking(booking_id)?;
            let based_on: u64 = caller_version.take().unwrap_or(current.version);

            let result: TransitionResult = match apply(
                &current,
                command.clone(),
                actor,
                based_on,
                (self.clock)(),
                &self.policy,
            ) {
                Ok(result) => result,
                Err(CoreError::Denied(denial)) if denial.reason == DenialReason::StaleVersion => {
                    warn!(
                        booking_id = %booking_id,
                        expected_version = based_on,
                        current_version = current.version,
                        actor = %actor,
                        "Rejected request based on a stale version"
                    );
                    return Err(LifecycleError::Conflict {
                        booking_id,
                        current_version: current.version,
                        message: denial.message,
                    });
                }
                Err(err) => return Err(translate_core_error(err)),
            };

            match self.store.put(&result.new_booking, current.version) {
                Ok(()) => {
                    info!(
                        booking_id = %booking_id,
                        action = %result.event.action,
                        from = %current.status,
                        to = %result.new_booking.status,
                        version = result.new_booking.version,
                        actor = %actor,
                        "Booking transition committed"
                    );
                    self.dispatch(&result.event);
                    return Ok(result.new_booking);
                }
                Err(PersistenceError::VersionConflict { actual, .. })
                    if attempt < self.policy.max_attempts =>
                {
                    warn!(
                        booking_id = %booking_id,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        stored_version = actual,
                        "Lost compare-and-swap race, retrying against fresh state"
                    );
                    attempt += 1;
                }
                Err(err) => {
                    if matches!(err, PersistenceError::VersionConflict { .. }) {
                        warn!(
                            booking_id = %booking_id,
                            attempts = attempt,
                            "Giving up after repeated compare-and-swap conflicts"
                        );
                    }
                    return Err(translate_persistence_error(err));
                }
            }
        }
    }

    fn dispatch(&self, event: &LifecycleEvent) {
        debug!(
            booking_id = %event.booking_id,
            action = %event.action,
            escalated = event.escalated,
            "Dispatching lifecycle event"
        );
        self.notifier.notify(event);
    }
}
