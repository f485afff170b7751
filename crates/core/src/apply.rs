// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{Booking, LifecyclePolicy, NewBooking, TransitionResult};
use plotdesk_audit::{Actor, HistoryEntry, LifecycleEvent};
use plotdesk_domain::{
    BookingPayload, BookingStatus, Coordinates, DomainError, Transition, validate_actor_id,
    validate_creation, validate_payload, validate_transition,
};
use time::OffsetDateTime;

/// Validates a booking request and prepares it for insertion.
///
/// # Arguments
///
/// * `actor` - The actor opening the booking
/// * `client_id` - The client the booking belongs to
/// * `payload` - The descriptive payload
/// * `coordinates` - Optional site coordinates
/// * `now` - The creation timestamp
///
/// # Errors
///
/// Returns an error if:
/// - `client_id` is blank or the payload fails field validation
/// - The actor is neither an admin nor the client named by `client_id`
pub fn create(
    actor: &Actor,
    client_id: String,
    payload: BookingPayload,
    coordinates: Option<Coordinates>,
    now: OffsetDateTime,
) -> Result<NewBooking, CoreError> {
    validate_actor_id("client_id", &client_id)?;
    validate_payload(&payload)?;
    validate_creation(&client_id, &actor.id, actor.role).into_result()?;

    Ok(NewBooking {
        client_id,
        payload,
        coordinates,
        created_at: now,
    })
}

/// Applies a command to a booking, producing the next booking and its event.
///
/// The input booking is never modified. On success the returned booking has
/// the target status, a version one higher, and exactly one new history
/// entry.
///
/// # Arguments
///
/// * `booking` - The booking as last read from the store
/// * `command` - The change being requested
/// * `actor` - The actor requesting it
/// * `expected_version` - The version the actor based the request on
/// * `now` - The timestamp recorded in the history entry
/// * `policy` - Determines whether the result is escalated
///
/// # Errors
///
/// Returns an error if:
/// - A field in the command fails validation
/// - The transition validator denies the change
/// - A reassignment names the worker already assigned
pub fn apply(
    booking: &Booking,
    command: Command,
    actor: &Actor,
    expected_version: u64,
    now: OffsetDateTime,
    policy: &LifecyclePolicy,
) -> Result<TransitionResult, CoreError> {
    match &command {
        Command::AssignWorker { assignment } | Command::Reassign { assignment } => {
            validate_actor_id("worker_id", &assignment.worker_id)?;
        }
        Command::Amend { payload } => validate_payload(payload)?,
        Command::Accept
        | Command::Reject
        | Command::StartWork
        | Command::CompleteWork
        | Command::Decline { .. } => {}
    }

    let transition: Transition = command.transition();
    validate_transition(
        &booking.transition_context(),
        &transition,
        &actor.id,
        actor.role,
        expected_version,
    )
    .into_result()?;

    let from_status: BookingStatus = booking.status;
    let mut next: Booking = booking.clone();
    next.status = transition.target_status();
    next.version = booking.version + 1;

    let note: Option<String> = match command {
        Command::AssignWorker { assignment } => {
            let note: String = format!("assigned to {assignment}");
            next.assignment = Some(assignment);
            Some(note)
        }
        Command::Reassign { assignment } => {
            let previous: String = match &booking.assignment {
                Some(current) if *current == assignment => {
                    return Err(CoreError::DomainViolation(DomainError::InvalidField {
                        field: "worker_id",
                        message: format!("booking is already assigned to {assignment}"),
                    }));
                }
                Some(current) => current.to_string(),
                None => String::from("nobody"),
            };
            let note: String = format!("reassigned from {previous} to {assignment}");
            next.assignment = Some(assignment);
            Some(note)
        }
        Command::Reject => {
            next.assignment = None;
            next.rejection_count = booking.rejection_count.saturating_add(1);
            Some(format!(
                "{} rejected the job (rejection {})",
                actor.id, next.rejection_count
            ))
        }
        Command::Amend { payload } => {
            next.payload = payload;
            Some(String::from("booking details amended"))
        }
        Command::Decline { reason } => reason.filter(|r| !r.trim().is_empty()),
        Command::Accept | Command::StartWork | Command::CompleteWork => None,
    };

    next.history.push(HistoryEntry::new(
        now,
        actor,
        from_status,
        next.status,
        note,
    ));

    let event: LifecycleEvent = LifecycleEvent {
        booking_id: next.id,
        action: String::from(transition.name()),
        from_status: Some(from_status),
        to_status: next.status,
        actor_id: actor.id.clone(),
        actor_role: actor.role,
        version: next.version,
        escalated: next.is_escalated(policy),
        occurred_at: now,
    };

    Ok(TransitionResult {
        new_booking: next,
        event,
    })
}
