// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking transition rules.
//!
//! This module is the single definition of the legal booking state graph and
//! of who may move a booking along it:
//!
//! ```text
//! Pending                      --assign(admin)-->    Assigned
//! Assigned                     --accept(worker)-->   Accepted
//! Assigned                     --reject(worker)-->   Pending   (worker cleared)
//! Accepted                     --start(worker)-->    InProgress
//! InProgress                   --complete(worker)--> Completed
//! Assigned|Accepted|InProgress --reassign(admin)-->  Assigned  (new worker)
//! Pending                      --amend(client)-->    Pending
//! Pending                      --decline(admin)-->   Rejected
//! ```
//!
//! Validation never fails with an error: every outcome is a [`Decision`].

use crate::status::BookingStatus;
use crate::types::{ActorRole, Assignment};
use serde::{Deserialize, Serialize};

/// A requested change to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Bind a pending booking to a worker.
    Assign(Assignment),
    /// The assigned worker takes the job.
    Accept,
    /// The assigned worker turns the job down.
    Reject,
    /// The assigned worker begins fieldwork.
    Start,
    /// The assigned worker finishes the job.
    Complete,
    /// Move an active booking to a different worker.
    Reassign(Assignment),
    /// The owning client edits the payload before assignment.
    Amend,
    /// An admin closes a pending booking without fulfilling it.
    Decline,
}

/// Who is entitled to request a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Authority {
    Admin,
    AssignedWorker,
    OwningClient,
}

impl Transition {
    /// Returns the short action name used in audit records and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Assign(_) => "assign",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Reassign(_) => "reassign",
            Self::Amend => "amend",
            Self::Decline => "decline",
        }
    }

    const fn past_participle(&self) -> &'static str {
        match self {
            Self::Assign(_) => "assigned",
            Self::Accept => "accepted",
            Self::Reject => "rejected",
            Self::Start => "started",
            Self::Complete => "completed",
            Self::Reassign(_) => "reassigned",
            Self::Amend => "amended",
            Self::Decline => "declined",
        }
    }

    /// Returns the status a booking has after this transition succeeds.
    #[must_use]
    pub const fn target_status(&self) -> BookingStatus {
        match self {
            Self::Assign(_) | Self::Reassign(_) => BookingStatus::Assigned,
            Self::Accept => BookingStatus::Accepted,
            Self::Reject | Self::Amend => BookingStatus::Pending,
            Self::Start => BookingStatus::InProgress,
            Self::Complete => BookingStatus::Completed,
            Self::Decline => BookingStatus::Rejected,
        }
    }

    /// Returns the statuses this transition may be requested from.
    #[must_use]
    pub const fn allowed_from(&self) -> &'static [BookingStatus] {
        match self {
            Self::Assign(_) | Self::Amend | Self::Decline => &[BookingStatus::Pending],
            Self::Accept | Self::Reject => &[BookingStatus::Assigned],
            Self::Start => &[BookingStatus::Accepted],
            Self::Complete => &[BookingStatus::InProgress],
            Self::Reassign(_) => &[
                BookingStatus::Assigned,
                BookingStatus::Accepted,
                BookingStatus::InProgress,
            ],
        }
    }

    const fn authority(&self) -> Authority {
        match self {
            Self::Assign(_) | Self::Reassign(_) | Self::Decline => Authority::Admin,
            Self::Accept | Self::Reject | Self::Start | Self::Complete => {
                Authority::AssignedWorker
            }
            Self::Amend => Authority::OwningClient,
        }
    }
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The actor has the right role but is not the party the booking names.
    WrongActor,
    /// The actor's role may not request this transition.
    WrongRole,
    /// The booking's current status does not permit this transition.
    InvalidFromState,
    /// The caller's view of the booking is out of date.
    StaleVersion,
    /// A worker action was requested on a booking with no assigned worker.
    NotAssigned,
}

impl DenialReason {
    /// Returns the stable machine-readable code for this reason.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::WrongActor => "wrong_actor",
            Self::WrongRole => "wrong_role",
            Self::InvalidFromState => "invalid_from_state",
            Self::StaleVersion => "stale_version",
            Self::NotAssigned => "not_assigned",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A refused transition with its user-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// The reason category callers branch on.
    pub reason: DenialReason,
    /// A stable, human-readable explanation.
    pub message: String,
}

impl Denial {
    fn new(reason: DenialReason, message: String) -> Self {
        Self { reason, message }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The outcome of validating a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    /// The transition may be applied.
    Allowed,
    /// The transition must not be applied.
    Denied(Denial),
}

impl Decision {
    /// Returns true if the transition is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the denial reason, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(denial) => Some(denial.reason),
        }
    }

    /// Converts the decision into a `Result` for `?` propagation.
    ///
    /// # Errors
    ///
    /// Returns the denial if the transition was refused.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(denial) => Err(denial),
        }
    }
}

/// The slice of booking state the validator needs.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// The booking's current status.
    pub status: BookingStatus,
    /// The booking's current assignment, if any.
    pub assignment: Option<&'a Assignment>,
    /// The owning client.
    pub client_id: &'a str,
    /// The booking's current version.
    pub current_version: u64,
}

/// Decides whether `actor_id` acting as `actor_role` may apply `transition`.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. `expected_version` must equal the current version (`StaleVersion`)
/// 2. terminal bookings accept nothing (`InvalidFromState`)
/// 3. the actor must hold the authority the transition requires
///    (`WrongRole`, `WrongActor`, `NotAssigned`)
/// 4. the current status must be one the transition starts from
///    (`InvalidFromState`)
pub fn validate_transition(
    ctx: &TransitionContext<'_>,
    transition: &Transition,
    actor_id: &str,
    actor_role: ActorRole,
    expected_version: u64,
) -> Decision {
    if expected_version != ctx.current_version {
        return Decision::Denied(Denial::new(
            DenialReason::StaleVersion,
            String::from("This booking has been updated since you loaded it; refresh and try again"),
        ));
    }

    if ctx.status.is_terminal() {
        return Decision::Denied(Denial::new(
            DenialReason::InvalidFromState,
            format!(
                "This booking is {} and can no longer be changed",
                ctx.status.label()
            ),
        ));
    }

    if let Some(denial) = check_authority(ctx, transition, actor_id, actor_role) {
        return Decision::Denied(denial);
    }

    if !transition.allowed_from().contains(&ctx.status) {
        return Decision::Denied(Denial::new(
            DenialReason::InvalidFromState,
            format!(
                "A booking that is {} cannot be {}",
                ctx.status.label(),
                transition.past_participle()
            ),
        ));
    }

    Decision::Allowed
}

fn check_authority(
    ctx: &TransitionContext<'_>,
    transition: &Transition,
    actor_id: &str,
    actor_role: ActorRole,
) -> Option<Denial> {
    let action: &str = transition.name();
    match transition.authority() {
        Authority::Admin => (actor_role != ActorRole::Admin).then(|| {
            Denial::new(
                DenialReason::WrongRole,
                format!("Only an admin can {action} this booking"),
            )
        }),
        Authority::OwningClient => {
            let message = || format!("Only the client who created this booking can {action} it");
            if actor_role != ActorRole::Client {
                Some(Denial::new(DenialReason::WrongRole, message()))
            } else if actor_id != ctx.client_id {
                Some(Denial::new(DenialReason::WrongActor, message()))
            } else {
                None
            }
        }
        Authority::AssignedWorker => {
            let Some(assignment) = ctx.assignment else {
                return Some(Denial::new(
                    DenialReason::NotAssigned,
                    format!(
                        "This booking is not assigned to a worker and cannot be {}",
                        transition.past_participle()
                    ),
                ));
            };
            let message = format!(
                "Only the assigned {} can {action} this booking",
                assignment.role.label()
            );
            match actor_role.as_worker_role() {
                None => Some(Denial::new(DenialReason::WrongRole, message)),
                Some(role) if role != assignment.role => {
                    Some(Denial::new(DenialReason::WrongRole, message))
                }
                Some(_) if assignment.worker_id != actor_id => {
                    Some(Denial::new(DenialReason::WrongActor, message))
                }
                Some(_) => None,
            }
        }
    }
}

/// Decides whether `actor_id` acting as `actor_role` may open a booking for
/// `client_id`.
///
/// Clients may only book for themselves; admins may book on behalf of any
/// client.
pub fn validate_creation(client_id: &str, actor_id: &str, actor_role: ActorRole) -> Decision {
    match actor_role {
        ActorRole::Admin => Decision::Allowed,
        ActorRole::Client if actor_id == client_id => Decision::Allowed,
        ActorRole::Client => Decision::Denied(Denial::new(
            DenialReason::WrongActor,
            String::from("A client can only create bookings for themselves"),
        )),
        ActorRole::Surveyor | ActorRole::GisExpert => Decision::Denied(Denial::new(
            DenialReason::WrongRole,
            String::from("Only a client or an admin can create a booking"),
        )),
    }
}
