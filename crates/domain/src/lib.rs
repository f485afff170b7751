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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod status;
mod transition;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use status::BookingStatus;
pub use transition::{
    Decision, Denial, DenialReason, Transition, TransitionContext, validate_creation,
    validate_transition,
};
pub use types::{ActorRole, Assignment, BookingId, BookingPayload, Coordinates, WorkerRole};
pub use validation::{
    MAX_DESCRIPTION_LEN, MAX_SHORT_FIELD_LEN, parse_preferred_date, validate_actor_id,
    validate_payload,
};
