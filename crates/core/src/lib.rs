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

//! The booking state machine.
//!
//! Everything here is pure: [`create`] and [`apply`] take the current state
//! and return the next one without touching storage. The lifecycle
//! coordinator in `plotdesk-api` is responsible for reading, writing and
//! retrying.

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, create};
pub use command::Command;
pub use error::CoreError;
pub use state::{Booking, LifecyclePolicy, NewBooking, TransitionResult};
