// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lifecycle boundary for Plotdesk.
//!
//! [`LifecycleCoordinator`] is the only writer of bookings. It turns caller
//! intent into validated transitions, writes them with compare-and-swap and
//! hands each committed change to a [`LifecycleNotifier`].
//! [`ReadModelProjector`] answers dashboard queries from the same store.

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
#![allow(clippy::multiple_crate_versions)]

mod coordinator;
mod dashboard;
mod error;
mod notifier;
mod request_response;

#[cfg(test)]
mod tests;

pub use coordinator::{Clock, LifecycleCoordinator, WorkerResponse};
pub use dashboard::{DashboardCounts, ReadModelProjector, scope_filter, sort_by_recent_activity};
pub use error::{
    LifecycleError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use notifier::{LifecycleNotifier, NoopNotifier};
pub use request_response::{
    AmendBookingRequest, AssignmentRequest, BookingListResponse, BookingResponse,
    CreateBookingRequest, DEFAULT_RECENT_LIMIT, DeclineBookingRequest, HistoryResponse,
    ListBookingsQuery, ProgressRequest, RespondRequest,
};
