// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-model projections for dashboards.
//!
//! Every projection is computed from a single `list` call, so the numbers a
//! caller sees always describe one consistent snapshot of the store.

use std::sync::Arc;

use plotdesk::{Booking, LifecyclePolicy};
use plotdesk_domain::{ActorRole, BookingStatus, WorkerRole};
use plotdesk_persistence::{BookingFilter, BookingStore};
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, translate_persistence_error};

/// Summary counts for one dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    /// Bookings in scope that currently have a worker.
    pub total_assigned: usize,
    /// Bookings awaiting action: `Pending` or `Assigned`.
    pub pending_count: usize,
    /// Bookings that are `Completed`.
    pub completed_count: usize,
    /// Bookings being worked: `Accepted` or `InProgress`.
    pub active_count: usize,
    /// Pending bookings that have been rejected often enough to need an admin.
    pub escalated_count: usize,
}

impl DashboardCounts {
    /// Tallies `bookings` under `policy`.
    #[must_use]
    pub fn tally(bookings: &[Booking], policy: &LifecyclePolicy) -> Self {
        bookings.iter().fold(Self::default(), |mut counts, booking| {
            if booking.assignment.is_some() {
                counts.total_assigned += 1;
            }
            match booking.status {
                BookingStatus::Pending | BookingStatus::Assigned => counts.pending_count += 1,
                BookingStatus::Accepted | BookingStatus::InProgress => counts.active_count += 1,
                BookingStatus::Completed => counts.completed_count += 1,
                BookingStatus::Rejected => {}
            }
            if booking.is_escalated(policy) {
                counts.escalated_count += 1;
            }
            counts
        })
    }
}

/// Returns the filter selecting the bookings `actor_id` sees in `role`.
///
/// Clients see their own bookings, workers see bookings currently assigned
/// to them in that role, and admins see everything.
#[must_use]
pub fn scope_filter(role: ActorRole, actor_id: &str) -> BookingFilter {
    match role {
        ActorRole::Client => BookingFilter::for_client(actor_id),
        ActorRole::Surveyor => BookingFilter::for_worker(actor_id, WorkerRole::Surveyor),
        ActorRole::GisExpert => BookingFilter::for_worker(actor_id, WorkerRole::GisExpert),
        ActorRole::Admin => BookingFilter::all(),
    }
}

/// Orders bookings by most recent activity, newest first.
///
/// Ties are broken by id, highest first.
pub fn sort_by_recent_activity(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        b.last_activity()
            .cmp(&a.last_activity())
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Stateless dashboard queries over a booking store.
pub struct ReadModelProjector<S: BookingStore> {
    store: Arc<S>,
    policy: LifecyclePolicy,
}

impl<S: BookingStore> ReadModelProjector<S> {
    /// Creates a projector reading from `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, policy: LifecyclePolicy) -> Self {
        Self { store, policy }
    }

    /// Counts the bookings in scope for `actor_id` acting as `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn counts(
        &self,
        role: ActorRole,
        actor_id: &str,
    ) -> Result<DashboardCounts, LifecycleError> {
        let bookings: Vec<Booking> = self.snapshot(role, actor_id)?;
        Ok(DashboardCounts::tally(&bookings, &self.policy))
    }

    /// Returns up to `limit` bookings in scope, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn recent_items(
        &self,
        role: ActorRole,
        actor_id: &str,
        limit: usize,
    ) -> Result<Vec<Booking>, LifecycleError> {
        let mut bookings: Vec<Booking> = self.snapshot(role, actor_id)?;
        sort_by_recent_activity(&mut bookings);
        bookings.truncate(limit);
        Ok(bookings)
    }

    fn snapshot(&self, role: ActorRole, actor_id: &str) -> Result<Vec<Booking>, LifecycleError> {
        self.store
            .list(&scope_filter(role, actor_id))
            .map_err(translate_persistence_error)
    }
}
