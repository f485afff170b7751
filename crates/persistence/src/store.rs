// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotdesk::{Booking, NewBooking};
use plotdesk_domain::{BookingId, BookingStatus, WorkerRole};

use crate::error::PersistenceError;

/// Criteria for [`BookingStore::list`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Only bookings owned by this client.
    pub client_id: Option<String>,
    /// Only bookings currently assigned to this worker.
    pub assigned_worker_id: Option<String>,
    /// Only bookings currently assigned in this role.
    pub assigned_role: Option<WorkerRole>,
    /// Only bookings in this status.
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    /// Matches every booking.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches bookings owned by `client_id`.
    #[must_use]
    pub fn for_client(client_id: &str) -> Self {
        Self {
            client_id: Some(client_id.to_string()),
            ..Self::default()
        }
    }

    /// Matches bookings assigned to `worker_id` in `role`.
    #[must_use]
    pub fn for_worker(worker_id: &str, role: WorkerRole) -> Self {
        Self {
            assigned_worker_id: Some(worker_id.to_string()),
            assigned_role: Some(role),
            ..Self::default()
        }
    }

    /// Narrows the filter to one status.
    #[must_use]
    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Durable, versioned storage for bookings and their history.
///
/// Implementations must make [`BookingStore::put`] an atomic
/// compare-and-swap: the booking row and its new history entries commit
/// together, and only if the stored version still equals the expected one.
pub trait BookingStore: Send + Sync {
    /// Stores a new booking and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking cannot be written.
    fn insert(&self, booking: NewBooking) -> Result<Booking, PersistenceError>;

    /// Loads a booking with its full history.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if the booking does not exist.
    fn get(&self, booking_id: BookingId) -> Result<Booking, PersistenceError>;

    /// Replaces a booking if its stored version is `expected_version`,
    /// appending any history entries not yet stored.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if another write got there first, or
    /// `BookingNotFound` if the booking does not exist.
    fn put(&self, booking: &Booking, expected_version: u64) -> Result<(), PersistenceError>;

    /// Returns every booking matching `filter` as one consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the bookings cannot be read.
    fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, PersistenceError>;
}
