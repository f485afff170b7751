// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for Plotdesk.
//!
//! This crate stores bookings and their append-only history in `SQLite`
//! through Diesel. It exposes the [`BookingStore`] contract the lifecycle
//! coordinator writes through, and [`Persistence`], the `SQLite`
//! implementation of it.
//!
//! ## Storage modes
//!
//! - **In-memory**: each [`Persistence::new_in_memory`] call gets its own
//!   shared-cache database, so tests are isolated from each other
//! - **File**: [`Persistence::new_with_file`] opens (or creates) a database
//!   file in WAL mode
//!
//! Migrations are embedded and run on open. Foreign key enforcement is
//! verified at startup.
//!
//! ## Concurrency
//!
//! The connection sits behind a mutex that is held for exactly one query or
//! transaction. No lock spans a caller's read-validate-write cycle;
//! concurrent writers are ordered by the compare-and-swap in
//! [`BookingStore::put`].

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

use diesel::SqliteConnection;
use plotdesk::{Booking, NewBooking};
use plotdesk_domain::BookingId;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

use backend::sqlite::StorageMode;
pub use error::PersistenceError;
pub use store::{BookingFilter, BookingStore};

/// Source of unique names for in-memory databases.
static MEMORY_DB_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `SQLite`-backed booking store.
pub struct Persistence {
    conn: Mutex<SqliteConnection>,
}

impl Persistence {
    /// Opens a fresh in-memory database.
    ///
    /// Every call gets its own named shared-cache database, so stores never
    /// see each other's bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let sequence: u64 = MEMORY_DB_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        let url: String = format!("file:plotdesk_bookings_{sequence}?mode=memory&cache=shared");
        Self::open(&url, StorageMode::Memory)
    }

    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8 or the database
    /// cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path: &Path = path.as_ref();
        let url: &str = path.to_str().ok_or_else(|| {
            PersistenceError::InitializationError(format!(
                "Database path {} is not valid UTF-8",
                path.display()
            ))
        })?;
        Self::open(url, StorageMode::File)
    }

    fn open(url: &str, mode: StorageMode) -> Result<Self, PersistenceError> {
        let conn: SqliteConnection = backend::sqlite::open(url, mode)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Re-checks that foreign key enforcement is on for the live connection.
    ///
    /// # Errors
    ///
    /// Returns an error if enforcement is off or the connection lock is
    /// poisoned.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut *self.lock()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl BookingStore for Persistence {
    fn insert(&self, booking: NewBooking) -> Result<Booking, PersistenceError> {
        mutations::insert_booking(&mut *self.lock()?, booking)
    }

    fn get(&self, booking_id: BookingId) -> Result<Booking, PersistenceError> {
        queries::get_booking(&mut *self.lock()?, booking_id)
    }

    fn put(&self, booking: &Booking, expected_version: u64) -> Result<(), PersistenceError> {
        mutations::compare_and_swap(&mut *self.lock()?, booking, expected_version)
    }

    fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, PersistenceError> {
        queries::list_bookings(&mut *self.lock()?, filter)
    }
}
