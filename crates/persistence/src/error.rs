// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotdesk_domain::BookingId;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Database connection failed.
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    /// Initialization error.
    #[error("Initialization error: {0}")]
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
    /// A thread panicked while holding the connection.
    #[error("Database connection lock is poisoned")]
    LockPoisoned,
    /// The requested booking does not exist.
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),
    /// A compare-and-swap write found a different version than expected.
    #[error("Booking {booking_id} is at version {actual}, expected {expected}")]
    VersionConflict {
        /// The booking being written.
        booking_id: BookingId,
        /// The version the writer based its change on.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },
    /// A write was rejected before reaching the database.
    #[error("Invalid write for booking {booking_id}: {message}")]
    InvalidWrite {
        /// The booking being written.
        booking_id: BookingId,
        /// What was wrong with the write.
        message: String,
    },
    /// A stored row could not be converted back into a booking.
    #[error("Stored booking {booking_id} is invalid: {message}")]
    CorruptRecord {
        /// The raw identifier of the offending row.
        booking_id: i64,
        /// What could not be decoded.
        message: String,
    },
    /// A value could not be encoded for storage.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PersistenceError {
    /// Returns true if the error reflects an infrastructure problem rather
    /// than the state of a particular booking.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::DatabaseConnectionFailed(_)
                | Self::MigrationFailed(_)
                | Self::InitializationError(_)
                | Self::ForeignKeyEnforcementNotEnabled
                | Self::LockPoisoned
        )
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
