// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the coordinator boundary.

use plotdesk::CoreError;
use plotdesk_domain::{BookingId, DenialReason, DomainError};
use plotdesk_persistence::PersistenceError;

/// Errors returned by lifecycle operations.
///
/// These are distinct from domain, core and persistence errors and represent
/// the contract callers branch on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Input failed field validation.
    #[error("Invalid input for field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The transition was refused for a business reason.
    #[error("{message}")]
    Denied {
        /// The reason category.
        reason: DenialReason,
        /// A stable, human-readable explanation.
        message: String,
    },
    /// The booking changed underneath the caller.
    ///
    /// Callers should reload the booking and decide again.
    #[error("Booking {booking_id} was changed concurrently: {message}")]
    Conflict {
        /// The booking being changed.
        booking_id: BookingId,
        /// The latest version the coordinator observed.
        current_version: u64,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The booking does not exist.
    #[error("Booking {booking_id} not found")]
    NotFound {
        /// The requested booking.
        booking_id: BookingId,
    },
    /// The booking store could not serve the request.
    #[error("Booking store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the underlying failure.
        message: String,
    },
}

impl LifecycleError {
    /// Returns true if repeating the request may succeed.
    ///
    /// A conflict succeeds once the caller refreshes; an unavailable store
    /// may recover. Validation failures, denials and missing bookings do not
    /// change on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::StoreUnavailable { .. })
    }

    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Denied { reason, .. } => reason.code(),
            Self::Conflict { .. } => "conflict",
            Self::NotFound { .. } => "not_found",
            Self::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}

/// Translates a domain error into a lifecycle error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> LifecycleError {
    LifecycleError::Validation {
        field: String::from(err.field()),
        message: err.to_string(),
    }
}

/// Translates a core error into a lifecycle error.
///
/// A stale version is not special-cased here; the coordinator turns it into
/// a conflict because only it knows the version it read.
#[must_use]
pub fn translate_core_error(err: CoreError) -> LifecycleError {
    match err {
        CoreError::DomainViolation(domain_error) => translate_domain_error(domain_error),
        CoreError::Denied(denial) => LifecycleError::Denied {
            reason: denial.reason,
            message: denial.message,
        },
    }
}

/// Translates a persistence error into a lifecycle error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> LifecycleError {
    match err {
        PersistenceError::BookingNotFound(booking_id) => LifecycleError::NotFound { booking_id },
        PersistenceError::VersionConflict {
            booking_id,
            expected,
            actual,
        } => LifecycleError::Conflict {
            booking_id,
            current_version: actual,
            message: format!(
                "expected version {expected} but another change moved it to {actual}"
            ),
        },
        other => LifecycleError::StoreUnavailable {
            message: other.to_string(),
        },
    }
}
