// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests carry raw strings as they arrive from callers and are parsed
//! into domain values here, so every boundary reports malformed input the
//! same way.

use std::str::FromStr;

use plotdesk::{Booking, LifecyclePolicy};
use plotdesk_audit::HistoryEntry;
use plotdesk_domain::{
    Assignment, BookingId, BookingPayload, BookingStatus, Coordinates, DomainError, WorkerRole,
    parse_preferred_date,
};
use plotdesk_persistence::BookingFilter;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::coordinator::WorkerResponse;
use crate::error::{LifecycleError, translate_domain_error};

/// Number of recent items returned when the caller does not ask for a limit.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

fn parse_payload(
    survey_type: &str,
    location: &str,
    description: &str,
    preferred_date: &str,
) -> Result<BookingPayload, LifecycleError> {
    let preferred_date: time::Date =
        parse_preferred_date(preferred_date).map_err(translate_domain_error)?;
    Ok(BookingPayload::new(
        survey_type.to_string(),
        location.to_string(),
        description.to_string(),
        preferred_date,
    ))
}

fn parse_worker_role(role: &str) -> Result<WorkerRole, LifecycleError> {
    WorkerRole::from_str(role).map_err(translate_domain_error)
}

/// API request to open a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// The client the booking belongs to.
    pub client_id: String,
    /// The kind of survey requested.
    pub survey_type: String,
    /// Free-form site location.
    pub location: String,
    /// Additional detail. May be empty.
    #[serde(default)]
    pub description: String,
    /// Preferred date as `YYYY-MM-DD`.
    pub preferred_date: String,
    /// Optional site latitude. Must be given together with `longitude`.
    pub latitude: Option<f64>,
    /// Optional site longitude. Must be given together with `latitude`.
    pub longitude: Option<f64>,
}

impl CreateBookingRequest {
    /// Parses the descriptive payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the preferred date is malformed.
    pub fn payload(&self) -> Result<BookingPayload, LifecycleError> {
        parse_payload(
            &self.survey_type,
            &self.location,
            &self.description,
            &self.preferred_date,
        )
    }

    /// Parses the optional site coordinates.
    ///
    /// # Errors
    ///
    /// Returns a validation error if only one component is given or either
    /// is out of range.
    pub fn coordinates(&self) -> Result<Option<Coordinates>, LifecycleError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude)
                .map(Some)
                .map_err(translate_domain_error),
            (None, None) => Ok(None),
            (Some(_), None) => Err(translate_domain_error(DomainError::MissingField {
                field: "longitude",
            })),
            (None, Some(_)) => Err(translate_domain_error(DomainError::MissingField {
                field: "latitude",
            })),
        }
    }
}

/// API request to assign or reassign a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    /// The version the caller last saw.
    pub expected_version: u64,
    /// The worker to assign.
    pub worker_id: String,
    /// The capacity the worker is assigned in.
    pub role: String,
}

impl AssignmentRequest {
    /// Parses the requested assignment.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the role is not a worker role.
    pub fn assignment(&self) -> Result<Assignment, LifecycleError> {
        Ok(Assignment::new(
            self.worker_id.clone(),
            parse_worker_role(&self.role)?,
        ))
    }
}

/// API request for a worker to accept or reject an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondRequest {
    /// The version the caller last saw.
    pub expected_version: u64,
    /// `accept` or `reject`.
    pub response: String,
}

impl RespondRequest {
    /// Parses the worker's answer.
    ///
    /// # Errors
    ///
    /// Returns a validation error for anything but accept or reject.
    pub fn response(&self) -> Result<WorkerResponse, LifecycleError> {
        WorkerResponse::from_str(&self.response).map_err(translate_domain_error)
    }
}

/// API request to advance work on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRequest {
    /// The version the caller last saw.
    pub expected_version: u64,
    /// The target status, `in_progress` or `completed`.
    pub status: String,
}

impl ProgressRequest {
    /// Parses the target status.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the status is not recognized.
    pub fn target(&self) -> Result<BookingStatus, LifecycleError> {
        BookingStatus::from_str(&self.status).map_err(translate_domain_error)
    }
}

/// API request to amend a pending booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendBookingRequest {
    /// The version the caller last saw.
    pub expected_version: u64,
    /// The kind of survey requested.
    pub survey_type: String,
    /// Free-form site location.
    pub location: String,
    /// Additional detail. May be empty.
    #[serde(default)]
    pub description: String,
    /// Preferred date as `YYYY-MM-DD`.
    pub preferred_date: String,
}

impl AmendBookingRequest {
    /// Parses the replacement payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the preferred date is malformed.
    pub fn payload(&self) -> Result<BookingPayload, LifecycleError> {
        parse_payload(
            &self.survey_type,
            &self.location,
            &self.description,
            &self.preferred_date,
        )
    }
}

/// API request for an admin to decline a pending booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineBookingRequest {
    /// The version the caller last saw.
    pub expected_version: u64,
    /// Optional explanation recorded in the history.
    pub reason: Option<String>,
}

/// Query parameters for listing bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBookingsQuery {
    /// Only bookings owned by this client.
    pub client_id: Option<String>,
    /// Only bookings assigned to this worker.
    pub worker_id: Option<String>,
    /// Only bookings assigned in this role.
    pub role: Option<String>,
    /// Only bookings in this status.
    pub status: Option<String>,
}

impl ListBookingsQuery {
    /// Builds the store filter.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the role or status is not recognized.
    pub fn filter(&self) -> Result<BookingFilter, LifecycleError> {
        Ok(BookingFilter {
            client_id: self.client_id.clone(),
            assigned_worker_id: self.worker_id.clone(),
            assigned_role: self.role.as_deref().map(parse_worker_role).transpose()?,
            status: self
                .status
                .as_deref()
                .map(BookingStatus::from_str)
                .transpose()
                .map_err(translate_domain_error)?,
        })
    }
}

/// A booking as presented to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingResponse {
    /// The booking identifier.
    pub booking_id: BookingId,
    /// The owning client.
    pub client_id: String,
    /// The kind of survey requested.
    pub survey_type: String,
    /// Free-form site location.
    pub location: String,
    /// Additional detail.
    pub description: String,
    /// Preferred date as `YYYY-MM-DD`.
    pub preferred_date: String,
    /// Site coordinates, if known.
    pub coordinates: Option<Coordinates>,
    /// The current status.
    pub status: BookingStatus,
    /// The status as shown to people.
    pub status_label: String,
    /// The assigned worker, if any.
    pub assigned_worker_id: Option<String>,
    /// The capacity the worker is assigned in, if any.
    pub assigned_role: Option<WorkerRole>,
    /// The version to send back with the next change.
    pub version: u64,
    /// How many times a worker has rejected this booking.
    pub rejection_count: u32,
    /// True if the booking needs an admin.
    pub escalated: bool,
    /// When the booking was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the booking last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity_at: OffsetDateTime,
}

impl BookingResponse {
    /// Builds the response for `booking` under `policy`.
    #[must_use]
    pub fn from_booking(booking: &Booking, policy: &LifecyclePolicy) -> Self {
        Self {
            booking_id: booking.id,
            client_id: booking.client_id.clone(),
            survey_type: booking.payload.survey_type.clone(),
            location: booking.payload.location.clone(),
            description: booking.payload.description.clone(),
            preferred_date: booking.payload.preferred_date.to_string(),
            coordinates: booking.coordinates,
            status: booking.status,
            status_label: String::from(booking.status.label()),
            assigned_worker_id: booking.assignment.as_ref().map(|a| a.worker_id.clone()),
            assigned_role: booking.assignment.as_ref().map(|a| a.role),
            version: booking.version,
            rejection_count: booking.rejection_count,
            escalated: booking.is_escalated(policy),
            created_at: booking.created_at,
            last_activity_at: booking.last_activity(),
        }
    }
}

/// A list of bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingListResponse {
    /// The bookings, in the order the query defines.
    pub bookings: Vec<BookingResponse>,
}

impl BookingListResponse {
    /// Builds the response for `bookings` under `policy`.
    #[must_use]
    pub fn from_bookings(bookings: &[Booking], policy: &LifecyclePolicy) -> Self {
        Self {
            bookings: bookings
                .iter()
                .map(|booking| BookingResponse::from_booking(booking, policy))
                .collect(),
        }
    }
}

/// A booking's transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// The booking identifier.
    pub booking_id: BookingId,
    /// History entries, oldest first.
    pub entries: Vec<HistoryEntry>,
}
