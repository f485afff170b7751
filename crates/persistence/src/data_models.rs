// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions to and from domain values.
//!
//! Timestamps are stored as RFC 3339 text and preferred dates as
//! `YYYY-MM-DD`. Integer columns are converted with checked `num-traits`
//! conversions so an out-of-range value surfaces as an error instead of
//! wrapping.

use diesel::prelude::*;
use num_traits::ToPrimitive;
use plotdesk::{Booking, NewBooking};
use plotdesk_audit::HistoryEntry;
use plotdesk_domain::{
    ActorRole, Assignment, BookingId, BookingPayload, BookingStatus, Coordinates, WorkerRole,
    parse_preferred_date,
};
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{booking_history, bookings};
use crate::error::PersistenceError;

/// Formats a timestamp for storage.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(format!("timestamp {at}: {e}")))
}

fn format_date(date: time::Date) -> Result<String, PersistenceError> {
    date.format(time::macros::format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(format!("date {date}: {e}")))
}

fn corrupt(booking_id: i64, message: String) -> PersistenceError {
    PersistenceError::CorruptRecord {
        booking_id,
        message,
    }
}

fn parse_timestamp(
    booking_id: i64,
    column: &str,
    value: &str,
) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| corrupt(booking_id, format!("{column} '{value}': {e}")))
}

fn parse_column<T: FromStr>(
    booking_id: i64,
    column: &str,
    value: &str,
) -> Result<T, PersistenceError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| corrupt(booking_id, format!("{column}: {e}")))
}

/// Converts a version to its column value.
pub fn version_to_column(booking_id: BookingId, version: u64) -> Result<i64, PersistenceError> {
    version.to_i64().ok_or_else(|| PersistenceError::InvalidWrite {
        booking_id,
        message: format!("version {version} does not fit in a BIGINT column"),
    })
}

/// Converts a version column back to a domain version.
pub fn version_from_column(booking_id: i64, version: i64) -> Result<u64, PersistenceError> {
    version
        .to_u64()
        .ok_or_else(|| corrupt(booking_id, format!("negative version {version}")))
}

/// A full `bookings` row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookingRow {
    pub booking_id: i64,
    pub client_id: String,
    pub survey_type: String,
    pub location: String,
    pub description: String,
    pub preferred_date: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub assigned_worker_id: Option<String>,
    pub assigned_role: Option<String>,
    pub rejection_count: i32,
    pub version: i64,
    pub created_at: String,
}

impl BookingRow {
    /// Rebuilds the domain booking from this row and its history.
    pub fn into_booking(self, history: Vec<HistoryEntry>) -> Result<Booking, PersistenceError> {
        let id: i64 = self.booking_id;

        let preferred_date: time::Date = parse_preferred_date(&self.preferred_date)
            .map_err(|e| corrupt(id, e.to_string()))?;

        let coordinates: Option<Coordinates> = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(
                Coordinates::new(latitude, longitude).map_err(|e| corrupt(id, e.to_string()))?,
            ),
            (None, None) => None,
            _ => return Err(corrupt(id, String::from("only one coordinate is set"))),
        };

        let assignment: Option<Assignment> = match (self.assigned_worker_id, self.assigned_role) {
            (Some(worker_id), Some(role)) => Some(Assignment::new(
                worker_id,
                parse_column::<WorkerRole>(id, "assigned_role", &role)?,
            )),
            (None, None) => None,
            _ => {
                return Err(corrupt(
                    id,
                    String::from("assigned worker and role must be set together"),
                ));
            }
        };

        let rejection_count: u32 = self
            .rejection_count
            .to_u32()
            .ok_or_else(|| corrupt(id, format!("rejection_count {}", self.rejection_count)))?;

        Ok(Booking {
            id: BookingId::new(id),
            client_id: self.client_id,
            payload: BookingPayload::new(
                self.survey_type,
                self.location,
                self.description,
                preferred_date,
            ),
            coordinates,
            status: parse_column::<BookingStatus>(id, "status", &self.status)?,
            assignment,
            version: version_from_column(id, self.version)?,
            rejection_count,
            history,
            created_at: parse_timestamp(id, "created_at", &self.created_at)?,
        })
    }
}

/// A `booking_history` row without its surrogate key or sequence.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = booking_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HistoryRow {
    pub booking_id: i64,
    pub recorded_at: String,
    pub actor_id: String,
    pub actor_role: String,
    pub from_status: String,
    pub to_status: String,
    pub note: Option<String>,
}

impl HistoryRow {
    /// Converts this row into a history entry.
    pub fn into_entry(self) -> Result<HistoryEntry, PersistenceError> {
        let id: i64 = self.booking_id;
        Ok(HistoryEntry {
            timestamp: parse_timestamp(id, "recorded_at", &self.recorded_at)?,
            actor_id: self.actor_id,
            actor_role: parse_column::<ActorRole>(id, "actor_role", &self.actor_role)?,
            from_status: parse_column::<BookingStatus>(id, "from_status", &self.from_status)?,
            to_status: parse_column::<BookingStatus>(id, "to_status", &self.to_status)?,
            note: self.note,
        })
    }
}

/// Values for inserting a new booking.
#[derive(Debug, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow<'a> {
    pub client_id: &'a str,
    pub survey_type: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub preferred_date: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: &'static str,
    pub rejection_count: i32,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl<'a> NewBookingRow<'a> {
    /// Builds the insert values for a fresh booking.
    pub fn from_new(booking: &'a NewBooking) -> Result<Self, PersistenceError> {
        let created_at: String = format_timestamp(booking.created_at)?;
        Ok(Self {
            client_id: &booking.client_id,
            survey_type: &booking.payload.survey_type,
            location: &booking.payload.location,
            description: &booking.payload.description,
            preferred_date: format_date(booking.payload.preferred_date)?,
            latitude: booking.coordinates.map(|c| c.latitude()),
            longitude: booking.coordinates.map(|c| c.longitude()),
            status: BookingStatus::Pending.as_str(),
            rejection_count: 0,
            version: 1,
            updated_at: created_at.clone(),
            created_at,
        })
    }
}

/// The mutable columns of a booking, written by a compare-and-swap update.
///
/// `None` clears a column, so an unassigned booking writes NULL worker
/// columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub struct BookingChangeset<'a> {
    pub survey_type: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub preferred_date: String,
    pub status: &'static str,
    pub assigned_worker_id: Option<&'a str>,
    pub assigned_role: Option<&'static str>,
    pub rejection_count: i32,
    pub version: i64,
    pub updated_at: String,
}

impl<'a> BookingChangeset<'a> {
    /// Builds the update for `booking`.
    pub fn from_booking(booking: &'a Booking) -> Result<Self, PersistenceError> {
        let rejection_count: i32 = booking.rejection_count.to_i32().ok_or_else(|| {
            PersistenceError::InvalidWrite {
                booking_id: booking.id,
                message: format!("rejection count {} is too large", booking.rejection_count),
            }
        })?;

        Ok(Self {
            survey_type: &booking.payload.survey_type,
            location: &booking.payload.location,
            description: &booking.payload.description,
            preferred_date: format_date(booking.payload.preferred_date)?,
            status: booking.status.as_str(),
            assigned_worker_id: booking.assignment.as_ref().map(|a| a.worker_id.as_str()),
            assigned_role: booking.assignment.as_ref().map(|a| a.role.as_str()),
            rejection_count,
            version: version_to_column(booking.id, booking.version)?,
            updated_at: format_timestamp(booking.last_activity())?,
        })
    }
}

/// Values for appending one history entry.
#[derive(Debug, Insertable)]
#[diesel(table_name = booking_history)]
pub struct NewHistoryRow<'a> {
    pub booking_id: i64,
    pub sequence: i32,
    pub recorded_at: String,
    pub actor_id: &'a str,
    pub actor_role: &'static str,
    pub from_status: &'static str,
    pub to_status: &'static str,
    pub note: Option<&'a str>,
}

impl<'a> NewHistoryRow<'a> {
    /// Builds the insert values for the entry at 1-based `sequence`.
    pub fn from_entry(
        booking_id: BookingId,
        sequence: usize,
        entry: &'a HistoryEntry,
    ) -> Result<Self, PersistenceError> {
        let sequence: i32 = sequence
            .to_i32()
            .ok_or_else(|| PersistenceError::InvalidWrite {
                booking_id,
                message: format!("history sequence {sequence} is too large"),
            })?;

        Ok(Self {
            booking_id: booking_id.value(),
            sequence,
            recorded_at: format_timestamp(entry.timestamp)?,
            actor_id: &entry.actor_id,
            actor_role: entry.actor_role.as_str(),
            from_status: entry.from_status.as_str(),
            to_status: entry.to_status.as_str(),
            note: entry.note.as_deref(),
        })
    }
}
