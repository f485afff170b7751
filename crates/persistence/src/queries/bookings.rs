// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.
//!
//! Each query loads bookings together with their full history inside one
//! read transaction, so a caller never sees a booking row paired with
//! history from a different commit.

use diesel::SqliteConnection;
use diesel::prelude::*;
use plotdesk::Booking;
use plotdesk_audit::HistoryEntry;
use plotdesk_domain::BookingId;
use std::collections::HashMap;
use tracing::debug;

use crate::data_models::{BookingRow, HistoryRow};
use crate::diesel_schema::{booking_history, bookings};
use crate::error::PersistenceError;
use crate::store::BookingFilter;

/// Booking ids bound per history query. `SQLite` caps the number of bound
/// parameters in one statement, and bookings are never deleted.
const HISTORY_BATCH_SIZE: usize = 500;

/// Loads the history of every booking in `booking_ids`, grouped by booking
/// and ordered oldest first.
fn load_history(
    conn: &mut SqliteConnection,
    booking_ids: &[i64],
) -> Result<HashMap<i64, Vec<HistoryEntry>>, PersistenceError> {
    let mut grouped: HashMap<i64, Vec<HistoryEntry>> = HashMap::new();
    for batch in booking_ids.chunks(HISTORY_BATCH_SIZE) {
        let rows: Vec<HistoryRow> = booking_history::table
            .filter(booking_history::booking_id.eq_any(batch))
            .order((
                booking_history::booking_id.asc(),
                booking_history::sequence.asc(),
            ))
            .select(HistoryRow::as_select())
            .load(conn)?;

        for row in rows {
            let booking_id: i64 = row.booking_id;
            grouped
                .entry(booking_id)
                .or_default()
                .push(row.into_entry()?);
        }
    }
    Ok(grouped)
}

/// Retrieves one booking with its history.
///
/// # Errors
///
/// Returns `BookingNotFound` if no booking has this id, or an error if the
/// query fails or the stored row cannot be decoded.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Booking, PersistenceError> {
    debug!(%booking_id, "Loading booking");

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let row: Option<BookingRow> = bookings::table
            .find(booking_id.value())
            .select(BookingRow::as_select())
            .first(conn)
            .optional()?;

        let Some(row) = row else {
            return Err(PersistenceError::BookingNotFound(booking_id));
        };

        let history: Vec<HistoryEntry> = load_history(conn, &[row.booking_id])?
            .remove(&row.booking_id)
            .unwrap_or_default();

        row.into_booking(history)
    })
}

/// Lists the bookings matching `filter`, ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row cannot be decoded.
pub fn list_bookings(
    conn: &mut SqliteConnection,
    filter: &BookingFilter,
) -> Result<Vec<Booking>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let mut query = bookings::table
            .select(BookingRow::as_select())
            .into_boxed();

        if let Some(client_id) = &filter.client_id {
            query = query.filter(bookings::client_id.eq(client_id.as_str()));
        }
        if let Some(worker_id) = &filter.assigned_worker_id {
            query = query.filter(bookings::assigned_worker_id.eq(worker_id.as_str()));
        }
        if let Some(role) = filter.assigned_role {
            query = query.filter(bookings::assigned_role.eq(role.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(bookings::status.eq(status.as_str()));
        }

        let rows: Vec<BookingRow> = query.order(bookings::booking_id.asc()).load(conn)?;

        let ids: Vec<i64> = rows.iter().map(|row| row.booking_id).collect();
        let mut history: HashMap<i64, Vec<HistoryEntry>> = load_history(conn, &ids)?;

        debug!(count = rows.len(), "Listed bookings");

        rows.into_iter()
            .map(|row| {
                let entries: Vec<HistoryEntry> =
                    history.remove(&row.booking_id).unwrap_or_default();
                row.into_booking(entries)
            })
            .collect()
    })
}
