// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use plotdesk::{Booking, NewBooking};
use plotdesk_domain::BookingId;
use tracing::{debug, info};

use crate::data_models::{
    BookingChangeset, NewBookingRow, NewHistoryRow, version_from_column, version_to_column,
};
use crate::diesel_schema::{booking_history, bookings};
use crate::error::PersistenceError;

/// Inserts a new booking and returns it with its store-assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    new_booking: NewBooking,
) -> Result<Booking, PersistenceError> {
    let row: NewBookingRow<'_> = NewBookingRow::from_new(&new_booking)?;

    let booking_id: i64 = diesel::insert_into(bookings::table)
        .values(&row)
        .returning(bookings::booking_id)
        .get_result(conn)?;

    info!(booking_id, client_id = %new_booking.client_id, "Booking created");

    Ok(new_booking.into_booking(BookingId::new(booking_id)))
}

/// Writes `booking` only if the stored version is still `expected_version`.
///
/// The row update and the append of every history entry not yet stored
/// happen in one immediate transaction. Either both commit or neither does.
///
/// # Errors
///
/// Returns an error if:
/// - `VersionConflict`: the stored version differs from `expected_version`
/// - `BookingNotFound`: no booking has this id
/// - `InvalidWrite`: the booking does not advance the version, or carries
///   fewer history entries than are already stored
/// - the database operation fails
pub fn compare_and_swap(
    conn: &mut SqliteConnection,
    booking: &Booking,
    expected_version: u64,
) -> Result<(), PersistenceError> {
    if booking.version <= expected_version {
        return Err(PersistenceError::InvalidWrite {
            booking_id: booking.id,
            message: format!(
                "version {} does not advance past {expected_version}",
                booking.version
            ),
        });
    }

    let id: i64 = booking.id.value();
    let expected: i64 = version_to_column(booking.id, expected_version)?;
    let changes: BookingChangeset<'_> = BookingChangeset::from_booking(booking)?;

    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            bookings::table
                .filter(bookings::booking_id.eq(id))
                .filter(bookings::version.eq(expected)),
        )
        .set(&changes)
        .execute(conn)?;

        if updated == 0 {
            let actual: Option<i64> = bookings::table
                .find(id)
                .select(bookings::version)
                .first(conn)
                .optional()?;

            return Err(match actual {
                Some(actual) => PersistenceError::VersionConflict {
                    booking_id: booking.id,
                    expected: expected_version,
                    actual: version_from_column(id, actual)?,
                },
                None => PersistenceError::BookingNotFound(booking.id),
            });
        }

        let stored: i64 = booking_history::table
            .filter(booking_history::booking_id.eq(id))
            .count()
            .get_result(conn)?;
        let stored: usize = stored.to_usize().unwrap_or(usize::MAX);

        if stored > booking.history.len() {
            return Err(PersistenceError::InvalidWrite {
                booking_id: booking.id,
                message: format!(
                    "history has {} entries but {stored} are already stored",
                    booking.history.len()
                ),
            });
        }

        let rows: Vec<NewHistoryRow<'_>> = booking
            .history
            .iter()
            .enumerate()
            .skip(stored)
            .map(|(index, entry)| NewHistoryRow::from_entry(booking.id, index + 1, entry))
            .collect::<Result<_, _>>()?;

        if !rows.is_empty() {
            diesel::insert_into(booking_history::table)
                .values(&rows)
                .execute(conn)?;
        }

        debug!(
            booking_id = id,
            version = booking.version,
            appended = rows.len(),
            "Booking written"
        );
        Ok(())
    })
}
