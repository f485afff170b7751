// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::BookingPayload;
use time::Date;

/// Maximum length, in characters, of `survey_type` and `location`.
pub const MAX_SHORT_FIELD_LEN: usize = 200;

/// Maximum length, in characters, of `description`.
pub const MAX_DESCRIPTION_LEN: usize = 4000;

fn require_text(field: &'static str, value: &str, max_len: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { field });
    }
    check_length(field, value, max_len)
}

fn check_length(field: &'static str, value: &str, max_len: usize) -> Result<(), DomainError> {
    let len: usize = value.chars().count();
    if len > max_len {
        return Err(DomainError::InvalidField {
            field,
            message: format!("must be at most {max_len} characters (got {len})"),
        });
    }
    Ok(())
}

/// Validates the descriptive fields of a booking payload.
///
/// Only field-level constraints are checked here; whether the caller may
/// create or amend the booking is decided by the transition validator.
///
/// # Errors
///
/// Returns an error if:
/// - `survey_type` or `location` is blank or too long
/// - `description` is too long
pub fn validate_payload(payload: &BookingPayload) -> Result<(), DomainError> {
    require_text("survey_type", &payload.survey_type, MAX_SHORT_FIELD_LEN)?;
    require_text("location", &payload.location, MAX_SHORT_FIELD_LEN)?;
    check_length("description", &payload.description, MAX_DESCRIPTION_LEN)?;
    Ok(())
}

/// Validates an actor or worker identifier.
///
/// # Errors
///
/// Returns an error if the identifier is blank.
pub fn validate_actor_id(field: &'static str, id: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::MissingField { field });
    }
    Ok(())
}

/// Parses a preferred date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns an error if the string is blank or not a valid calendar date.
pub fn parse_preferred_date(value: &str) -> Result<Date, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField {
            field: "preferred_date",
        });
    }
    Date::parse(
        value.trim(),
        time::macros::format_description!("[year]-[month]-[day]"),
    )
    .map_err(|e| DomainError::InvalidField {
        field: "preferred_date",
        message: format!("'{value}' is not a YYYY-MM-DD date: {e}"),
    })
}
