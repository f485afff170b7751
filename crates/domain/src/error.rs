// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
///
/// These cover malformed input only. Transition refusals are not errors at
/// this layer; see [`crate::Decision`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required field was missing or blank.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },
    /// A field was present but its value is not acceptable.
    #[error("Invalid value for '{field}': {message}")]
    InvalidField {
        /// The name of the offending field.
        field: &'static str,
        /// A human-readable description of the problem.
        message: String,
    },
    /// A booking status string could not be parsed.
    #[error("Invalid booking status: '{0}'")]
    InvalidStatus(String),
    /// A role string could not be parsed.
    #[error("Invalid role: '{0}'")]
    InvalidRole(String),
}

impl DomainError {
    /// Returns the name of the field this error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => field,
            Self::InvalidStatus(_) => "status",
            Self::InvalidRole(_) => "role",
        }
    }
}
