// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Normalizes a free-form role string: trimmed, lowercase, `-` separated.
///
/// Portals have historically sent `gis-expert`, `GIS_Expert` and `gis expert`
/// for the same role.
fn normalize_role(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

/// A store-assigned booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(i64);

impl BookingId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of worker a booking can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerRole {
    /// A field surveyor.
    Surveyor,
    /// A GIS expert.
    GisExpert,
}

impl WorkerRole {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Surveyor => "surveyor",
            Self::GisExpert => "gis-expert",
        }
    }

    /// Returns the wording used in user-facing messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Surveyor => "surveyor",
            Self::GisExpert => "GIS expert",
        }
    }
}

impl FromStr for WorkerRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_role(s).as_str() {
            "surveyor" => Ok(Self::Surveyor),
            "gis-expert" | "gisexpert" | "gis" => Ok(Self::GisExpert),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role an authenticated caller acts in.
///
/// Supplied by the auth collaborator and trusted as authenticated; the
/// transition validator still checks it against each requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorRole {
    /// A client who books surveys.
    Client,
    /// A field surveyor.
    Surveyor,
    /// A GIS expert.
    GisExpert,
    /// A marketplace administrator.
    Admin,
}

impl ActorRole {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Surveyor => "surveyor",
            Self::GisExpert => "gis-expert",
            Self::Admin => "admin",
        }
    }

    /// Returns the worker role this actor acts as, if it is a worker.
    #[must_use]
    pub const fn as_worker_role(&self) -> Option<WorkerRole> {
        match self {
            Self::Surveyor => Some(WorkerRole::Surveyor),
            Self::GisExpert => Some(WorkerRole::GisExpert),
            Self::Client | Self::Admin => None,
        }
    }
}

impl From<WorkerRole> for ActorRole {
    fn from(role: WorkerRole) -> Self {
        match role {
            WorkerRole::Surveyor => Self::Surveyor,
            WorkerRole::GisExpert => Self::GisExpert,
        }
    }
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_role(s).as_str() {
            "client" => Ok(Self::Client),
            "admin" => Ok(Self::Admin),
            _ => WorkerRole::from_str(s)
                .map(Self::from)
                .map_err(|_| DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The binding of a booking to a specific worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    /// The worker's identifier as supplied by the auth collaborator.
    pub worker_id: String,
    /// The capacity the worker was assigned in.
    pub role: WorkerRole,
}

impl Assignment {
    /// Creates a new assignment.
    #[must_use]
    pub const fn new(worker_id: String, role: WorkerRole) -> Self {
        Self { worker_id, role }
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.worker_id, self.role)
    }
}

/// A WGS84 latitude/longitude pair attached at creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair after range-checking both components.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidField {
                field: "latitude",
                message: format!("{latitude} is outside -90..=90"),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidField {
                field: "longitude",
                message: format!("{longitude} is outside -180..=180"),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// The descriptive part of a booking supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPayload {
    /// The kind of survey requested (e.g. "topographic", "boundary").
    pub survey_type: String,
    /// Free-form site location.
    pub location: String,
    /// Additional detail from the client. May be empty.
    pub description: String,
    /// The date the client would like the work done.
    pub preferred_date: Date,
}

impl BookingPayload {
    /// Creates a payload without validating it.
    ///
    /// Use [`crate::validate_payload`] before accepting one from a caller.
    #[must_use]
    pub const fn new(
        survey_type: String,
        location: String,
        description: String,
        preferred_date: Date,
    ) -> Self {
        Self {
            survey_type,
            location,
            description,
            preferred_date,
        }
    }
}
