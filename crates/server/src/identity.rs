// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity extraction for the server.
//!
//! Authentication happens upstream. The gateway in front of this server
//! forwards the authenticated caller as two headers, which are trusted as
//! given and turned into an audit [`Actor`] here.

use std::str::FromStr;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use plotdesk_audit::Actor;
use plotdesk_domain::{ActorRole, validate_actor_id};
use tracing::{debug, warn};

use crate::ErrorResponse;

/// Header carrying the caller's identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the calling actor.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     ActorIdentity(actor): ActorIdentity,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: Actor
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects the request with:
/// - 401 Unauthorized if either header is missing or not valid text
/// - 400 Bad Request if the role is not recognized or the id is blank
pub struct ActorIdentity(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for ActorIdentity {
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id: &str = header_value(parts, ACTOR_ID_HEADER)?;
        let role: &str = header_value(parts, ACTOR_ROLE_HEADER)?;

        validate_actor_id("actor_id", actor_id).map_err(|e| {
            warn!(error = %e, "Rejected blank actor id");
            IdentityError::InvalidIdentity(e.to_string())
        })?;
        let role: ActorRole = ActorRole::from_str(role).map_err(|e| {
            warn!(role = %role, "Rejected unknown actor role");
            IdentityError::InvalidIdentity(e.to_string())
        })?;

        debug!(actor_id = %actor_id, role = %role, "Caller identified");
        Ok(Self(Actor::new(actor_id.to_string(), role)))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, IdentityError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing identity header");
            IdentityError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Identity header is not valid text");
            IdentityError::MissingHeader(name)
        })
}

/// Identity extraction errors.
///
/// These are converted to HTTP responses automatically.
#[derive(Debug)]
pub enum IdentityError {
    /// A required identity header was absent or unreadable.
    MissingHeader(&'static str),
    /// The identity headers were present but not acceptable.
    InvalidIdentity(String),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::MissingHeader(name) => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                format!("Missing or unreadable '{name}' header"),
            ),
            Self::InvalidIdentity(reason) => (StatusCode::BAD_REQUEST, "validation", reason),
        };

        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            code: String::from(code),
            message,
            retryable: false,
        });
        (status, body).into_response()
    }
}
