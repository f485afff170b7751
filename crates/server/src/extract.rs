// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request extractors that reject with the JSON error body.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain text and, for
//! bodies, with 422. Here every malformed request is a 400 `validation`
//! error, leaving 422 to denied transitions.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use plotdesk_domain::BookingId;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::HttpError;

/// JSON request body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(reason = %rejection.body_text(), "Rejected request body");
                Err(HttpError::validation(rejection.body_text()))
            }
        }
    }
}

/// The `{booking_id}` path segment.
pub struct BookingPath(pub BookingId);

impl<S: Send + Sync> FromRequestParts<S> for BookingPath {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<BookingId>::from_request_parts(parts, state).await {
            Ok(Path(booking_id)) => Ok(Self(booking_id)),
            Err(rejection) => {
                warn!(reason = %rejection.body_text(), "Rejected booking id");
                Err(HttpError::validation(format!(
                    "Invalid booking id: {}",
                    rejection.body_text()
                )))
            }
        }
    }
}

/// URL query parameters.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(reason = %rejection.body_text(), "Rejected query string");
                Err(HttpError::validation(rejection.body_text()))
            }
        }
    }
}
