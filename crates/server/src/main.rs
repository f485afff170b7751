// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod extract;
mod identity;
mod live;


use axum::{
    Json, Router,
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use plotdesk::{Booking, LifecyclePolicy};
use plotdesk_api::{
    AmendBookingRequest, AssignmentRequest, BookingListResponse, BookingResponse,
    CreateBookingRequest, DEFAULT_RECENT_LIMIT, DashboardCounts, DeclineBookingRequest,
    HistoryResponse, LifecycleCoordinator, LifecycleError, LifecycleNotifier, ListBookingsQuery,
    ProgressRequest, ReadModelProjector, RespondRequest,
};
use plotdesk_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info};

use crate::extract::{BookingPath, JsonBody, QueryParams};
use crate::identity::ActorIdentity;
use crate::live::LiveEventBroadcaster;

/// Plotdesk Server - HTTP server for the Plotdesk booking lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// How many times a transition is attempted before a lost race is
    /// reported as a conflict
    #[arg(long, default_value_t = LifecyclePolicy::DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Rejections after which a pending booking is flagged for an admin
    /// (0 disables escalation)
    #[arg(long, default_value_t = LifecyclePolicy::DEFAULT_ESCALATION_THRESHOLD)]
    escalation_threshold: u32,
}

impl Args {
    /// Builds the lifecycle policy from the command line.
    fn policy(&self) -> LifecyclePolicy {
        LifecyclePolicy::new(
            self.max_attempts,
            (self.escalation_threshold > 0).then_some(self.escalation_threshold),
        )
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The only writer of bookings.
    coordinator: Arc<LifecycleCoordinator<Persistence>>,
    /// Dashboard queries over the same store.
    projector: Arc<ReadModelProjector<Persistence>>,
    /// Fan-out of committed lifecycle events to live clients.
    broadcaster: Arc<LiveEventBroadcaster>,
}

impl AppState {
    /// Wires the coordinator, projector and broadcaster around one store.
    fn new(persistence: Persistence, policy: LifecyclePolicy) -> Self {
        let store: Arc<Persistence> = Arc::new(persistence);
        let broadcaster: Arc<LiveEventBroadcaster> = Arc::new(LiveEventBroadcaster::new());
        let coordinator: LifecycleCoordinator<Persistence> =
            LifecycleCoordinator::new(Arc::clone(&store), policy)
                .with_notifier(Arc::clone(&broadcaster) as Arc<dyn LifecycleNotifier>);

        Self {
            coordinator: Arc::new(coordinator),
            projector: Arc::new(ReadModelProjector::new(store, policy)),
            broadcaster,
        }
    }

    fn booking_response(&self, booking: &Booking) -> BookingResponse {
        BookingResponse::from_booking(booking, self.coordinator.policy())
    }
}

/// Query parameters for the recent items dashboard.
#[derive(Debug, Default, Deserialize)]
struct RecentQuery {
    /// Maximum number of bookings to return.
    limit: Option<usize>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Stable machine-readable error code.
    code: String,
    /// Error message.
    message: String,
    /// True if the request may succeed when repeated after a refresh.
    retryable: bool,
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error code.
    code: &'static str,
    /// The error message.
    message: String,
    /// Whether the caller may retry.
    retryable: bool,
}

impl HttpError {
    /// A malformed request: 400 with code `validation`.
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "validation",
            message: message.into(),
            retryable: false,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            code: String::from(self.code),
            message: self.message,
            retryable: self.retryable,
        });
        (self.status, body).into_response()
    }
}

impl From<LifecycleError> for HttpError {
    fn from(err: LifecycleError) -> Self {
        let status: StatusCode = match &err {
            LifecycleError::Validation { .. } => StatusCode::BAD_REQUEST,
            LifecycleError::Denied { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LifecycleError::NotFound { .. } => StatusCode::NOT_FOUND,
            LifecycleError::Conflict { .. } => StatusCode::CONFLICT,
            LifecycleError::StoreUnavailable { .. } => {
                error!(error = %err, "Booking store failure");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Handler for POST `/bookings` endpoint.
///
/// Opens a new booking.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), HttpError> {
    info!(
        actor = %actor,
        client_id = %req.client_id,
        "Handling create_booking request"
    );

    let payload = req.payload()?;
    let coordinates = req.coordinates()?;
    let booking: Booking =
        app_state
            .coordinator
            .create_booking(&actor, req.client_id, payload, coordinates)?;

    Ok((
        StatusCode::CREATED,
        Json(app_state.booking_response(&booking)),
    ))
}

/// Handler for GET `/bookings` endpoint.
///
/// Lists bookings matching the query filters.
async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    QueryParams(query): QueryParams<ListBookingsQuery>,
) -> Result<Json<BookingListResponse>, HttpError> {
    info!(actor = %actor, ?query, "Handling list_bookings request");

    let bookings: Vec<Booking> = app_state.coordinator.list_bookings(&query.filter()?)?;

    Ok(Json(BookingListResponse::from_bookings(
        &bookings,
        app_state.coordinator.policy(),
    )))
}

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(actor = %actor, booking_id = %booking_id, "Handling get_booking request");

    let booking: Booking = app_state.coordinator.get_booking(booking_id)?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for GET `/bookings/{booking_id}/history` endpoint.
async fn handle_get_history(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
) -> Result<Json<HistoryResponse>, HttpError> {
    info!(actor = %actor, booking_id = %booking_id, "Handling booking_history request");

    let entries = app_state.coordinator.booking_history(booking_id)?;

    Ok(Json(HistoryResponse {
        booking_id,
        entries,
    }))
}

/// Handler for POST `/bookings/{booking_id}/assign` endpoint.
async fn handle_assign(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
    JsonBody(req): JsonBody<AssignmentRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor = %actor,
        booking_id = %booking_id,
        worker_id = %req.worker_id,
        "Handling assign_worker request"
    );

    let assignment = req.assignment()?;
    let booking: Booking = app_state.coordinator.assign_worker(
        &actor,
        booking_id,
        req.expected_version,
        assignment,
    )?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for POST `/bookings/{booking_id}/respond` endpoint.
async fn handle_respond(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
    JsonBody(req): JsonBody<RespondRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor = %actor,
        booking_id = %booking_id,
        response = %req.response,
        "Handling worker_respond request"
    );

    let response = req.response()?;
    let booking: Booking = app_state.coordinator.worker_respond(
        &actor,
        booking_id,
        req.expected_version,
        response,
    )?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for POST `/bookings/{booking_id}/progress` endpoint.
async fn handle_progress(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
    JsonBody(req): JsonBody<ProgressRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor = %actor,
        booking_id = %booking_id,
        status = %req.status,
        "Handling advance_progress request"
    );

    let target = req.target()?;
    let booking: Booking = app_state.coordinator.advance_progress(
        &actor,
        booking_id,
        req.expected_version,
        target,
    )?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for POST `/bookings/{booking_id}/reassign` endpoint.
async fn handle_reassign(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
    JsonBody(req): JsonBody<AssignmentRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor = %actor,
        booking_id = %booking_id,
        worker_id = %req.worker_id,
        "Handling reassign request"
    );

    let assignment = req.assignment()?;
    let booking: Booking =
        app_state
            .coordinator
            .reassign(&actor, booking_id, req.expected_version, assignment)?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for POST `/bookings/{booking_id}/amend` endpoint.
async fn handle_amend(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
    JsonBody(req): JsonBody<AmendBookingRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(actor = %actor, booking_id = %booking_id, "Handling amend_booking request");

    let payload = req.payload()?;
    let booking: Booking = app_state.coordinator.amend_booking(
        &actor,
        booking_id,
        req.expected_version,
        payload,
    )?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for POST `/bookings/{booking_id}/decline` endpoint.
async fn handle_decline(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    BookingPath(booking_id): BookingPath,
    JsonBody(req): JsonBody<DeclineBookingRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(actor = %actor, booking_id = %booking_id, "Handling decline_booking request");

    let booking: Booking = app_state.coordinator.decline_booking(
        &actor,
        booking_id,
        req.expected_version,
        req.reason,
    )?;

    Ok(Json(app_state.booking_response(&booking)))
}

/// Handler for GET `/dashboard/counts` endpoint.
///
/// Counts are scoped to the caller's role.
async fn handle_dashboard_counts(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
) -> Result<Json<DashboardCounts>, HttpError> {
    info!(actor = %actor, "Handling dashboard_counts request");

    let counts: DashboardCounts = app_state.projector.counts(actor.role, &actor.id)?;

    Ok(Json(counts))
}

/// Handler for GET `/dashboard/recent` endpoint.
///
/// Returns the caller's most recently active bookings.
async fn handle_dashboard_recent(
    AxumState(app_state): AxumState<AppState>,
    ActorIdentity(actor): ActorIdentity,
    QueryParams(query): QueryParams<RecentQuery>,
) -> Result<Json<BookingListResponse>, HttpError> {
    let limit: usize = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    info!(actor = %actor, limit, "Handling dashboard_recent request");

    let bookings: Vec<Booking> = app_state
        .projector
        .recent_items(actor.role, &actor.id, limit)?;

    Ok(Json(BookingListResponse::from_bookings(
        &bookings,
        app_state.coordinator.policy(),
    )))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/bookings",
            post(handle_create_booking).get(handle_list_bookings),
        )
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/history", get(handle_get_history))
        .route("/bookings/{booking_id}/assign", post(handle_assign))
        .route("/bookings/{booking_id}/respond", post(handle_respond))
        .route("/bookings/{booking_id}/progress", post(handle_progress))
        .route("/bookings/{booking_id}/reassign", post(handle_reassign))
        .route("/bookings/{booking_id}/amend", post(handle_amend))
        .route("/bookings/{booking_id}/decline", post(handle_decline))
        .route("/dashboard/counts", get(handle_dashboard_counts))
        .route("/dashboard/recent", get(handle_dashboard_recent))
        .route("/live", get(live::handle_live_upgrade))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Plotdesk server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let policy: LifecyclePolicy = args.policy();
    info!(
        max_attempts = policy.max_attempts,
        escalation_threshold = ?policy.escalation_threshold,
        "Lifecycle policy configured"
    );

    let app: Router = build_router(AppState::new(persistence, policy));

    let addr: SocketAddr = SocketAddr::new(args.bind.parse::<IpAddr>()?, args.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
