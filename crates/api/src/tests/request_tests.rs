// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for request parsing, response shapes and error translation.

use plotdesk::{Booking, CoreError, LifecyclePolicy};
use plotdesk_domain::{
    Assignment, BookingId, BookingStatus, DenialReason, DomainError, WorkerRole,
};
use plotdesk_persistence::{BookingFilter, PersistenceError};
use time::macros::date;

use crate::{
    AmendBookingRequest, AssignmentRequest, BookingResponse, CreateBookingRequest,
    LifecycleError, ListBookingsQuery, ProgressRequest, RespondRequest, WorkerResponse,
    translate_core_error, translate_persistence_error,
};

use super::helpers::{CLIENT_ID, create_assigned_booking, create_test_coordinator};

fn create_request() -> CreateBookingRequest {
    CreateBookingRequest {
        client_id: String::from(CLIENT_ID),
        survey_type: String::from("topographic"),
        location: String::from("Plot 7"),
        description: String::new(),
        preferred_date: String::from("2026-06-01"),
        latitude: None,
        longitude: None,
    }
}

fn validation_field(err: LifecycleError) -> String {
    match err {
        LifecycleError::Validation { field, .. } => field,
        other => panic!("Expected Validation error, got: {other:?}"),
    }
}

#[test]
fn test_create_request_parses_payload() {
    let request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
        "client_id": CLIENT_ID,
        "survey_type": "topographic",
        "location": "Plot 7",
        "preferred_date": "2026-06-01",
    }))
    .unwrap();

    let payload = request.payload().unwrap();
    assert_eq!(payload.preferred_date, date!(2026 - 06 - 01));
    assert_eq!(payload.description, "");
    assert_eq!(request.coordinates().unwrap(), None);
}

#[test]
fn test_create_request_rejects_bad_date() {
    let mut request: CreateBookingRequest = create_request();
    request.preferred_date = String::from("01/06/2026");

    assert_eq!(validation_field(request.payload().unwrap_err()), "preferred_date");
}

#[test]
fn test_create_request_requires_both_coordinates() {
    let mut request: CreateBookingRequest = create_request();
    request.latitude = Some(-1.3);

    assert_eq!(validation_field(request.coordinates().unwrap_err()), "longitude");

    request.longitude = Some(36.8);
    let coordinates = request.coordinates().unwrap().unwrap();
    assert!((coordinates.latitude() - -1.3).abs() < f64::EPSILON);

    request.latitude = Some(91.0);
    assert_eq!(validation_field(request.coordinates().unwrap_err()), "latitude");
}

#[test]
fn test_assignment_request_accepts_role_variants() {
    for role in ["gis-expert", "GIS_Expert", "gis expert"] {
        let request = AssignmentRequest {
            expected_version: 1,
            worker_id: String::from("gis-1"),
            role: String::from(role),
        };
        assert_eq!(
            request.assignment().unwrap(),
            Assignment::new(String::from("gis-1"), WorkerRole::GisExpert)
        );
    }

    let request = AssignmentRequest {
        expected_version: 1,
        worker_id: String::from("admin-1"),
        role: String::from("admin"),
    };
    assert_eq!(validation_field(request.assignment().unwrap_err()), "role");
}

#[test]
fn test_respond_and_progress_requests() {
    let accept = RespondRequest {
        expected_version: 2,
        response: String::from("Accept"),
    };
    assert_eq!(accept.response().unwrap(), WorkerResponse::Accept);

    let unknown = RespondRequest {
        expected_version: 2,
        response: String::from("maybe"),
    };
    assert_eq!(validation_field(unknown.response().unwrap_err()), "response");

    let progress = ProgressRequest {
        expected_version: 3,
        status: String::from("in_progress"),
    };
    assert_eq!(progress.target().unwrap(), BookingStatus::InProgress);
}

#[test]
fn test_amend_request_parses_payload() {
    let request: AmendBookingRequest = serde_json::from_value(serde_json::json!({
        "expected_version": 1,
        "survey_type": "boundary",
        "location": "Plot 9",
        "description": "North fence",
        "preferred_date": "2026-07-04",
    }))
    .unwrap();

    let payload = request.payload().unwrap();
    assert_eq!(payload.location, "Plot 9");
    assert_eq!(payload.preferred_date, date!(2026 - 07 - 04));
}

#[test]
fn test_list_query_builds_filter() {
    let query = ListBookingsQuery {
        client_id: None,
        worker_id: Some(String::from("surveyor-1")),
        role: Some(String::from("Surveyor")),
        status: Some(String::from("assigned")),
    };
    assert_eq!(
        query.filter().unwrap(),
        BookingFilter::for_worker("surveyor-1", WorkerRole::Surveyor)
            .with_status(BookingStatus::Assigned)
    );

    assert_eq!(ListBookingsQuery::default().filter().unwrap(), BookingFilter::all());

    let bad = ListBookingsQuery {
        status: Some(String::from("archived")),
        ..ListBookingsQuery::default()
    };
    assert_eq!(validation_field(bad.filter().unwrap_err()), "status");
}

#[test]
fn test_booking_response_json_shape() {
    let (_store, coordinator) = create_test_coordinator(LifecyclePolicy::default());
    let booking: Booking = create_assigned_booking(&coordinator);

    let response: BookingResponse =
        BookingResponse::from_booking(&booking, &LifecyclePolicy::default());
    let json: serde_json::Value = serde_json::to_value(&response).unwrap();

    assert_eq!(json["booking_id"], serde_json::json!(booking.id.value()));
    assert_eq!(json["status"], "assigned");
    assert_eq!(json["assigned_worker_id"], "surveyor-1");
    assert_eq!(json["assigned_role"], "surveyor");
    assert_eq!(json["version"], 2);
    assert_eq!(json["preferred_date"], "2026-03-10");
    assert_eq!(json["created_at"], "2026-02-20T08:00:00Z");
    assert_eq!(json["last_activity_at"], "2026-02-20T08:01:00Z");
    assert_eq!(json["escalated"], false);
}

#[test]
fn test_translate_core_error() {
    assert_eq!(
        translate_core_error(CoreError::DomainViolation(DomainError::MissingField {
            field: "survey_type"
        })),
        LifecycleError::Validation {
            field: String::from("survey_type"),
            message: String::from("Missing required field 'survey_type'"),
        }
    );
}

#[test]
fn test_translate_persistence_error() {
    let id: BookingId = BookingId::new(5);

    assert_eq!(
        translate_persistence_error(PersistenceError::BookingNotFound(id)),
        LifecycleError::NotFound { booking_id: id }
    );
    assert!(matches!(
        translate_persistence_error(PersistenceError::VersionConflict {
            booking_id: id,
            expected: 2,
            actual: 3,
        }),
        LifecycleError::Conflict {
            current_version: 3,
            ..
        }
    ));

    let unavailable: LifecycleError = translate_persistence_error(PersistenceError::LockPoisoned);
    assert!(matches!(unavailable, LifecycleError::StoreUnavailable { .. }));
    assert!(unavailable.is_retryable());
}

#[test]
fn test_error_codes() {
    let denied = LifecycleError::Denied {
        reason: DenialReason::NotAssigned,
        message: String::from("no worker"),
    };
    assert_eq!(denied.code(), "not_assigned");
    assert_eq!(denied.to_string(), "no worker");
    assert!(!denied.is_retryable());

    let not_found = LifecycleError::NotFound {
        booking_id: BookingId::new(9),
    };
    assert_eq!(not_found.code(), "not_found");
    assert_eq!(not_found.to_string(), "Booking 9 not found");
}
