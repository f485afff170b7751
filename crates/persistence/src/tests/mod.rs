// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use plotdesk::{Booking, Command, LifecyclePolicy, NewBooking, apply};
use plotdesk_audit::Actor;
use plotdesk_domain::{ActorRole, Assignment, BookingPayload, WorkerRole};
use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime};

use crate::{BookingStore, Persistence};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database should open")
}

pub fn create_test_admin() -> Actor {
    Actor::new(String::from("admin-1"), ActorRole::Admin)
}

pub fn create_test_worker(id: &str, role: WorkerRole) -> Actor {
    Actor::new(String::from(id), ActorRole::from(role))
}

pub fn t0() -> OffsetDateTime {
    datetime!(2026-02-20 08:00:00.123456 UTC)
}

pub fn create_test_new_booking(client_id: &str) -> NewBooking {
    NewBooking {
        client_id: String::from(client_id),
        payload: BookingPayload::new(
            String::from("topographic"),
            String::from("Plot 9, Ngong Road"),
            String::from("Contours at 0.5 m"),
            date!(2026 - 04 - 15),
        ),
        coordinates: None,
        created_at: t0(),
    }
}

/// Applies `command` as `actor` and writes the result through `store`.
pub fn advance(
    store: &Persistence,
    booking: &Booking,
    command: Command,
    actor: &Actor,
    minutes: i64,
) -> Booking {
    let next: Booking = apply(
        booking,
        command,
        actor,
        booking.version,
        t0() + Duration::minutes(minutes),
        &LifecyclePolicy::default(),
    )
    .expect("transition should be allowed")
    .new_booking;
    store
        .put(&next, booking.version)
        .expect("write should succeed");
    next
}

/// Inserts a booking for `client_id` and assigns it to `worker_id`.
pub fn create_assigned_booking(
    store: &Persistence,
    client_id: &str,
    worker_id: &str,
    role: WorkerRole,
) -> Booking {
    let booking: Booking = store.insert(create_test_new_booking(client_id)).unwrap();
    advance(
        store,
        &booking,
        Command::AssignWorker {
            assignment: Assignment::new(String::from(worker_id), role),
        },
        &create_test_admin(),
        1,
    )
}
