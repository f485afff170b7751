// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for coordinator and projector tests.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use plotdesk::{Booking, LifecyclePolicy, NewBooking};
use plotdesk_audit::{Actor, LifecycleEvent};
use plotdesk_domain::{ActorRole, Assignment, BookingId, BookingPayload, WorkerRole};
use plotdesk_persistence::{BookingFilter, BookingStore, Persistence, PersistenceError};
use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime};

use crate::{Clock, LifecycleCoordinator, LifecycleNotifier};

pub const CLIENT_ID: &str = "client-1";
pub const OTHER_CLIENT_ID: &str = "client-2";
pub const SURVEYOR_ID: &str = "surveyor-1";
pub const GIS_EXPERT_ID: &str = "gis-1";

pub fn t0() -> OffsetDateTime {
    datetime!(2026-02-20 08:00 UTC)
}

/// A clock that advances one minute per reading, starting at `t0()`.
pub fn stepping_clock() -> Clock {
    let ticks: Arc<AtomicI64> = Arc::new(AtomicI64::new(0));
    Arc::new(move || t0() + Duration::minutes(ticks.fetch_add(1, Ordering::SeqCst)))
}

/// A clock that always reads `t0()`.
pub fn frozen_clock() -> Clock {
    Arc::new(t0)
}

pub fn create_test_admin() -> Actor {
    Actor::new(String::from("admin-1"), ActorRole::Admin)
}

pub fn create_test_client(id: &str) -> Actor {
    Actor::new(String::from(id), ActorRole::Client)
}

pub fn create_test_surveyor() -> Actor {
    Actor::new(String::from(SURVEYOR_ID), ActorRole::Surveyor)
}

pub fn create_test_gis_expert() -> Actor {
    Actor::new(String::from(GIS_EXPERT_ID), ActorRole::GisExpert)
}

pub fn surveyor_assignment() -> Assignment {
    Assignment::new(String::from(SURVEYOR_ID), WorkerRole::Surveyor)
}

pub fn gis_assignment() -> Assignment {
    Assignment::new(String::from(GIS_EXPERT_ID), WorkerRole::GisExpert)
}

pub fn create_test_payload() -> BookingPayload {
    BookingPayload::new(
        String::from("boundary"),
        String::from("Plot 42, Kiambu Road"),
        String::from("Re-establish the north-east beacon"),
        date!(2026 - 03 - 10),
    )
}

pub fn create_test_coordinator(
    policy: LifecyclePolicy,
) -> (Arc<Persistence>, LifecycleCoordinator<Persistence>) {
    let store: Arc<Persistence> =
        Arc::new(Persistence::new_in_memory().expect("in-memory database should open"));
    let coordinator: LifecycleCoordinator<Persistence> =
        LifecycleCoordinator::new(Arc::clone(&store), policy).with_clock(stepping_clock());
    (store, coordinator)
}

/// Opens a booking for `client_id` through `coordinator`.
pub fn create_booking_for<S: BookingStore>(
    coordinator: &LifecycleCoordinator<S>,
    client_id: &str,
) -> Booking {
    coordinator
        .create_booking(
            &create_test_client(client_id),
            String::from(client_id),
            create_test_payload(),
            None,
        )
        .expect("booking should be created")
}

/// Opens a booking and assigns it to the surveyor.
pub fn create_assigned_booking<S: BookingStore>(coordinator: &LifecycleCoordinator<S>) -> Booking {
    let booking: Booking = create_booking_for(coordinator, CLIENT_ID);
    coordinator
        .assign_worker(
            &create_test_admin(),
            booking.id,
            booking.version,
            surveyor_assignment(),
        )
        .expect("assignment should succeed")
}

/// Records every event it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl LifecycleNotifier for RecordingNotifier {
    fn notify(&self, event: &LifecycleEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A store that lets a competing writer commit just before a put.
///
/// Arm it with [`RacingStore::race_with`]; the next `put` first commits the
/// competing booking, so the coordinator's own write loses the race.
pub struct RacingStore {
    inner: Persistence,
    competing: Mutex<Option<(Booking, u64)>>,
    puts: AtomicU32,
}

impl RacingStore {
    pub fn new() -> Self {
        Self {
            inner: Persistence::new_in_memory().expect("in-memory database should open"),
            competing: Mutex::new(None),
            puts: AtomicU32::new(0),
        }
    }

    pub fn race_with(&self, booking: Booking, expected_version: u64) {
        *self.competing.lock().unwrap() = Some((booking, expected_version));
    }

    pub fn put_count(&self) -> u32 {
        self.puts.load(Ordering::SeqCst)
    }
}

impl BookingStore for RacingStore {
    fn insert(&self, booking: NewBooking) -> Result<Booking, PersistenceError> {
        self.inner.insert(booking)
    }

    fn get(&self, booking_id: BookingId) -> Result<Booking, PersistenceError> {
        self.inner.get(booking_id)
    }

    fn put(&self, booking: &Booking, expected_version: u64) -> Result<(), PersistenceError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let competing: Option<(Booking, u64)> = self.competing.lock().unwrap().take();
        if let Some((other, other_version)) = competing {
            self.inner.put(&other, other_version)?;
        }
        self.inner.put(booking, expected_version)
    }

    fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, PersistenceError> {
        self.inner.list(filter)
    }
}

/// A store whose writes always lose the compare-and-swap.
pub struct AlwaysConflictingStore {
    inner: Persistence,
    puts: AtomicU32,
}

impl AlwaysConflictingStore {
    pub fn new() -> Self {
        Self {
            inner: Persistence::new_in_memory().expect("in-memory database should open"),
            puts: AtomicU32::new(0),
        }
    }

    pub fn put_count(&self) -> u32 {
        self.puts.load(Ordering::SeqCst)
    }
}

impl BookingStore for AlwaysConflictingStore {
    fn insert(&self, booking: NewBooking) -> Result<Booking, PersistenceError> {
        self.inner.insert(booking)
    }

    fn get(&self, booking_id: BookingId) -> Result<Booking, PersistenceError> {
        self.inner.get(booking_id)
    }

    fn put(&self, booking: &Booking, expected_version: u64) -> Result<(), PersistenceError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(PersistenceError::VersionConflict {
            booking_id: booking.id,
            expected: expected_version,
            actual: expected_version + 1,
        })
    }

    fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, PersistenceError> {
        self.inner.list(filter)
    }
}
