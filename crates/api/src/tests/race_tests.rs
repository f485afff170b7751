// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for compare-and-swap retries under concurrent writers.

use std::sync::{Arc, Barrier};
use std::thread;

use plotdesk::{Booking, Command, LifecyclePolicy, apply};
use plotdesk_audit::Actor;
use plotdesk_domain::{Assignment, BookingPayload, BookingStatus, DenialReason, WorkerRole};
use plotdesk_persistence::{BookingStore, Persistence};
use time::Duration;

use crate::{LifecycleCoordinator, LifecycleError};

use super::helpers::{
    AlwaysConflictingStore, CLIENT_ID, RacingStore, create_booking_for, create_test_admin,
    create_test_client, create_test_coordinator, create_test_payload, gis_assignment,
    stepping_clock, surveyor_assignment, t0,
};

/// Builds the booking a competing writer commits while the coordinator is
/// between its read and its write.
fn competing_write(booking: &Booking, command: Command, actor: &Actor) -> Booking {
    apply(
        booking,
        command,
        actor,
        booking.version,
        t0() + Duration::seconds(30),
        &LifecyclePolicy::default(),
    )
    .unwrap()
    .new_booking
}

#[test]
fn test_lost_race_is_revalidated_against_fresh_state() {
    let store: Arc<RacingStore> = Arc::new(RacingStore::new());
    let coordinator: LifecycleCoordinator<RacingStore> =
        LifecycleCoordinator::new(Arc::clone(&store), LifecyclePolicy::default())
            .with_clock(stepping_clock());
    let admin = create_test_admin();
    let booking: Booking = create_booking_for(&coordinator, CLIENT_ID);

    let winner: Booking = competing_write(
        &booking,
        Command::AssignWorker {
            assignment: gis_assignment(),
        },
        &admin,
    );
    store.race_with(winner.clone(), booking.version);

    let err: LifecycleError = coordinator
        .assign_worker(&admin, booking.id, booking.version, surveyor_assignment())
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Denied {
            reason: DenialReason::InvalidFromState,
            ..
        }
    ));
    assert_eq!(store.put_count(), 1);

    let stored: Booking = store.get(booking.id).unwrap();
    assert_eq!(stored, winner);
    assert_eq!(stored.history.len(), 1);
}

#[test]
fn test_lost_race_retries_and_commits_when_still_legal() {
    let store: Arc<RacingStore> = Arc::new(RacingStore::new());
    let coordinator: LifecycleCoordinator<RacingStore> =
        LifecycleCoordinator::new(Arc::clone(&store), LifecyclePolicy::default())
            .with_clock(stepping_clock());
    let booking: Booking = create_booking_for(&coordinator, CLIENT_ID);

    let mut payload: BookingPayload = create_test_payload();
    payload.description = String::from("Also mark the access road");
    let amended: Booking = competing_write(
        &booking,
        Command::Amend { payload },
        &create_test_client(CLIENT_ID),
    );
    store.race_with(amended, booking.version);

    let assigned: Booking = coordinator
        .assign_worker(
            &create_test_admin(),
            booking.id,
            booking.version,
            surveyor_assignment(),
        )
        .unwrap();

    assert_eq!(store.put_count(), 2);
    assert_eq!(assigned.version, 3);
    assert_eq!(assigned.status, BookingStatus::Assigned);
    assert_eq!(assigned.payload.description, "Also mark the access road");

    let stored: Booking = store.get(booking.id).unwrap();
    assert_eq!(stored, assigned);
    let path: Vec<BookingStatus> = stored.history.iter().map(|e| e.to_status).collect();
    assert_eq!(path, vec![BookingStatus::Pending, BookingStatus::Assigned]);
}

#[test]
fn test_conflict_after_exhausted_attempts() {
    let store: Arc<AlwaysConflictingStore> = Arc::new(AlwaysConflictingStore::new());
    let coordinator: LifecycleCoordinator<AlwaysConflictingStore> =
        LifecycleCoordinator::new(Arc::clone(&store), LifecyclePolicy::new(3, Some(3)));
    let booking: Booking = create_booking_for(&coordinator, CLIENT_ID);

    let err: LifecycleError = coordinator
        .assign_worker(&create_test_admin(), booking.id, 1, surveyor_assignment())
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Conflict {
            current_version: 2,
            ..
        }
    ));
    assert!(err.is_retryable());
    assert_eq!(store.put_count(), 3);
    assert_eq!(store.get(booking.id).unwrap().version, 1);
}

#[test]
fn test_single_attempt_policy_does_not_retry() {
    let store: Arc<AlwaysConflictingStore> = Arc::new(AlwaysConflictingStore::new());
    let coordinator: LifecycleCoordinator<AlwaysConflictingStore> =
        LifecycleCoordinator::new(Arc::clone(&store), LifecyclePolicy::new(0, None));
    let booking: Booking = create_booking_for(&coordinator, CLIENT_ID);

    coordinator
        .assign_worker(&create_test_admin(), booking.id, 1, surveyor_assignment())
        .unwrap_err();

    assert_eq!(store.put_count(), 1);
}

#[test]
fn test_concurrent_assignments_exactly_one_wins() {
    let (store, coordinator) = create_test_coordinator(LifecyclePolicy::default());
    let booking: Booking = create_booking_for(&coordinator, CLIENT_ID);
    let coordinator: Arc<LifecycleCoordinator<Persistence>> = Arc::new(coordinator);
    let barrier: Arc<Barrier> = Arc::new(Barrier::new(2));

    let handles: Vec<thread::JoinHandle<Result<Booking, LifecycleError>>> =
        ["surveyor-a", "surveyor-b"]
            .into_iter()
            .map(|worker_id| {
                let coordinator = Arc::clone(&coordinator);
                let barrier = Arc::clone(&barrier);
                let booking_id = booking.id;
                thread::spawn(move || {
                    barrier.wait();
                    coordinator.assign_worker(
                        &create_test_admin(),
                        booking_id,
                        1,
                        Assignment::new(String::from(worker_id), WorkerRole::Surveyor),
                    )
                })
            })
            .collect();

    let results: Vec<Result<Booking, LifecycleError>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let winners: Vec<&Booking> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);

    // A loser that lost the CAS write re-validates and is denied from the new
    // state. A loser that read after the winner committed sends a version
    // that is already stale, which is a conflict.
    let loser: &LifecycleError = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(
        matches!(
            loser,
            LifecycleError::Denied {
                reason: DenialReason::InvalidFromState,
                ..
            } | LifecycleError::Conflict { .. }
        ),
        "loser must be denied as InvalidFromState after a lost write, \
         or a Conflict if it read the committed v2 first; got {loser:?}"
    );

    let stored: Booking = store.get(booking.id).unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.history.len(), 1);
    assert_eq!(stored.assignment, winners[0].assignment);
}
