//! Payment-deadline timer: lazy reconciliation, idempotence, races

use super::*;

#[test]
fn test_expire_before_deadline_is_a_noop() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    let expired = portal
        .bookings
        .expire_if_unpaid(&booking.booking_id, t0() + minutes(59))
        .unwrap();
    assert!(!expired);

    let fetched = portal.bookings.get_booking(&booking.booking_id, t0() + minutes(59)).unwrap();
    assert_booking_state(&fetched, BookingStatus::Pending, DepositStatus::None);
    assert_eq!(room_status(&portal, "101"), RoomStatus::Reserved);
}

#[test]
fn test_expire_at_deadline_cancels_exactly_once() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    // Fires exactly at the deadline
    let expired = portal
        .bookings
        .expire_if_unpaid(&booking.booking_id, t0() + minutes(60))
        .unwrap();
    assert!(expired);

    // Idempotent: every further invocation is a successful no-op
    for extra in [60, 61, 120, 600] {
        let again = portal
            .bookings
            .expire_if_unpaid(&booking.booking_id, t0() + minutes(extra))
            .unwrap();
        assert!(!again);
    }

    let fetched = portal
        .bookings
        .get_booking(&booking.booking_id, t0() + minutes(61))
        .unwrap();
    assert_eq!(fetched.booking_status, BookingStatus::Cancelled);
    assert_eq!(
        fetched.status_reason.as_deref(),
        Some("auto-cancelled: payment deadline exceeded")
    );
    assert_eq!(room_status(&portal, "101"), RoomStatus::Available);
}

#[test]
fn test_read_self_heals_an_elapsed_deadline() {
    // End-to-end scenario: booked at T=0 for a 3-month stay at 3000/month,
    // no slip uploaded, dashboard read at T=61m
    let portal = create_test_portal();
    let booking = open_booking(&portal);
    assert_eq!(booking.total_price, Decimal::from(9000));
    assert_eq!(booking.payment_deadline, t0() + minutes(60));

    let fetched = portal
        .bookings
        .get_booking(&booking.booking_id, t0() + minutes(61))
        .unwrap();
    assert_eq!(fetched.booking_status, BookingStatus::Cancelled);
    assert_eq!(room_status(&portal, "101"), RoomStatus::Available);
}

#[test]
fn test_upload_after_deadline_fails_and_cancels() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    let err = portal
        .bookings
        .upload_payment_slip(&booking.booking_id, &student(), "slip-1", t0() + minutes(61))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::DeadlineExpired));

    let fetched = portal
        .bookings
        .get_booking(&booking.booking_id, t0() + minutes(61))
        .unwrap();
    assert_eq!(fetched.booking_status, BookingStatus::Cancelled);
    assert!(fetched.payment_slip_ref.is_none());
    assert_eq!(room_status(&portal, "101"), RoomStatus::Available);
}

#[test]
fn test_uploaded_slip_stops_the_timer() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    let uploaded = portal
        .bookings
        .upload_payment_slip(&booking.booking_id, &student(), "slip-1", t0() + minutes(59))
        .unwrap();
    assert_booking_state(&uploaded, BookingStatus::Pending, DepositStatus::Pending);
    assert_eq!(uploaded.payment_slip_uploaded_at, Some(t0() + minutes(59)));

    // Deadline passes with the slip under review: no expiry
    let expired = portal
        .bookings
        .expire_if_unpaid(&booking.booking_id, t0() + minutes(61))
        .unwrap();
    assert!(!expired);
    assert_eq!(room_status(&portal, "101"), RoomStatus::Reserved);
}

#[test]
fn test_rejected_slip_does_not_extend_the_deadline() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    portal
        .bookings
        .upload_payment_slip(&booking.booking_id, &student(), "slip-1", t0() + minutes(10))
        .unwrap();
    let rejected = portal
        .approvals
        .reject_deposit(
            &booking.booking_id,
            &manager(),
            Some("illegible transfer slip".to_string()),
            t0() + minutes(30),
        )
        .unwrap();
    assert_booking_state(&rejected, BookingStatus::Pending, DepositStatus::None);
    assert!(rejected.payment_slip_ref.is_none());
    assert!(rejected.payment_slip_uploaded_at.is_none());
    assert_eq!(rejected.payment_deadline, t0() + minutes(60));

    // The original window still applies: the booking expires on schedule
    let expired = portal
        .bookings
        .expire_if_unpaid(&booking.booking_id, t0() + minutes(60))
        .unwrap();
    assert!(expired);
}

#[test]
fn test_sweep_expires_only_elapsed_bookings() {
    let portal = create_test_portal();
    let stale = open_booking(&portal);
    let fresh = portal
        .bookings
        .create_booking(&other_student(), &booking_payload("102"), t0() + minutes(30))
        .unwrap();

    let cancelled = portal.bookings.sweep_expired(t0() + minutes(65));
    assert_eq!(cancelled, 1);

    let stale = portal
        .bookings
        .get_booking(&stale.booking_id, t0() + minutes(65))
        .unwrap();
    let fresh = portal
        .bookings
        .get_booking(&fresh.booking_id, t0() + minutes(65))
        .unwrap();
    assert_eq!(stale.booking_status, BookingStatus::Cancelled);
    assert_eq!(fresh.booking_status, BookingStatus::Pending);

    // Second sweep has nothing left to do
    assert_eq!(portal.bookings.sweep_expired(t0() + minutes(66)), 0);
}

#[test]
fn test_remaining_time_is_recomputed_from_the_stored_deadline() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    assert_eq!(booking.seconds_until_deadline(t0()), 3600);
    assert_eq!(booking.seconds_until_deadline(t0() + minutes(30)), 1800);
    assert_eq!(booking.seconds_until_deadline(t0() + minutes(90)), 0);
}

#[test]
fn test_expired_booking_emits_event() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);
    let mut rx = portal.bookings.subscribe();

    portal
        .bookings
        .expire_if_unpaid(&booking.booking_id, t0() + minutes(60))
        .unwrap();

    match rx.try_recv().unwrap() {
        LifecycleEvent::BookingExpired { booking_id, room_id, .. } => {
            assert_eq!(booking_id, booking.booking_id);
            assert_eq!(room_id, "101");
        }
        other => panic!("expected BookingExpired, got {:?}", other),
    }
}

// ========================================================================
// Race resolution: exactly one terminal path wins, never both
// ========================================================================

#[test]
fn test_approve_vs_expire_race_has_a_single_winner() {
    // Slip uploaded just before the deadline; a reviewer approves the
    // deposit while the expiry check fires at the same instant.
    for _ in 0..50 {
        let portal = Arc::new(create_test_portal());
        let booking = open_booking(&portal);
        portal
            .bookings
            .upload_payment_slip(&booking.booking_id, &student(), "slip-1", t0() + minutes(59))
            .unwrap();

        let deadline = t0() + minutes(60);
        let approve = {
            let portal = Arc::clone(&portal);
            let id = booking.booking_id.clone();
            std::thread::spawn(move || {
                portal.bookings.approve_deposit(&id, &manager(), deadline)
            })
        };
        let expire = {
            let portal = Arc::clone(&portal);
            let id = booking.booking_id.clone();
            std::thread::spawn(move || portal.bookings.expire_if_unpaid(&id, deadline))
        };

        let approve_result = approve.join().unwrap();
        let expire_result = expire.join().unwrap();

        let fin = portal
            .bookings
            .get_booking(&booking.booking_id, deadline)
            .unwrap();

        // A paid deposit on a cancelled booking must be impossible
        assert!(
            !(fin.deposit_status == DepositStatus::Paid
                && fin.booking_status == BookingStatus::Cancelled),
            "both terminal paths won: {:?}/{:?}",
            fin.booking_status,
            fin.deposit_status
        );
        // With the slip under review the expiry must be the no-op side
        assert!(approve_result.is_ok());
        assert_eq!(expire_result.unwrap(), false);
        assert_booking_state(&fin, BookingStatus::Pending, DepositStatus::Paid);
    }
}

#[test]
fn test_upload_vs_expire_race_resolves_deterministically() {
    // No slip yet; the student uploads exactly at the deadline while the
    // timer fires. Whoever loses the entry lock sees the other's result.
    for _ in 0..50 {
        let portal = Arc::new(create_test_portal());
        let booking = open_booking(&portal);

        let deadline = t0() + minutes(60);
        let upload = {
            let portal = Arc::clone(&portal);
            let id = booking.booking_id.clone();
            std::thread::spawn(move || {
                portal
                    .bookings
                    .upload_payment_slip(&id, &student(), "slip-1", deadline)
            })
        };
        let expire = {
            let portal = Arc::clone(&portal);
            let id = booking.booking_id.clone();
            std::thread::spawn(move || portal.bookings.expire_if_unpaid(&id, deadline))
        };

        let upload_result = upload.join().unwrap();
        let expire_result = expire.join().unwrap();

        // At the deadline the upload can never win
        assert!(upload_result.is_err());
        let fin = portal
            .bookings
            .get_booking(&booking.booking_id, deadline)
            .unwrap();
        assert_booking_state(&fin, BookingStatus::Cancelled, DepositStatus::None);
        assert_eq!(room_status(&portal, "101"), RoomStatus::Available);
        // Exactly one call performed the cancellation
        let upload_cancelled = matches!(upload_result, Err(LifecycleError::DeadlineExpired));
        let expire_cancelled = expire_result.unwrap();
        assert!(
            upload_cancelled != expire_cancelled,
            "exactly one path may perform the cancellation"
        );
    }
}
