//! Booking creation, validation, and cancellation

use super::*;

#[test]
fn test_create_booking_reserves_room_and_prices_stay() {
    let portal = create_test_portal();

    let booking = open_booking(&portal);

    assert_booking_state(&booking, BookingStatus::Pending, DepositStatus::None);
    assert_eq!(booking.member_id, "stu-1");
    assert_eq!(booking.total_price, Decimal::from(9000)); // 3 months x 3000
    assert_eq!(booking.booking_date, t0());
    assert_eq!(booking.payment_deadline, t0() + minutes(60));
    assert_eq!(room_status(&portal, "101"), RoomStatus::Reserved);
}

#[test]
fn test_create_booking_rejects_inverted_dates() {
    let portal = create_test_portal();

    let mut payload = booking_payload("101");
    payload.check_out_date = payload.check_in_date;
    let err = portal
        .bookings
        .create_booking(&student(), &payload, t0())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidDateRange(_)));

    payload.check_out_date = date(2024, 1, 15); // before check-in
    let err = portal
        .bookings
        .create_booking(&student(), &payload, t0())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidDateRange(_)));

    // The failed attempts must not have touched the room
    assert_eq!(room_status(&portal, "101"), RoomStatus::Available);
}

#[test]
fn test_create_booking_enforces_minimum_stay() {
    let portal = create_test_portal();

    // 89 days: just under 3 calendar months
    let mut payload = booking_payload("101");
    payload.check_out_date = payload.check_in_date + chrono::Duration::days(89);
    let err = portal
        .bookings
        .create_booking(&student(), &payload, t0())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidDateRange(_)));

    // Exactly 3 calendar months succeeds
    let payload = booking_payload("101");
    assert_eq!(payload.check_out_date, date(2024, 5, 1));
    assert!(portal
        .bookings
        .create_booking(&student(), &payload, t0())
        .is_ok());
}

#[test]
fn test_started_month_bills_in_full() {
    let portal = create_test_portal();

    let mut payload = booking_payload("101");
    payload.check_out_date = date(2024, 5, 15); // 3 months + 2 weeks
    let booking = portal
        .bookings
        .create_booking(&student(), &payload, t0())
        .unwrap();
    assert_eq!(booking.total_price, Decimal::from(12000)); // 4 months x 3000
}

#[test]
fn test_room_taken_by_earlier_booking() {
    let portal = create_test_portal();
    open_booking(&portal);

    let err = portal
        .bookings
        .create_booking(&other_student(), &booking_payload("101"), t0())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::RoomUnavailable(_)));
}

#[test]
fn test_unknown_room() {
    let portal = create_test_portal();
    let err = portal
        .bookings
        .create_booking(&student(), &booking_payload("404"), t0())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::RoomNotFound(_)));
}

#[test]
fn test_concurrent_creates_get_one_room_one_winner() {
    let portal = Arc::new(create_test_portal());

    let mut handles = Vec::new();
    for i in 0..8 {
        let portal = Arc::clone(&portal);
        handles.push(std::thread::spawn(move || {
            let actor = Actor::new(format!("stu-{}", i), Role::Student);
            portal
                .bookings
                .create_booking(&actor, &booking_payload("101"), t0())
                .is_ok()
        }));
    }

    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(wins, 1, "exactly one booking may reserve the room");
    assert_eq!(room_status(&portal, "101"), RoomStatus::Reserved);
}

#[test]
fn test_cancel_releases_room_and_is_terminal() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    let cancelled = portal
        .bookings
        .cancel_booking(
            &booking.booking_id,
            &student(),
            Some("changed plans".to_string()),
            t0() + minutes(5),
        )
        .unwrap();

    assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
    assert_eq!(cancelled.status_reason.as_deref(), Some("changed plans"));
    assert_eq!(room_status(&portal, "101"), RoomStatus::Available);

    // Terminal: a second cancel is a caller bug and must surface
    let err = portal
        .bookings
        .cancel_booking(&booking.booking_id, &student(), None, t0() + minutes(6))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::IllegalState(_)));
}

#[test]
fn test_students_cannot_touch_other_members_bookings() {
    let portal = create_test_portal();
    let booking = open_booking(&portal);

    let err = portal
        .bookings
        .cancel_booking(&booking.booking_id, &other_student(), None, t0() + minutes(5))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Unauthorized(_)));

    let err = portal
        .bookings
        .upload_payment_slip(&booking.booking_id, &other_student(), "slip-1", t0() + minutes(5))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Unauthorized(_)));

    // Staff may act on any booking
    assert!(portal
        .bookings
        .cancel_booking(&booking.booking_id, &manager(), None, t0() + minutes(5))
        .is_ok());
}

#[test]
fn test_unknown_booking_reported() {
    let portal = create_test_portal();
    assert!(matches!(
        portal.bookings.get_booking("nope", t0()),
        Err(LifecycleError::BookingNotFound(_))
    ));
    assert!(matches!(
        portal.bookings.expire_if_unpaid("nope", t0()),
        Err(LifecycleError::BookingNotFound(_))
    ));
}

#[test]
fn test_lifecycle_events_are_broadcast() {
    let portal = create_test_portal();
    let mut rx = portal.bookings.subscribe();

    let booking = open_booking(&portal);

    match rx.try_recv().unwrap() {
        LifecycleEvent::BookingCreated {
            booking_id,
            room_id,
            member_id,
            at,
        } => {
            assert_eq!(booking_id, booking.booking_id);
            assert_eq!(room_id, "101");
            assert_eq!(member_id, "stu-1");
            assert_eq!(at, t0());
        }
        other => panic!("expected BookingCreated, got {:?}", other),
    }
}

#[test]
fn test_list_bookings_newest_first() {
    let portal = create_test_portal();
    let first = open_booking(&portal);
    let second = portal
        .bookings
        .create_booking(&other_student(), &booking_payload("102"), t0() + minutes(1))
        .unwrap();

    let listed = portal.bookings.list_bookings(t0() + minutes(2));
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].booking_id, second.booking_id);
    assert_eq!(listed[1].booking_id, first.booking_id);
}
