use super::*;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::models::{
    Actor, BillCreate, BillStatus, Booking, BookingCreate, BookingStatus, DepositStatus, Role,
    Room, RoomStatus,
};
use std::sync::Arc;

// ========================================================================
// Test fixture: engines over a seeded in-memory room catalog
// ========================================================================

pub struct TestPortal {
    pub rooms: Arc<InMemoryRoomCatalog>,
    pub bookings: Arc<BookingEngine>,
    pub bills: Arc<BillEngine>,
    pub approvals: ApprovalWorkflow,
}

fn create_test_portal() -> TestPortal {
    let events = EventSink::new();
    let rooms = Arc::new(InMemoryRoomCatalog::new());
    rooms.upsert(test_room("101", 3000));
    rooms.upsert(test_room("102", 3500));

    let bookings = Arc::new(BookingEngine::new(
        Arc::clone(&rooms) as Arc<dyn RoomCatalog>,
        events.clone(),
    ));
    let bills = Arc::new(BillEngine::new(events.clone()));
    let approvals = ApprovalWorkflow::new(Arc::clone(&bookings), Arc::clone(&bills));

    TestPortal {
        rooms,
        bookings,
        bills,
        approvals,
    }
}

fn test_room(id: &str, rate: i64) -> Room {
    Room {
        room_id: id.to_string(),
        label: format!("A-{}", id),
        status: RoomStatus::Available,
        monthly_rate: Decimal::from(rate),
    }
}

// ========================================================================
// Actors
// ========================================================================

fn student() -> Actor {
    Actor::new("stu-1", Role::Student)
}

fn other_student() -> Actor {
    Actor::new("stu-2", Role::Student)
}

fn manager() -> Actor {
    Actor::new("mgr-1", Role::Manager)
}

fn admin() -> Actor {
    Actor::new("adm-1", Role::Admin)
}

// ========================================================================
// Time helpers: every test pins its own clock
// ========================================================================

/// Booking creation instant used throughout the suite
fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

// ========================================================================
// Payloads
// ========================================================================

/// A valid 3-month stay in room 101
fn booking_payload(room_id: &str) -> BookingCreate {
    BookingCreate {
        room_id: room_id.to_string(),
        check_in_date: date(2024, 2, 1),
        check_out_date: date(2024, 5, 1),
        remarks: None,
    }
}

fn bill_payload(member_id: &str) -> BillCreate {
    BillCreate {
        room_id: "101".to_string(),
        member_id: member_id.to_string(),
        bill_month: 1,
        bill_year: 2024,
        room_rent: Decimal::from(3000),
        water_cost: Decimal::from(100),
        electricity_cost: Decimal::from(200),
        other_charges: Decimal::ZERO,
        other_charges_reason: None,
        due_date: date(2024, 1, 5),
    }
}

// ========================================================================
// Shortcuts
// ========================================================================

/// Create a booking for `student()` at `t0()`
fn open_booking(portal: &TestPortal) -> Booking {
    portal
        .bookings
        .create_booking(&student(), &booking_payload("101"), t0())
        .expect("booking should be created")
}

/// Issue + finalize a bill so it is visible to the member
fn issued_bill(portal: &TestPortal, member_id: &str) -> shared::models::Bill {
    let bill = portal
        .bills
        .issue_bill(&bill_payload(member_id))
        .expect("bill should be drafted");
    portal
        .bills
        .finalize_bill(&bill.bill_id, at(2024, 1, 1, 9))
        .expect("bill should be issued")
}

fn room_status(portal: &TestPortal, room_id: &str) -> RoomStatus {
    portal.rooms.get_room(room_id).unwrap().status
}

fn assert_booking_state(booking: &Booking, status: BookingStatus, deposit: DepositStatus) {
    assert_eq!(
        (booking.booking_status, booking.deposit_status),
        (status, deposit),
        "expected {:?}/{:?}, got {:?}/{:?}",
        status,
        deposit,
        booking.booking_status,
        booking.deposit_status
    );
}

mod test_booking;
mod test_deadline;
