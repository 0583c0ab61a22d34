//! Entity models for the dormitory portal

pub mod bill;
pub mod booking;
pub mod member;
pub mod room;

pub use bill::{Bill, BillCreate, BillStatus, BillView, CashPayment};
pub use booking::{Booking, BookingCreate, BookingStatus, DepositStatus, ReasonPayload, SlipUpload};
pub use member::{Actor, Role};
pub use room::{Room, RoomStatus};
