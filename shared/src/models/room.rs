//! Room Model
//!
//! The room catalog itself (types, photos, pricing admin) is an external
//! collaborator; the portal only reads availability and the monthly rate,
//! and moves rooms between `AVAILABLE` and `RESERVED`/`OCCUPIED`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Room availability status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Available,
    Reserved,
    Occupied,
    Maintenance,
}

/// Room entity (referenced, not owned)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room reference (String ID)
    pub room_id: String,
    /// Display label, e.g. "A-203"
    pub label: String,
    pub status: RoomStatus,
    /// Monthly rent in currency units
    pub monthly_rate: Decimal,
}
