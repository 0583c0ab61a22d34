//! Room Inventory boundary
//!
//! The room catalog (types, photos, pricing admin) lives outside this
//! service; the lifecycle engine only needs availability reads and a
//! conditional status write. The conditional update is the guard against
//! double-booking: "set RESERVED where AVAILABLE" either wins or reports
//! that someone else got there first.

use super::error::{LifecycleError, LifecycleResult};
use parking_lot::RwLock;
use shared::models::{Room, RoomStatus};
use std::collections::HashMap;

/// Contract with the external Room Catalog service
pub trait RoomCatalog: Send + Sync {
    fn get_room(&self, room_id: &str) -> LifecycleResult<Room>;

    /// Conditional status update (compare-and-swap).
    ///
    /// Returns `Ok(true)` when the room's status was `expected` and is now
    /// `to`; `Ok(false)` when the stored status did not match (no write
    /// happened). Callers must treat `Ok(false)` on reservation as
    /// [`LifecycleError::RoomUnavailable`], not retry blindly.
    fn set_status(
        &self,
        room_id: &str,
        to: RoomStatus,
        expected: RoomStatus,
    ) -> LifecycleResult<bool>;
}

/// In-process room catalog
///
/// The write lock makes check-and-set atomic, so two concurrent
/// reservations of the same room cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryRoomCatalog {
    rooms: RwLock<HashMap<String, Room>>,
}

impl InMemoryRoomCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a room
    pub fn upsert(&self, room: Room) {
        let mut rooms = self.rooms.write();
        rooms.insert(room.room_id.clone(), room);
    }

    /// Load a batch of rooms (startup seeding)
    pub fn seed(&self, seed: Vec<Room>) -> usize {
        let mut rooms = self.rooms.write();
        let count = seed.len();
        for room in seed {
            rooms.insert(room.room_id.clone(), room);
        }
        count
    }

    pub fn list(&self) -> Vec<Room> {
        let rooms = self.rooms.read();
        rooms.values().cloned().collect()
    }
}

impl RoomCatalog for InMemoryRoomCatalog {
    fn get_room(&self, room_id: &str) -> LifecycleResult<Room> {
        let rooms = self.rooms.read();
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| LifecycleError::RoomNotFound(room_id.to_string()))
    }

    fn set_status(
        &self,
        room_id: &str,
        to: RoomStatus,
        expected: RoomStatus,
    ) -> LifecycleResult<bool> {
        let mut rooms = self.rooms.write();
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| LifecycleError::RoomNotFound(room_id.to_string()))?;
        if room.status != expected {
            return Ok(false);
        }
        room.status = to;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn room(id: &str, status: RoomStatus) -> Room {
        Room {
            room_id: id.to_string(),
            label: format!("A-{}", id),
            status,
            monthly_rate: Decimal::from(3000),
        }
    }

    #[test]
    fn test_conditional_update_success() {
        let catalog = InMemoryRoomCatalog::new();
        catalog.upsert(room("101", RoomStatus::Available));

        let updated = catalog
            .set_status("101", RoomStatus::Reserved, RoomStatus::Available)
            .unwrap();
        assert!(updated);
        assert_eq!(catalog.get_room("101").unwrap().status, RoomStatus::Reserved);
    }

    #[test]
    fn test_conditional_update_mismatch_leaves_room_untouched() {
        let catalog = InMemoryRoomCatalog::new();
        catalog.upsert(room("101", RoomStatus::Occupied));

        let updated = catalog
            .set_status("101", RoomStatus::Reserved, RoomStatus::Available)
            .unwrap();
        assert!(!updated);
        assert_eq!(catalog.get_room("101").unwrap().status, RoomStatus::Occupied);
    }

    #[test]
    fn test_unknown_room() {
        let catalog = InMemoryRoomCatalog::new();
        assert!(matches!(
            catalog.get_room("nope"),
            Err(LifecycleError::RoomNotFound(_))
        ));
        assert!(matches!(
            catalog.set_status("nope", RoomStatus::Reserved, RoomStatus::Available),
            Err(LifecycleError::RoomNotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_reservation_single_winner() {
        use std::sync::Arc;

        let catalog = Arc::new(InMemoryRoomCatalog::new());
        catalog.upsert(room("101", RoomStatus::Available));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let catalog = Arc::clone(&catalog);
            handles.push(std::thread::spawn(move || {
                catalog
                    .set_status("101", RoomStatus::Reserved, RoomStatus::Available)
                    .unwrap()
            }));
        }

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1, "exactly one reservation may win the race");
    }
}
