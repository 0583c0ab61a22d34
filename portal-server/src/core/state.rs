use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::Config;
use crate::lifecycle::{
    ApprovalWorkflow, BillEngine, BookingEngine, EventSink, InMemoryRoomCatalog, LifecycleSweeper,
    RoomCatalog,
};
use shared::models::Room;

/// Shared server state: the engines, the room catalog boundary, and the
/// lifecycle event channel
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub rooms: Arc<InMemoryRoomCatalog>,
    pub bookings: Arc<BookingEngine>,
    pub bills: Arc<BillEngine>,
    pub approvals: Arc<ApprovalWorkflow>,
    pub events: EventSink,
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn initialize(config: &Config) -> Self {
        let events = EventSink::new();
        let rooms = Arc::new(InMemoryRoomCatalog::new());

        // Seed the room catalog; in deployment the catalog is fed by the
        // external room service, a file keeps local runs self-contained
        if let Some(path) = &config.rooms_file {
            match load_rooms(path) {
                Ok(seed) => {
                    let count = rooms.seed(seed);
                    tracing::info!(count, path = %path, "Room catalog seeded");
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to seed room catalog");
                }
            }
        }

        let bookings = Arc::new(BookingEngine::new(
            Arc::clone(&rooms) as Arc<dyn RoomCatalog>,
            events.clone(),
        ));
        let bills = Arc::new(BillEngine::new(events.clone()));
        let approvals = Arc::new(ApprovalWorkflow::new(
            Arc::clone(&bookings),
            Arc::clone(&bills),
        ));

        Self {
            config: config.clone(),
            rooms,
            bookings,
            bills,
            approvals,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    /// Spawn the background sweep task
    pub fn start_background_tasks(&self) {
        let sweeper = LifecycleSweeper::new(
            Arc::clone(&self.bookings),
            Arc::clone(&self.bills),
            self.shutdown.clone(),
            Duration::from_secs(self.config.sweep_interval_secs.max(1)),
        );
        tokio::spawn(sweeper.run());
    }
}

fn load_rooms(path: &str) -> anyhow::Result<Vec<Room>> {
    let contents = std::fs::read_to_string(path)?;
    let rooms: Vec<Room> = serde_json::from_str(&contents)?;
    Ok(rooms)
}
