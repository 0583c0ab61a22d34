//! Dormitory Portal Server - room booking and billing lifecycle
//!
//! # Architecture overview
//!
//! The portal owns the reservation-to-occupancy lifecycle: the combined
//! state machine over a booking, its deposit, and the recurring monthly
//! bill. Everything else (identity, file storage, room catalog admin) is an
//! external collaborator reached through narrow contracts.
//!
//! # Module structure
//!
//! ```text
//! portal-server/src/
//! ├── core/        # config, state, HTTP server
//! ├── auth/        # forwarded-identity extractor
//! ├── api/         # HTTP routes and handlers
//! ├── lifecycle/   # booking/bill engines, approval workflow, sweeper
//! └── utils/       # logging, calendar-month helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod lifecycle;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use auth::CurrentActor;
pub use lifecycle::{
    ApprovalWorkflow, BillEngine, BookingEngine, EventSink, InMemoryRoomCatalog, LifecycleError,
    LifecycleEvent, LifecycleSweeper, RoomCatalog,
};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - structured fields through tracing
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Prepare the process environment: dotenv and logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____                        ____             __        __
   / __ \____  _________ ___   / __ \____  _____/ /_____ _/ /
  / / / / __ \/ ___/ __ `__ \ / /_/ / __ \/ ___/ __/ __ `/ /
 / /_/ / /_/ / /  / / / / / // ____/ /_/ / /  / /_/ /_/ / /
/_____/\____/_/  /_/ /_/ /_//_/    \____/_/   \__/\__,_/_/
    "#
    );
}
