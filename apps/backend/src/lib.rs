#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod middleware;
pub mod rooms;
pub mod routes;
pub mod state;
pub mod utils;
pub mod ws;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use config::server::ServerConfig;
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use middleware::cors::cors_middleware;
pub use middleware::request_log::RequestLog;
pub use rooms::{RoomHandle, RoomManager, RoomsConfig};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
