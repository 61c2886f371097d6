use std::sync::Arc;

use crate::config::server::ServerConfig;
use crate::rooms::RoomManager;

/// Shared by every HTTP handler and WebSocket session.
#[derive(Clone)]
pub struct AppState {
    rooms: Arc<RoomManager>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            rooms: Arc::new(RoomManager::new(config.rooms())),
            config,
        }
    }

    pub fn rooms(&self) -> Arc<RoomManager> {
        Arc::clone(&self.rooms)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(ServerConfig::default())
    }
}
