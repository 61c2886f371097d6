use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::rooms::RoomsConfig;

/// Process-level settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Default turn timeout for rooms created without explicit settings.
    pub turn_timeout_secs: u64,
    pub room_idle_secs: u64,
    pub max_rooms: usize,
    pub room_queue_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            turn_timeout_secs: 60,
            room_idle_secs: 600,
            max_rooms: 1000,
            room_queue_depth: 64,
        }
    }
}

impl ServerConfig {
    /// Read `MONOPOLY_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            host: lookup("MONOPOLY_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "MONOPOLY_PORT", defaults.port)?,
            turn_timeout_secs: parsed(&lookup, "MONOPOLY_TURN_TIMEOUT_SECS", defaults.turn_timeout_secs)?,
            room_idle_secs: parsed(&lookup, "MONOPOLY_ROOM_IDLE_SECS", defaults.room_idle_secs)?,
            max_rooms: parsed(&lookup, "MONOPOLY_MAX_ROOMS", defaults.max_rooms)?,
            room_queue_depth: parsed(&lookup, "MONOPOLY_ROOM_QUEUE_DEPTH", defaults.room_queue_depth)?,
        };
        for (name, value) in [
            ("MONOPOLY_TURN_TIMEOUT_SECS", config.turn_timeout_secs),
            ("MONOPOLY_ROOM_IDLE_SECS", config.room_idle_secs),
            ("MONOPOLY_MAX_ROOMS", config.max_rooms as u64),
            ("MONOPOLY_ROOM_QUEUE_DEPTH", config.room_queue_depth as u64),
        ] {
            if value == 0 {
                return Err(AppError::config(format!("{name} must be positive")));
            }
        }
        Ok(config)
    }

    pub fn rooms(&self) -> RoomsConfig {
        RoomsConfig {
            max_rooms: self.max_rooms,
            queue_depth: self.room_queue_depth,
            room_idle: Duration::from_secs(self.room_idle_secs),
            turn_timeout_secs: self.turn_timeout_secs,
        }
    }

    /// How often idle rooms are looked for.
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs((self.room_idle_secs / 4).clamp(1, 60))
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{name} must be a number, got '{raw}'"))),
    }
}
