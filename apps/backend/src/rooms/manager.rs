//! Registry of running rooms, keyed by join code.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use super::room::{Room, RoomSummary};
use super::worker::{spawn_room, RoomHandle};
use crate::domain::RoomSettings;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::utils::join_code::{generate_join_code, normalize_join_code};

const CODE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
pub struct RoomsConfig {
    pub max_rooms: usize,
    pub queue_depth: usize,
    /// How long a room may sit with nobody connected before it is closed.
    pub room_idle: Duration,
    /// Turn timeout for rooms created without explicit settings.
    pub turn_timeout_secs: u64,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            max_rooms: 1000,
            queue_depth: 64,
            room_idle: Duration::from_secs(600),
            turn_timeout_secs: 60,
        }
    }
}

struct RoomEntry {
    handle: RoomHandle,
    idle_since: Option<Instant>,
}

pub struct RoomManager {
    rooms: DashMap<String, RoomEntry>,
    config: RoomsConfig,
}

impl RoomManager {
    pub fn new(config: RoomsConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoomsConfig {
        &self.config
    }

    /// Settings used when a creator does not send any.
    pub fn default_settings(&self) -> RoomSettings {
        RoomSettings {
            turn_timeout_secs: self.config.turn_timeout_secs,
            ..RoomSettings::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Open a new room under a fresh code and start its worker.
    pub fn create_room(&self, settings: RoomSettings) -> Result<RoomHandle, DomainError> {
        settings.validate()?;
        if self.rooms.len() >= self.config.max_rooms {
            return Err(DomainError::conflict(
                ConflictKind::RoomLimit,
                format!("server already hosts {} rooms", self.config.max_rooms),
            ));
        }
        for _ in 0..CODE_ATTEMPTS {
            let Entry::Vacant(slot) = self.rooms.entry(generate_join_code()) else {
                continue;
            };
            let seed = rand::rng().random::<u64>();
            let room = Room::new(slot.key().clone(), settings, seed)?;
            let handle = spawn_room(room, self.config.queue_depth);
            info!(room_code = %handle.code(), "[ROOMS] room created");
            slot.insert(RoomEntry {
                handle: handle.clone(),
                idle_since: None,
            });
            return Ok(handle);
        }
        Err(DomainError::conflict(
            ConflictKind::JoinCodeConflict,
            "could not find a free room code",
        ))
    }

    /// Look a room up by a code as a person typed it.
    pub fn get(&self, code: &str) -> Result<RoomHandle, DomainError> {
        let not_found = || DomainError::not_found(NotFoundKind::Room, format!("no room {}", code.trim()));
        let code = normalize_join_code(code).ok_or_else(not_found)?;
        let handle = self
            .rooms
            .get(&code)
            .map(|entry| entry.handle.clone())
            .ok_or_else(not_found)?;
        if handle.is_closed() {
            self.rooms.remove(&code);
            return Err(not_found());
        }
        Ok(handle)
    }

    /// Lobbies with a free seat, ordered by code.
    pub fn open_lobbies(&self) -> Vec<RoomSummary> {
        let mut open: Vec<RoomSummary> = self
            .rooms
            .iter()
            .filter(|entry| !entry.handle.is_closed())
            .map(|entry| entry.handle.snapshot())
            .filter(|snap| snap.is_open())
            .map(|snap| snap.summary())
            .collect();
        open.sort_by(|a, b| a.code.cmp(&b.code));
        open
    }

    /// Drop rooms whose worker has stopped and close rooms nobody has been
    /// connected to for longer than the idle limit. Returns how many went.
    pub async fn reap(&self, now: Instant) -> usize {
        let idle_limit = self.config.room_idle;
        let mut expired = Vec::new();
        for mut entry in self.rooms.iter_mut() {
            if entry.handle.is_closed() {
                expired.push(entry.key().clone());
                continue;
            }
            if entry.handle.snapshot().has_connected_members() {
                entry.idle_since = None;
                continue;
            }
            let since = *entry.idle_since.get_or_insert(now);
            if now.saturating_duration_since(since) >= idle_limit {
                expired.push(entry.key().clone());
            }
        }

        let mut removed = 0;
        for code in expired {
            if let Some((_, entry)) = self.rooms.remove(&code) {
                entry.handle.shutdown().await;
                info!(room_code = %code, "[ROOMS] room reaped");
                removed += 1;
            }
        }
        removed
    }

    /// Run [`RoomManager::reap`] every `every` until the manager is dropped.
    pub fn spawn_reaper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every);
            loop {
                ticks.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let removed = manager.reap(Instant::now()).await;
                if removed > 0 {
                    info!(removed, remaining = manager.len(), "[ROOMS] reaper pass");
                }
            }
        })
    }

    pub async fn shutdown_all(&self) {
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|e| e.handle.clone()).collect();
        self.rooms.clear();
        if !handles.is_empty() {
            warn!(rooms = handles.len(), "[ROOMS] shutting down live rooms");
        }
        for handle in handles {
            handle.shutdown().await;
        }
    }
}
