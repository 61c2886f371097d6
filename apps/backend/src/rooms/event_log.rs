//! Bounded history of what happened in a room.

use std::collections::VecDeque;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::room::RoomEvent;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedEvent {
    /// Monotonic across the room's lifetime, including evicted entries.
    pub seq: u64,
    /// Room version the event was produced at.
    pub version: u64,
    pub at: String,
    pub event: RoomEvent,
}

/// Ring buffer: once full, the oldest entry is dropped for each new one.
#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    next_seq: u64,
    entries: VecDeque<LoggedEvent>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_seq: 0,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, version: u64, event: RoomEvent) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        self.entries.push_back(LoggedEvent {
            seq: self.next_seq,
            version,
            at,
            event,
        });
        self.next_seq += 1;
    }

    pub fn extend(&mut self, version: u64, events: impl IntoIterator<Item = RoomEvent>) {
        for event in events {
            self.push(version, event);
        }
    }

    /// Entries with `seq >= from`, oldest first.
    pub fn since(&self, from: u64) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter().filter(move |e| e.seq >= from)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total events ever pushed.
    pub fn total(&self) -> u64 {
        self.next_seq
    }
}
