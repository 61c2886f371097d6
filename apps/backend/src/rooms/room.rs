//! The room aggregate: lobby membership, the game it hosts, and the record
//! needed to replay it.

use serde::{Deserialize, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::event_log::EventLog;
use crate::domain::bankruptcy::forfeit;
use crate::domain::settings::Edition;
use crate::domain::turn::skip_turn;
use crate::domain::{apply_action, snapshot, Action, GameEvent, GameSnapshot, GameState, PlayerId, RoomSettings};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

pub const MAX_NAME_LEN: usize = 24;
pub const MAX_CHAT_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomStatus {
    Lobby,
    InProgress,
    GameOver,
    /// An invariant broke; the room only serves reads from here on.
    Frozen,
}

#[derive(Debug, Clone)]
pub struct Member {
    /// Secret handed to the client on join and presented again on resume.
    pub key: Uuid,
    pub name: String,
    pub ready: bool,
    pub host: bool,
    /// Live sockets bound to this seat. A resume may overlap the old socket.
    pub connections: u32,
    /// Left after the game started; the seat is kept so seat ids stay stable.
    pub left: bool,
}

impl Member {
    pub fn is_connected(&self) -> bool {
        self.connections > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPublic {
    pub seat: PlayerId,
    pub name: String,
    pub ready: bool,
    pub host: bool,
    pub connected: bool,
    pub left: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum LobbyIntent {
    SetReady { ready: bool },
    StartGame,
    LeaveRoom,
}

/// Everything a seated member can ask the room to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomIntent {
    Lobby(LobbyIntent),
    Game(Action),
}

impl RoomIntent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomIntent::Lobby(LobbyIntent::SetReady { .. }) => "set-ready",
            RoomIntent::Lobby(LobbyIntent::StartGame) => "start-game",
            RoomIntent::Lobby(LobbyIntent::LeaveRoom) => "leave-room",
            RoomIntent::Game(action) => action.name(),
        }
    }
}

impl From<Action> for RoomIntent {
    fn from(action: Action) -> Self {
        RoomIntent::Game(action)
    }
}

impl From<LobbyIntent> for RoomIntent {
    fn from(intent: LobbyIntent) -> Self {
        RoomIntent::Lobby(intent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum LobbyEvent {
    MemberJoined { seat: PlayerId, name: String },
    MemberLeft { seat: PlayerId, name: String },
    ReadyChanged { seat: PlayerId, ready: bool },
    HostChanged { seat: PlayerId },
    ConnectionChanged { seat: PlayerId, connected: bool },
    GameStarted { players: usize },
    RoomFrozen { message: String },
    ChatMessage {
        seat: PlayerId,
        player_name: String,
        message: String,
        #[serde(serialize_with = "rfc3339")]
        timestamp: OffsetDateTime,
    },
}

fn rfc3339<S: Serializer>(at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = at.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// One entry of the outbound event stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoomEvent {
    Lobby(LobbyEvent),
    Game(GameEvent),
}

/// An accepted mutation, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Recorded {
    Join { name: String },
    Intent { seat: PlayerId, intent: RoomIntent },
    TurnSkipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTicket {
    pub key: Uuid,
    pub seat: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: String,
    pub status: RoomStatus,
    pub version: u64,
    pub settings: RoomSettings,
    pub members: Vec<MemberPublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_reason: Option<String>,
}

impl RoomSnapshot {
    /// A lobby with a free seat.
    pub fn is_open(&self) -> bool {
        self.status == RoomStatus::Lobby && self.members.len() < usize::from(self.settings.max_players)
    }

    pub fn has_connected_members(&self) -> bool {
        self.members.iter().any(|m| m.connected)
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            edition: self.settings.edition,
            players: self.members.len(),
            max_players: self.settings.max_players,
            host: self.members.iter().find(|m| m.host).map(|m| m.name.clone()),
        }
    }
}

/// Listing entry for rooms still accepting players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: String,
    pub edition: Edition,
    pub players: usize,
    pub max_players: u8,
    pub host: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Room {
    code: String,
    settings: RoomSettings,
    seed: u64,
    status: RoomStatus,
    members: Vec<Member>,
    game: Option<GameState>,
    version: u64,
    log: EventLog,
    history: Vec<Recorded>,
    frozen_reason: Option<String>,
}

impl Room {
    pub fn new(code: impl Into<String>, settings: RoomSettings, seed: u64) -> Result<Self, DomainError> {
        settings.validate()?;
        Ok(Self {
            code: code.into(),
            log: EventLog::new(settings.event_log_capacity),
            settings,
            seed,
            status: RoomStatus::Lobby,
            members: Vec::new(),
            game: None,
            version: 0,
            history: Vec::new(),
            frozen_reason: None,
        })
    }

    /// Rebuild a room by feeding `history` into a fresh one with the same
    /// seed. Keys are regenerated; everything else comes out identical.
    pub fn from_history(
        code: impl Into<String>,
        settings: RoomSettings,
        seed: u64,
        history: &[Recorded],
    ) -> Result<Self, DomainError> {
        let mut room = Room::new(code, settings, seed)?;
        for record in history {
            match record {
                Recorded::Join { name } => {
                    room.join(name)?;
                }
                Recorded::Intent { seat, intent } => {
                    let key = room
                        .key_of(*seat)
                        .ok_or_else(|| DomainError::fatal(format!("replayed intent for unknown seat {seat}")))?;
                    room.handle(key, intent.clone(), None)?;
                }
                Recorded::TurnSkipped => {
                    room.skip_turn()?;
                }
            }
        }
        Ok(room)
    }

    pub fn replay(&self) -> Result<Self, DomainError> {
        Self::from_history(self.code.clone(), self.settings.clone(), self.seed, &self.history)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn history(&self) -> &[Recorded] {
        &self.history
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn frozen_reason(&self) -> Option<&str> {
        self.frozen_reason.as_deref()
    }

    pub fn key_of(&self, seat: PlayerId) -> Option<Uuid> {
        self.members.get(usize::from(seat)).map(|m| m.key)
    }

    /// Seat the game is waiting on, with the turn it is waiting in.
    pub fn awaited(&self) -> Option<(PlayerId, u32)> {
        match (&self.game, self.status) {
            (Some(game), RoomStatus::InProgress) => Some((game.current, game.turn_no)),
            _ => None,
        }
    }

    pub fn is_connected(&self, seat: PlayerId) -> bool {
        self.members
            .get(usize::from(seat))
            .is_some_and(Member::is_connected)
    }

    pub fn has_connected_members(&self) -> bool {
        self.members.iter().any(Member::is_connected)
    }

    /// Nobody is left who could ever act in this room again.
    pub fn is_abandoned(&self) -> bool {
        self.members.iter().all(|m| m.left)
    }

    pub fn join(&mut self, name: &str) -> Result<(JoinTicket, Vec<RoomEvent>), DomainError> {
        self.ensure_mutable()?;
        if self.status != RoomStatus::Lobby {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                "the game has already started",
            ));
        }
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(
                ValidationKind::Malformed,
                format!("player name must be 1 to {MAX_NAME_LEN} characters"),
            ));
        }
        if self.members.len() >= usize::from(self.settings.max_players) {
            return Err(DomainError::validation(
                ValidationKind::RoomFull,
                format!("room {} is full", self.code),
            ));
        }

        let seat = self.members.len() as PlayerId;
        let key = Uuid::new_v4();
        self.members.push(Member {
            key,
            name: name.to_string(),
            ready: false,
            host: self.members.is_empty(),
            connections: 0,
            left: false,
        });
        let events = vec![RoomEvent::Lobby(LobbyEvent::MemberJoined {
            seat,
            name: name.to_string(),
        })];
        self.commit(Recorded::Join { name: name.to_string() }, &events);
        info!(room_code = %self.code, seat, "[ROOM] member joined");
        Ok((JoinTicket { key, seat }, events))
    }

    /// Apply one intent from the member holding `key`. Nothing changes when
    /// it is rejected, except that a fatal error freezes the room.
    pub fn handle(
        &mut self,
        key: Uuid,
        intent: RoomIntent,
        expected_version: Option<u64>,
    ) -> Result<Vec<RoomEvent>, DomainError> {
        self.ensure_mutable()?;
        if let Some(expected) = expected_version {
            if expected != self.version {
                return Err(DomainError::conflict(
                    ConflictKind::OptimisticLock,
                    format!("expected version {expected}, room is at {}", self.version),
                ));
            }
        }
        let seat = self.seat_of(key)?;
        let events = match &intent {
            RoomIntent::Lobby(LobbyIntent::SetReady { ready }) => self.set_ready(seat, *ready)?,
            RoomIntent::Lobby(LobbyIntent::StartGame) => self.start(seat)?,
            RoomIntent::Lobby(LobbyIntent::LeaveRoom) => self.leave(seat)?,
            RoomIntent::Game(action) => {
                let action = action.clone();
                self.run_game(|s, ev| apply_action(s, seat, action, ev))?
            }
        };
        debug!(
            room_code = %self.code,
            seat,
            intent = intent.name(),
            version = self.version + 1,
            "[ROOM] intent applied"
        );
        self.commit(Recorded::Intent { seat, intent }, &events);
        Ok(events)
    }

    /// Skip the current turn on behalf of an absent player.
    pub fn skip_turn(&mut self) -> Result<Vec<RoomEvent>, DomainError> {
        self.ensure_mutable()?;
        if self.status != RoomStatus::InProgress {
            return Ok(Vec::new());
        }
        let events = self.run_game(skip_turn)?;
        info!(room_code = %self.code, version = self.version + 1, "[ROOM] turn skipped");
        self.commit(Recorded::TurnSkipped, &events);
        Ok(events)
    }

    /// Relay a chat line from the member holding `key`. Blank lines are
    /// dropped. Chat is logged but is not part of the replayable history.
    pub fn chat(&mut self, key: Uuid, message: &str) -> Result<Vec<RoomEvent>, DomainError> {
        self.ensure_mutable()?;
        let seat = self.seat_of(key)?;
        let message = message.trim();
        if message.is_empty() {
            return Ok(Vec::new());
        }
        if message.chars().count() > MAX_CHAT_LEN {
            return Err(DomainError::validation(
                ValidationKind::Malformed,
                format!("chat messages are limited to {MAX_CHAT_LEN} characters"),
            ));
        }
        let player_name = self.member_mut(seat)?.name.clone();
        let event = RoomEvent::Lobby(LobbyEvent::ChatMessage {
            seat,
            player_name,
            message: message.to_string(),
            timestamp: OffsetDateTime::now_utc(),
        });
        self.log.push(self.version, event.clone());
        Ok(vec![event])
    }

    /// Count one more socket for the member holding `key`. Works on frozen
    /// rooms so clients can still read the final state.
    pub fn connect(&mut self, key: Uuid) -> Result<(PlayerId, Vec<RoomEvent>), DomainError> {
        let seat = self.seat_of(key)?;
        let events = match self.members.get_mut(usize::from(seat)) {
            Some(member) => {
                member.connections += 1;
                if member.connections == 1 {
                    self.connection_changed(seat, true)
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };
        Ok((seat, events))
    }

    /// Drop one socket; the seat only goes offline once none are left.
    pub fn disconnect(&mut self, key: Uuid) -> Vec<RoomEvent> {
        let Ok(seat) = self.seat_of(key) else {
            return Vec::new();
        };
        let Some(member) = self.members.get_mut(usize::from(seat)) else {
            return Vec::new();
        };
        if member.connections == 0 {
            return Vec::new();
        }
        member.connections -= 1;
        if member.connections == 0 {
            self.connection_changed(seat, false)
        } else {
            Vec::new()
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            status: self.status,
            version: self.version,
            settings: self.settings.clone(),
            members: self
                .members
                .iter()
                .enumerate()
                .map(|(seat, m)| MemberPublic {
                    seat: seat as PlayerId,
                    name: m.name.clone(),
                    ready: m.ready,
                    host: m.host,
                    connected: m.is_connected(),
                    left: m.left,
                })
                .collect(),
            game: self.game.as_ref().map(snapshot),
            frozen_reason: self.frozen_reason.clone(),
        }
    }

    /// The event every client receives once the room has frozen.
    pub fn frozen_event(&self) -> Option<RoomEvent> {
        self.frozen_reason.as_ref().map(|message| {
            RoomEvent::Lobby(LobbyEvent::RoomFrozen {
                message: message.clone(),
            })
        })
    }

    #[cfg(test)]
    pub(crate) fn game_mut(&mut self) -> Option<&mut GameState> {
        self.game.as_mut()
    }

    fn ensure_mutable(&self) -> Result<(), DomainError> {
        match &self.frozen_reason {
            Some(reason) => Err(DomainError::conflict(
                ConflictKind::RoomFrozen,
                format!("room {} is frozen: {reason}", self.code),
            )),
            None => Ok(()),
        }
    }

    fn seat_of(&self, key: Uuid) -> Result<PlayerId, DomainError> {
        let seat = self
            .members
            .iter()
            .position(|m| m.key == key && !m.left)
            .ok_or_else(|| DomainError::validation(ValidationKind::NotSeated, "not seated in this room"))?;
        Ok(seat as PlayerId)
    }

    fn member_mut(&mut self, seat: PlayerId) -> Result<&mut Member, DomainError> {
        self.members
            .get_mut(usize::from(seat))
            .ok_or_else(|| DomainError::fatal(format!("seat {seat} has no member")))
    }

    fn commit(&mut self, record: Recorded, events: &[RoomEvent]) {
        self.version += 1;
        self.history.push(record);
        self.log.extend(self.version, events.iter().cloned());
    }

    fn connection_changed(&mut self, seat: PlayerId, connected: bool) -> Vec<RoomEvent> {
        let event = RoomEvent::Lobby(LobbyEvent::ConnectionChanged { seat, connected });
        self.log.push(self.version, event.clone());
        vec![event]
    }

    fn set_ready(&mut self, seat: PlayerId, ready: bool) -> Result<Vec<RoomEvent>, DomainError> {
        if self.status != RoomStatus::Lobby {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                "ready state only matters in the lobby",
            ));
        }
        self.member_mut(seat)?.ready = ready;
        Ok(vec![RoomEvent::Lobby(LobbyEvent::ReadyChanged { seat, ready })])
    }

    fn start(&mut self, seat: PlayerId) -> Result<Vec<RoomEvent>, DomainError> {
        if self.status != RoomStatus::Lobby {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                "the game has already started",
            ));
        }
        if !self.member_mut(seat)?.host {
            return Err(DomainError::validation(ValidationKind::NotHost, "only the host can start the game"));
        }
        if self.members.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                "at least two players are needed",
            ));
        }
        // The host starting the game counts as their ready.
        if let Some(m) = self.members.iter().find(|m| !m.host && !m.ready) {
            return Err(DomainError::validation(
                ValidationKind::PlayersNotReady,
                format!("{} is not ready", m.name),
            ));
        }

        let names = self.members.iter().map(|m| m.name.clone()).collect();
        let game = GameState::new(self.settings.clone(), names, self.seed)?;
        let first = GameEvent::TurnChanged {
            player_id: game.current,
            phase: game.phase,
        };
        self.game = Some(game);
        self.status = RoomStatus::InProgress;
        info!(room_code = %self.code, players = self.members.len(), "[ROOM] game started");
        Ok(vec![
            RoomEvent::Lobby(LobbyEvent::GameStarted {
                players: self.members.len(),
            }),
            RoomEvent::Game(first),
        ])
    }

    fn leave(&mut self, seat: PlayerId) -> Result<Vec<RoomEvent>, DomainError> {
        let mut events = Vec::new();
        let name = self.member_mut(seat)?.name.clone();
        let was_host = self.member_mut(seat)?.host;

        if self.status == RoomStatus::Lobby {
            self.members.remove(usize::from(seat));
        } else {
            if self.status == RoomStatus::InProgress {
                let still_playing = self
                    .game
                    .as_ref()
                    .and_then(|g| g.ledger.player(seat).ok())
                    .is_some_and(|p| !p.bankrupt);
                if still_playing {
                    events.extend(self.run_game(|s, ev| forfeit(s, seat, ev))?);
                }
            }
            let member = self.member_mut(seat)?;
            member.left = true;
            member.connections = 0;
            member.host = false;
        }
        events.push(RoomEvent::Lobby(LobbyEvent::MemberLeft { seat, name }));

        if was_host {
            let next = self.members.iter().position(|m| !m.left);
            if let Some(next) = next {
                self.members[next].host = true;
                events.push(RoomEvent::Lobby(LobbyEvent::HostChanged {
                    seat: next as PlayerId,
                }));
            }
        }
        Ok(events)
    }

    /// Run a game operation as one transaction. A fatal failure freezes the
    /// room; other failures leave it untouched.
    fn run_game<F>(&mut self, op: F) -> Result<Vec<RoomEvent>, DomainError>
    where
        F: FnOnce(&mut GameState, &mut Vec<GameEvent>) -> Result<(), DomainError>,
    {
        let result = match self.game.as_mut() {
            Some(game) => game.transact(op),
            None => {
                return Err(DomainError::validation(
                    ValidationKind::GameNotStarted,
                    "the game has not started",
                ))
            }
        };
        match result {
            Ok(events) => {
                if self.game.as_ref().is_some_and(GameState::is_over) {
                    self.status = RoomStatus::GameOver;
                }
                Ok(events.into_iter().map(RoomEvent::Game).collect())
            }
            Err(err) => {
                if err.is_fatal() {
                    self.freeze(err.detail());
                }
                Err(err)
            }
        }
    }

    fn freeze(&mut self, reason: &str) {
        error!(room_code = %self.code, version = self.version, reason, "[ROOM] invariant violated, freezing");
        self.status = RoomStatus::Frozen;
        self.frozen_reason = Some(reason.to_string());
        if let Some(event) = self.frozen_event() {
            self.log.push(self.version, event);
        }
    }
}
