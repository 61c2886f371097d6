//! One task per room. Every mutation goes through its queue and is applied in
//! arrival order; results fan out over watch and broadcast channels.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::room::{JoinTicket, Room, RoomEvent, RoomIntent, RoomSnapshot};
use crate::domain::PlayerId;
use crate::errors::domain::{DomainError, NotFoundKind};

/// Slow subscribers past this many pending broadcasts start lagging.
const BROADCAST_CAPACITY: usize = 256;

type Reply<T> = oneshot::Sender<Result<T, DomainError>>;

pub enum RoomCommand {
    Join {
        name: String,
        reply: Reply<JoinTicket>,
    },
    Submit {
        key: Uuid,
        intent: RoomIntent,
        expected_version: Option<u64>,
        reply: Reply<u64>,
    },
    Chat {
        key: Uuid,
        message: String,
        reply: Reply<()>,
    },
    Connect {
        key: Uuid,
        reply: Reply<PlayerId>,
    },
    Disconnect {
        key: Uuid,
    },
    Shutdown,
}

/// What live sessions receive after each applied change.
#[derive(Debug)]
pub struct RoomBroadcast {
    pub version: u64,
    pub events: Vec<RoomEvent>,
    pub snapshot: Arc<RoomSnapshot>,
}

/// Cheap, cloneable access to a running room.
#[derive(Clone)]
pub struct RoomHandle {
    code: String,
    commands: mpsc::Sender<RoomCommand>,
    snapshot: watch::Receiver<Arc<RoomSnapshot>>,
    broadcast: broadcast::Sender<Arc<RoomBroadcast>>,
}

impl RoomHandle {
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Latest published state. Never waits on the worker.
    pub fn snapshot(&self) -> Arc<RoomSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<RoomSnapshot>> {
        self.snapshot.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RoomBroadcast>> {
        self.broadcast.subscribe()
    }

    /// The worker has stopped and will accept nothing more.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub async fn join(&self, name: impl Into<String>) -> Result<JoinTicket, DomainError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join { name, reply }).await
    }

    /// Submit an intent; resolves to the room version after it was applied.
    pub async fn submit(
        &self,
        key: Uuid,
        intent: RoomIntent,
        expected_version: Option<u64>,
    ) -> Result<u64, DomainError> {
        self.request(|reply| RoomCommand::Submit {
            key,
            intent,
            expected_version,
            reply,
        })
        .await
    }

    /// Relay a chat line to everyone in the room. The version is unchanged.
    pub async fn chat(&self, key: Uuid, message: impl Into<String>) -> Result<(), DomainError> {
        let message = message.into();
        self.request(|reply| RoomCommand::Chat { key, message, reply }).await
    }

    pub async fn connect(&self, key: Uuid) -> Result<PlayerId, DomainError> {
        self.request(|reply| RoomCommand::Connect { key, reply }).await
    }

    pub async fn disconnect(&self, key: Uuid) {
        // A closed room has nobody left to tell.
        let _ = self.commands.send(RoomCommand::Disconnect { key }).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(RoomCommand::Shutdown).await;
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> RoomCommand) -> Result<T, DomainError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| closed(&self.code))?;
        rx.await.map_err(|_| closed(&self.code))?
    }
}

fn closed(code: &str) -> DomainError {
    DomainError::not_found(NotFoundKind::Room, format!("room {code} is closed"))
}

/// Start the worker task for `room`. Must be called inside a tokio runtime.
pub fn spawn_room(room: Room, queue_depth: usize) -> RoomHandle {
    let code = room.code().to_string();
    let (commands, rx) = mpsc::channel(queue_depth.max(1));
    let (snapshot_tx, snapshot) = watch::channel(Arc::new(room.snapshot()));
    let (broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

    let worker = RoomWorker {
        turn_timeout: Duration::from_secs(room.settings().turn_timeout_secs),
        room,
        commands: rx,
        snapshot: snapshot_tx,
        broadcast: broadcast.clone(),
        deadline: None,
    };
    tokio::spawn(worker.run());

    RoomHandle {
        code,
        commands,
        snapshot,
        broadcast,
    }
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    seat: PlayerId,
    turn: u32,
    at: Instant,
}

struct RoomWorker {
    room: Room,
    commands: mpsc::Receiver<RoomCommand>,
    snapshot: watch::Sender<Arc<RoomSnapshot>>,
    broadcast: broadcast::Sender<Arc<RoomBroadcast>>,
    turn_timeout: Duration,
    deadline: Option<Deadline>,
}

impl RoomWorker {
    async fn run(mut self) {
        info!(room_code = %self.room.code(), "[ROOM] worker started");
        loop {
            let expires = self.deadline.map(|d| d.at);
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    None | Some(RoomCommand::Shutdown) => break,
                    Some(cmd) => self.dispatch(cmd),
                },
                () = sleep_until(expires) => self.on_deadline(),
            }
            if self.room.is_abandoned() {
                info!(room_code = %self.room.code(), "[ROOM] everyone left");
                break;
            }
            self.rearm();
        }
        info!(room_code = %self.room.code(), version = self.room.version(), "[ROOM] worker stopped");
    }

    fn dispatch(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { name, reply } => {
                let result = self.room.join(&name).map(|(ticket, events)| {
                    self.publish(events);
                    ticket
                });
                let _ = reply.send(result);
            }
            RoomCommand::Submit {
                key,
                intent,
                expected_version,
                reply,
            } => {
                let result = match self.room.handle(key, intent, expected_version) {
                    Ok(events) => {
                        self.publish(events);
                        Ok(self.room.version())
                    }
                    Err(err) => {
                        self.report(&err);
                        Err(err)
                    }
                };
                let _ = reply.send(result);
            }
            RoomCommand::Chat { key, message, reply } => {
                let result = self.room.chat(key, &message).map(|events| {
                    if !events.is_empty() {
                        self.publish(events);
                    }
                });
                let _ = reply.send(result);
            }
            RoomCommand::Connect { key, reply } => {
                let result = self.room.connect(key).map(|(seat, events)| {
                    self.publish(events);
                    seat
                });
                let _ = reply.send(result);
            }
            RoomCommand::Disconnect { key } => {
                let events = self.room.disconnect(key);
                if !events.is_empty() {
                    self.publish(events);
                }
            }
            RoomCommand::Shutdown => {}
        }
    }

    fn on_deadline(&mut self) {
        let Some(expired) = self.deadline.take() else {
            return;
        };
        info!(
            room_code = %self.room.code(),
            seat = expired.seat,
            turn = expired.turn,
            "[ROOM] turn deadline passed, skipping"
        );
        match self.room.skip_turn() {
            Ok(events) => self.publish(events),
            Err(err) => self.report(&err),
        }
    }

    /// Arm a deadline while the seat being waited on is disconnected; keep
    /// an already armed one for the same turn.
    fn rearm(&mut self) {
        let waiting = self
            .room
            .awaited()
            .filter(|(seat, _)| !self.room.is_connected(*seat));
        self.deadline = match (waiting, self.deadline) {
            (Some((seat, turn)), Some(d)) if d.seat == seat && d.turn == turn => Some(d),
            (Some((seat, turn)), _) => match Instant::now().checked_add(self.turn_timeout) {
                Some(at) => {
                    debug!(room_code = %self.room.code(), seat, turn, "[ROOM] turn deadline armed");
                    Some(Deadline { seat, turn, at })
                }
                None => {
                    warn!(room_code = %self.room.code(), seat, turn, "[ROOM] turn timeout out of range, no deadline");
                    None
                }
            },
            (None, _) => None,
        };
    }

    fn report(&mut self, err: &DomainError) {
        if err.is_fatal() {
            if let Some(event) = self.room.frozen_event() {
                self.publish(vec![event]);
            }
        } else {
            debug!(room_code = %self.room.code(), error = %err, "[ROOM] intent rejected");
        }
    }

    fn publish(&mut self, events: Vec<RoomEvent>) {
        let snapshot = Arc::new(self.room.snapshot());
        self.snapshot.send_replace(snapshot.clone());
        let message = Arc::new(RoomBroadcast {
            version: self.room.version(),
            events,
            snapshot,
        });
        if self.broadcast.send(message).is_err() {
            debug!(room_code = %self.room.code(), "[ROOM] no live subscribers");
        }
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
