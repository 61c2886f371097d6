use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::PlayerId;
use crate::errors::{DomainError, ValidationKind};
use crate::rooms::{JoinTicket, LobbyIntent, RoomBroadcast, RoomHandle, RoomIntent, RoomSnapshot};
use crate::state::app_state::AppState;
use crate::ws::protocol::{ChatMsg, ClientMsg, IntentEnvelope, ServerMsg, SessionMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(Uuid::new_v4(), app_state);
    ws::start(session, &req, stream)
}

/// The seat this connection speaks for.
struct Binding {
    handle: RoomHandle,
    key: Uuid,
    seat: PlayerId,
    stream: SpawnHandle,
}

/// Everything gathered off the actor before a connection is bound.
struct Seated {
    handle: RoomHandle,
    ticket: JoinTicket,
    events: broadcast::Receiver<Arc<RoomBroadcast>>,
    snapshot: Arc<RoomSnapshot>,
}

pub struct WsSession {
    conn_id: Uuid,
    app_state: web::Data<AppState>,
    binding: Option<Binding>,
    /// A create/join/resume is in flight.
    binding_pending: bool,

    last_heartbeat: Instant,
    heartbeat_handle: Option<actix::SpawnHandle>,
}

impl WsSession {
    fn new(conn_id: Uuid, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            app_state,
            binding: None,
            binding_pending: false,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json<T: Serialize>(ctx: &mut ws::WebsocketContext<Self>, msg: &T) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, err: &DomainError) {
        Self::send_json(ctx, &ServerMsg::error(err));
    }

    fn send_error_and_close(&self, ctx: &mut ws::WebsocketContext<Self>, err: &DomainError) {
        Self::send_error(ctx, err);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn handle_session(&mut self, msg: SessionMsg, ctx: &mut ws::WebsocketContext<Self>) {
        if self.binding.is_some() || self.binding_pending {
            Self::send_error(
                ctx,
                &DomainError::validation(
                    ValidationKind::Malformed,
                    "this connection is already bound to a seat",
                ),
            );
            return;
        }
        self.binding_pending = true;

        let rooms = self.app_state.rooms();
        let conn_id = self.conn_id;
        ctx.spawn(
            async move {
                let (handle, key) = match msg {
                    SessionMsg::CreateRoom {
                        player_name,
                        settings,
                    } => {
                        let settings = settings.unwrap_or_else(|| rooms.default_settings());
                        let handle = rooms.create_room(settings)?;
                        let key = handle.join(player_name).await?.key;
                        (handle, key)
                    }
                    SessionMsg::JoinRoom {
                        room_code,
                        player_name,
                    } => {
                        let handle = rooms.get(&room_code)?;
                        let key = handle.join(player_name).await?.key;
                        (handle, key)
                    }
                    SessionMsg::Resume {
                        room_code,
                        player_key,
                    } => (rooms.get(&room_code)?, player_key),
                };
                // Subscribe before connecting so the connection's own
                // broadcast is not missed.
                let events = handle.subscribe();
                let seat = handle.connect(key).await?;
                let snapshot = handle.snapshot();
                Ok::<Seated, DomainError>(Seated {
                    handle,
                    ticket: JoinTicket { key, seat },
                    events,
                    snapshot,
                })
            }
            .into_actor(self)
            .map(move |res, actor, ctx| {
                actor.binding_pending = false;
                match res {
                    Ok(seated) => actor.bind(seated, ctx),
                    Err(err) => {
                        debug!(conn_id = %conn_id, error = %err, "[WS SESSION] could not take a seat");
                        Self::send_error(ctx, &err);
                    }
                }
            }),
        );
    }

    fn bind(&mut self, seated: Seated, ctx: &mut ws::WebsocketContext<Self>) {
        let Seated {
            handle,
            ticket,
            events,
            snapshot,
        } = seated;
        let stream = ctx.add_stream(BroadcastStream::new(events));
        info!(
            conn_id = %self.conn_id,
            room_code = %handle.code(),
            seat = ticket.seat,
            "[WS SESSION] seated"
        );
        Self::send_json(
            ctx,
            &ServerMsg::Welcome {
                protocol: PROTOCOL_VERSION,
                room_code: handle.code(),
                player_key: ticket.key,
                seat: ticket.seat,
            },
        );
        Self::send_json(ctx, &ServerMsg::RoomState { room: &snapshot });
        self.binding = Some(Binding {
            handle,
            key: ticket.key,
            seat: ticket.seat,
            stream,
        });
    }

    fn unbind(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        if let Some(binding) = self.binding.take() {
            ctx.cancel_future(binding.stream);
            info!(
                conn_id = %self.conn_id,
                room_code = %binding.handle.code(),
                seat = binding.seat,
                "[WS SESSION] left the room"
            );
        }
    }

    fn handle_chat(&mut self, msg: ChatMsg, ctx: &mut ws::WebsocketContext<Self>) {
        let ChatMsg::Chat { message } = msg;
        let Some(binding) = &self.binding else {
            Self::send_error(
                ctx,
                &DomainError::validation(ValidationKind::NotSeated, "create, join or resume a room first"),
            );
            return;
        };
        let handle = binding.handle.clone();
        let key = binding.key;
        ctx.spawn(
            async move { handle.chat(key, message).await }
                .into_actor(self)
                .map(|res, _actor, ctx| {
                    if let Err(err) = res {
                        Self::send_error(ctx, &err);
                    }
                }),
        );
    }

    fn handle_intent(&mut self, envelope: IntentEnvelope, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(binding) = &self.binding else {
            Self::send_error(
                ctx,
                &DomainError::validation(ValidationKind::NotSeated, "create, join or resume a room first"),
            );
            return;
        };
        let leaving = envelope.intent == RoomIntent::Lobby(LobbyIntent::LeaveRoom);
        let handle = binding.handle.clone();
        let key = binding.key;
        ctx.spawn(
            async move {
                handle
                    .submit(key, envelope.intent, envelope.expected_version)
                    .await
            }
            .into_actor(self)
            .map(move |res, actor, ctx| match res {
                Ok(_) if leaving => actor.unbind(ctx),
                Ok(_) => {}
                Err(err) => Self::send_error(ctx, &err),
            }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(binding) = self.binding.take() {
            actix::spawn(async move {
                binding.handle.disconnect(binding.key).await;
            });
        }
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match ClientMsg::parse(&text) {
                    Ok(ClientMsg::Session(msg)) => self.handle_session(msg, ctx),
                    Ok(ClientMsg::Chat(msg)) => self.handle_chat(msg, ctx),
                    Ok(ClientMsg::Intent(envelope)) => self.handle_intent(envelope, ctx),
                    Err(err) => Self::send_error(ctx, &err),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(
                    ctx,
                    &DomainError::validation(ValidationKind::Malformed, "binary frames are not supported"),
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl StreamHandler<Result<Arc<RoomBroadcast>, BroadcastStreamRecvError>> for WsSession {
    fn handle(&mut self, msg: Result<Arc<RoomBroadcast>, BroadcastStreamRecvError>, ctx: &mut Self::Context) {
        match msg {
            Ok(update) => {
                for event in &update.events {
                    Self::send_json(ctx, event);
                }
                Self::send_json(ctx, &ServerMsg::RoomState { room: &update.snapshot });
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(conn_id = %self.conn_id, skipped, "[WS SESSION] lagging behind the room, resyncing");
                if let Some(binding) = &self.binding {
                    let snapshot = binding.handle.snapshot();
                    Self::send_json(ctx, &ServerMsg::RoomState { room: &snapshot });
                }
            }
        }
    }

    // The room outlives any single subscription; the socket stays open.
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}
