//! Drives one room from lobby to game over with bots in every seat.

use monopoly_backend::domain::{GameEvent, PlayerId, RoomSettings};
use monopoly_backend::errors::DomainError;
use monopoly_backend::rooms::{LobbyIntent, Room, RoomEvent, RoomIntent, RoomStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::bot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Won,
    /// Step limit reached before anyone won.
    Stalled,
    /// The room froze on a broken invariant.
    Frozen,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReport {
    pub game: u32,
    pub seed: u64,
    pub outcome: Outcome,
    pub winner: Option<PlayerId>,
    pub steps: u32,
    pub turns: u32,
    pub bankruptcies: u32,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_reason: Option<String>,
    pub finished_at: String,
}

pub struct GameSpec {
    pub game: u32,
    pub seed: u64,
    pub players: u8,
    pub settings: RoomSettings,
    pub max_steps: u32,
}

pub fn play(spec: GameSpec) -> Result<GameReport, DomainError> {
    let mut room = Room::new(format!("SIM{:03}", spec.game % 1000), spec.settings, spec.seed)?;
    let mut keys = Vec::with_capacity(usize::from(spec.players));
    for seat in 0..spec.players {
        let (ticket, _) = room.join(&format!("Bot {}", seat + 1))?;
        keys.push(ticket.key);
    }
    for key in keys.iter().skip(1) {
        room.handle(*key, LobbyIntent::SetReady { ready: true }.into(), None)?;
    }
    room.handle(keys[0], LobbyIntent::StartGame.into(), None)?;

    let mut rng = StdRng::seed_from_u64(spec.seed.rotate_left(17));
    let mut steps = 0;
    let mut bankruptcies = 0;

    while steps < spec.max_steps && room.status() == RoomStatus::InProgress {
        let (Some((seat, _)), Some(state)) = (room.awaited(), room.game()) else {
            break;
        };
        let Some(action) = bot::choose(state, seat, &mut rng) else {
            warn!(game = spec.game, seat, "no legal action for the awaited seat");
            break;
        };
        steps += 1;
        debug!(game = spec.game, step = steps, seat, action = action.name(), "bot acts");
        match room.handle(keys[usize::from(seat)], RoomIntent::Game(action), None) {
            Ok(events) => {
                if let Some(game) = room.game() {
                    game.check_invariants()?;
                }
                bankruptcies += events
                    .iter()
                    .filter(|e| matches!(e, RoomEvent::Game(GameEvent::PlayerBankrupt { .. })))
                    .count() as u32;
            }
            Err(err) if err.is_fatal() => break,
            Err(err) => {
                // A probed-legal action should not be rejected; stop rather than spin.
                warn!(game = spec.game, seat, error = %err, "legal action rejected");
                break;
            }
        }
    }

    let outcome = match room.status() {
        RoomStatus::GameOver => Outcome::Won,
        RoomStatus::Frozen => Outcome::Frozen,
        _ => Outcome::Stalled,
    };
    let finished_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(GameReport {
        game: spec.game,
        seed: spec.seed,
        outcome,
        winner: room.game().and_then(|g| g.winner()),
        steps,
        turns: room.game().map_or(0, |g| g.turn_no),
        bankruptcies,
        version: room.version(),
        frozen_reason: room.frozen_reason().map(str::to_string),
        finished_at,
    })
}
