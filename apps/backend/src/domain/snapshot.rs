//! Public snapshot API for observing game state without exposing internals.

use serde::Serialize;

use crate::domain::board::SpaceId;
use crate::domain::deck::DeckView;
use crate::domain::ledger::{BankAccount, JailState};
use crate::domain::settings::Edition;
use crate::domain::state::{GameState, TurnPhase};
use crate::domain::trade::TradeOffer;
use crate::domain::{Money, PlayerId};

/// Public info about a single seat.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPublic {
    pub id: PlayerId,
    pub name: String,
    pub cash: Money,
    pub position: SpaceId,
    pub properties: Vec<SpaceId>,
    pub in_jail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jail_turns_remaining: Option<u8>,
    pub jail_cards: usize,
    pub bankrupt: bool,
    pub net_worth: Money,
}

/// One owned space.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPublic {
    pub space_id: SpaceId,
    pub name: &'static str,
    pub owner_id: PlayerId,
    pub houses: u8,
    pub hotel: bool,
    pub mortgaged: bool,
}

/// Everything a display client needs to render the game.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub edition: Edition,
    pub turn_no: u32,
    pub current_player_id: PlayerId,
    pub phase: TurnPhase,
    pub last_roll: Option<[u8; 2]>,
    pub players: Vec<PlayerPublic>,
    pub holdings: Vec<HoldingPublic>,
    pub houses_available: u8,
    pub hotels_available: u8,
    pub decks: Vec<DeckView>,
    pub trades: Vec<TradeOffer>,
    pub bank: BankAccount,
    pub winner_id: Option<PlayerId>,
}

/// Produce a read-only snapshot of the game.
pub fn snapshot(state: &GameState) -> GameSnapshot {
    let board = state.board;
    let players = state
        .ledger
        .players()
        .iter()
        .map(|p| PlayerPublic {
            id: p.id,
            name: p.name.clone(),
            cash: p.cash,
            position: p.position,
            properties: p.properties.iter().copied().collect(),
            in_jail: p.in_jail(),
            jail_turns_remaining: match p.jail {
                JailState::InJail { turns_remaining } => Some(turns_remaining),
                JailState::Free => None,
            },
            jail_cards: p.jail_cards.len(),
            bankrupt: p.bankrupt,
            net_worth: state
                .registry
                .liquidatable_net_worth(board, &state.ledger, p.id)
                .unwrap_or(p.cash),
        })
        .collect();

    let holdings = state
        .registry
        .holdings()
        .filter_map(|(id, h)| {
            let space = board.space(id).ok()?;
            Some(HoldingPublic {
                space_id: id,
                name: space.name,
                owner_id: h.owner,
                houses: h.houses,
                hotel: h.hotel,
                mortgaged: h.mortgaged,
            })
        })
        .collect();

    GameSnapshot {
        edition: state.settings.edition,
        turn_no: state.turn_no,
        current_player_id: state.current,
        phase: state.phase,
        last_roll: state.last_roll.map(|r| r.values()),
        players,
        holdings,
        houses_available: state.registry.houses_available(),
        hotels_available: state.registry.hotels_available(),
        decks: vec![state.chance.view(), state.community.view()],
        trades: state.trades.pending().cloned().collect(),
        bank: state.ledger.bank().clone(),
        winner_id: state.winner(),
    }
}
