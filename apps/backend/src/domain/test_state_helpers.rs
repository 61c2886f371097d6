//! Test-only game state helpers for domain unit tests.

use crate::domain::actions::{apply_action, Action};
use crate::domain::board::SpaceId;
use crate::domain::dice::{Dice, DiceRoll};
use crate::domain::events::GameEvent;
use crate::domain::ledger::BankFlow;
use crate::domain::settings::RoomSettings;
use crate::domain::state::GameState;
use crate::domain::{Money, PlayerId};
use crate::errors::domain::DomainError;

/// Classic-edition game for `players` seats whose dice play `rolls` first.
pub fn classic_game(players: usize, rolls: &[(u8, u8)]) -> GameState {
    let names = ["Asha", "Bilal", "Chen", "Dara", "Emeka", "Farah"]
        .iter()
        .take(players)
        .map(|n| n.to_string())
        .collect();
    GameState::new(RoomSettings::classic(), names, 42)
        .unwrap()
        .with_dice(Dice::scripted(rolls.iter().map(|(a, b)| roll(*a, *b)), 42))
}

pub fn roll(first: u8, second: u8) -> DiceRoll {
    DiceRoll::new(first, second).unwrap()
}

/// Apply an action transactionally, panicking on rejection.
pub fn act(state: &mut GameState, who: PlayerId, action: Action) -> Vec<GameEvent> {
    let label = format!("{action:?}");
    try_act(state, who, action).unwrap_or_else(|e| panic!("seat {who} {label} rejected: {e}"))
}

pub fn try_act(state: &mut GameState, who: PlayerId, action: Action) -> Result<Vec<GameEvent>, DomainError> {
    state.transact(|s, ev| apply_action(s, who, action, ev))
}

/// Hand spaces to a player free of charge.
pub fn give(state: &mut GameState, who: PlayerId, spaces: &[SpaceId]) {
    let board = state.board;
    for space in spaces {
        let price = state
            .registry
            .purchase(board, &mut state.ledger, who, *space)
            .unwrap();
        state.ledger.credit(who, price, BankFlow::Purchase).unwrap();
    }
}

/// Set a player's cash through the bank so the books stay balanced.
pub fn set_cash(state: &mut GameState, who: PlayerId, cash: Money) {
    let current = state.ledger.player(who).unwrap().cash;
    if cash > current {
        state.ledger.credit(who, cash - current, BankFlow::Card).unwrap();
    } else {
        state.ledger.debit(who, current - cash, BankFlow::Card).unwrap();
    }
}

pub fn place(state: &mut GameState, who: PlayerId, space: SpaceId) {
    state.ledger.move_player_to(who, space).unwrap();
}

pub fn cash(state: &GameState, who: PlayerId) -> Money {
    state.ledger.player(who).unwrap().cash
}
