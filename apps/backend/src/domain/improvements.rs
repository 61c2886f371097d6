//! Building, selling and mortgaging. Any active player may manage their
//! own properties at any point of the game, not only on their turn.

use super::board::SpaceId;
use super::events::GameEvent;
use super::registry::BuildingKind;
use super::state::{require_active, GameState};
use super::PlayerId;
use crate::errors::domain::DomainError;

pub fn build(
    state: &mut GameState,
    who: PlayerId,
    space_id: SpaceId,
    kind: BuildingKind,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    require_active(state, who)?;
    let board = state.board;
    match kind {
        BuildingKind::House => state.registry.build_house(board, &mut state.ledger, who, space_id)?,
        BuildingKind::Hotel => state.registry.build_hotel(board, &mut state.ledger, who, space_id)?,
    };
    push_buildings(state, space_id, events);
    Ok(())
}

pub fn sell_building(
    state: &mut GameState,
    who: PlayerId,
    space_id: SpaceId,
    kind: BuildingKind,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    require_active(state, who)?;
    let board = state.board;
    match kind {
        BuildingKind::House => state.registry.sell_house(board, &mut state.ledger, who, space_id)?,
        BuildingKind::Hotel => state.registry.sell_hotel(board, &mut state.ledger, who, space_id)?,
    };
    push_buildings(state, space_id, events);
    Ok(())
}

pub fn mortgage(state: &mut GameState, who: PlayerId, space_id: SpaceId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_active(state, who)?;
    let board = state.board;
    state
        .registry
        .mortgage(board, &mut state.ledger, who, space_id)?;
    events.push(GameEvent::MortgageChanged {
        space_id,
        mortgaged: true,
    });
    Ok(())
}

pub fn unmortgage(state: &mut GameState, who: PlayerId, space_id: SpaceId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_active(state, who)?;
    let board = state.board;
    state
        .registry
        .unmortgage(board, &mut state.ledger, &state.settings, who, space_id)?;
    events.push(GameEvent::MortgageChanged {
        space_id,
        mortgaged: false,
    });
    Ok(())
}

fn push_buildings(state: &GameState, space_id: SpaceId, events: &mut Vec<GameEvent>) {
    if let Some(h) = state.registry.holding(space_id) {
        events.push(GameEvent::BuildingsChanged {
            space_id,
            houses: h.houses,
            hotel: h.hotel,
        });
    }
}
