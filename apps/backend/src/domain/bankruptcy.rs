//! Raising funds, forced liquidation and bankruptcy.

use super::board::SpaceId;
use super::events::GameEvent;
use super::ledger::{BankFlow, JailState};
use super::registry::BuildingKind;
use super::state::{require_active, Creditor, GameState, TurnPhase};
use super::turn::advance_turn;
use super::{Money, PlayerId};
use crate::errors::domain::{DomainError, RuleKind};

/// Player-initiated bankruptcy. While a debt is pending on the declaring
/// player's turn its creditor takes the assets; otherwise the bank does.
pub fn declare_bankruptcy(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_active(state, who)?;
    let creditor = match state.phase {
        TurnPhase::AwaitingPayment { debt } if state.current == who => debt.creditor,
        _ => Creditor::Bank,
    };
    bankrupt(state, who, creditor, events)
}

/// A player walked away from the table; everything they hold goes to the bank.
pub fn forfeit(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_active(state, who)?;
    bankrupt(state, who, Creditor::Bank, events)
}

/// Eliminate `debtor`. Buildings go back to the bank first, then cash and
/// titles pass to a player creditor or revert to the bank.
pub(crate) fn bankrupt(
    state: &mut GameState,
    debtor: PlayerId,
    creditor: Creditor,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    let board = state.board;
    state
        .registry
        .sell_all_buildings(board, &mut state.ledger, debtor, None)?;

    let cards = std::mem::take(&mut state.ledger.player_mut(debtor)?.jail_cards);
    for held in cards {
        state.deck_mut(held.deck).return_card(held.card)?;
    }

    let properties: Vec<SpaceId> = state.ledger.player(debtor)?.properties.iter().copied().collect();
    let cash = state.ledger.player(debtor)?.cash;
    match creditor {
        Creditor::Player { player_id } if !state.ledger.player(player_id)?.bankrupt => {
            state.ledger.transfer(debtor, player_id, cash)?;
            for id in properties {
                state.registry.transfer(&mut state.ledger, id, player_id)?;
            }
        }
        _ => {
            state.ledger.debit(debtor, cash, BankFlow::Bankruptcy)?;
            for id in properties {
                state.registry.release_to_bank(&mut state.ledger, id)?;
            }
        }
    }

    let player = state.ledger.player_mut(debtor)?;
    player.bankrupt = true;
    player.jail = JailState::Free;
    player.doubles_streak = 0;
    tracing::info!(player_id = debtor, ?creditor, "player bankrupt");
    events.push(GameEvent::PlayerBankrupt {
        player_id: debtor,
        creditor,
    });
    state.trades.expire_involving(debtor, events);

    let active = state.active_players();
    if let [winner] = active[..] {
        state.trades.expire_all(events);
        state.phase = TurnPhase::GameOver { winner_id: winner };
        events.push(GameEvent::GameOver { winner_id: winner });
        return Ok(());
    }
    if state.current == debtor {
        advance_turn(state, events)?;
    }
    Ok(())
}

/// Make sure `who` holds `amount` in cash, liquidating if that is enough.
/// Returns `false` when even full liquidation falls short and the player
/// was bankrupted to `creditor` instead.
pub(crate) fn cover_or_bankrupt(
    state: &mut GameState,
    who: PlayerId,
    amount: Money,
    creditor: Creditor,
    events: &mut Vec<GameEvent>,
) -> Result<bool, DomainError> {
    if state.ledger.player(who)?.cash >= amount {
        return Ok(true);
    }
    let worth = state
        .registry
        .liquidatable_net_worth(state.board, &state.ledger, who)?;
    if worth >= amount {
        raise_cash(state, who, amount, events)?;
        return Ok(true);
    }
    bankrupt(state, who, creditor, events)?;
    Ok(false)
}

/// Sell buildings, then mortgage properties, until `who` holds `target`.
/// Buildings go first, tallest first; mortgages follow board order.
pub fn raise_cash(state: &mut GameState, who: PlayerId, target: Money, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    while state.ledger.player(who)?.cash < target {
        if sell_one_building(state, who, events)? || mortgage_one(state, who, events)? {
            continue;
        }
        return Err(DomainError::rule(
            RuleKind::InsufficientFunds,
            format!("seat {who} cannot raise {target}"),
        ));
    }
    Ok(())
}

fn sell_one_building(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<bool, DomainError> {
    let board = state.board;
    let mut built: Vec<(SpaceId, u8, bool)> = state
        .registry
        .owned_by(who)
        .filter(|(_, h)| h.has_buildings())
        .map(|(id, h)| (id, h.level(), h.hotel))
        .collect();
    built.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (space, _, hotel) in &built {
        let sold = if *hotel {
            state
                .registry
                .sell_hotel(board, &mut state.ledger, who, *space)
        } else {
            state
                .registry
                .sell_house(board, &mut state.ledger, who, *space)
        };
        if sold.is_ok() {
            push_buildings(state, *space, events);
            return Ok(true);
        }
    }

    // A hotel the bank cannot break down: sell the whole group outright.
    let Some((space, _, _)) = built.first() else {
        return Ok(false);
    };
    let group = board.space(*space)?.group();
    state
        .registry
        .sell_all_buildings(board, &mut state.ledger, who, group)?;
    for (id, _, _) in &built {
        if board.space(*id)?.group() == group {
            push_buildings(state, *id, events);
        }
    }
    Ok(true)
}

fn mortgage_one(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<bool, DomainError> {
    let board = state.board;
    let candidates: Vec<SpaceId> = state
        .registry
        .owned_by(who)
        .filter(|(_, h)| !h.mortgaged)
        .map(|(id, _)| id)
        .collect();
    for space in candidates {
        if state
            .registry
            .mortgage(board, &mut state.ledger, who, space)
            .is_ok()
        {
            events.push(GameEvent::MortgageChanged {
                space_id: space,
                mortgaged: true,
            });
            return Ok(true);
        }
    }
    Ok(false)
}

fn push_buildings(state: &GameState, space: SpaceId, events: &mut Vec<GameEvent>) {
    if let Some(h) = state.registry.holding(space) {
        events.push(GameEvent::BuildingsChanged {
            space_id: space,
            houses: h.houses,
            hotel: h.hotel,
        });
    }
}

/// Every other active player pays `collector`, liquidating or going
/// bankrupt off-turn as needed.
pub(crate) fn collect_from_each(
    state: &mut GameState,
    collector: PlayerId,
    amount: Money,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    let payers: Vec<PlayerId> = state
        .ledger
        .active_ids()
        .filter(|id| *id != collector)
        .collect();
    for payer in payers {
        if state.is_over() {
            break;
        }
        let creditor = Creditor::Player {
            player_id: collector,
        };
        if cover_or_bankrupt(state, payer, amount, creditor, events)? {
            state.ledger.transfer(payer, collector, amount)?;
            events.push(GameEvent::Payment {
                from: Some(payer),
                to: Some(collector),
                amount,
            });
        }
    }
    Ok(())
}

/// Which building a liquidation step would sell next; exposed for bots.
pub fn next_building_to_sell(state: &GameState, who: PlayerId) -> Option<(SpaceId, BuildingKind)> {
    state
        .registry
        .owned_by(who)
        .filter(|(_, h)| h.has_buildings())
        .max_by(|a, b| a.1.level().cmp(&b.1.level()).then(b.0.cmp(&a.0)))
        .map(|(id, h)| {
            let kind = if h.hotel {
                BuildingKind::Hotel
            } else {
                BuildingKind::House
            };
            (id, kind)
        })
}
