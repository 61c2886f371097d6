//! Turn state machine: roll, move, resolve the landing, end the turn.
//!
//! Every public function takes the whole [`GameState`] and appends the events
//! it produced. Callers run them inside [`GameState::transact`] so a failure
//! anywhere leaves the state untouched.

use super::bankruptcy::{bankrupt, collect_from_each, cover_or_bankrupt};
use super::board::{distance_forward, SpaceId, SpaceKind, SpaceType, BOARD_SIZE};
use super::cards::{Card, CardEffect, DeckKind};
use super::dice::DiceRoll;
use super::events::GameEvent;
use super::ledger::{BankFlow, HeldCard, JailState};
use super::state::{phase_mismatch, require_turn, Creditor, Debt, DebtReason, GameState, TurnPhase};
use super::{Money, PlayerId};
use crate::errors::domain::{DomainError, RuleKind};

/// Consecutive doubles that send a player to jail instead of moving.
pub const DOUBLES_TO_JAIL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RentMode {
    Standard,
    /// "Advance to the nearest station": twice the normal rent.
    DoubleRailroad,
    /// "Advance to the nearest utility": ten times the dice.
    TenfoldUtility,
}

pub fn roll_dice(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    match state.phase {
        TurnPhase::AwaitingRoll => roll_and_move(state, who, events),
        TurnPhase::InJail => roll_for_doubles(state, who, events),
        phase => Err(phase_mismatch("roll the dice", &phase)),
    }
}

fn roll_and_move(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let roll = state.dice.roll();
    record_roll(state, who, roll, events);

    let streak = {
        let player = state.ledger.player_mut(who)?;
        player.doubles_streak = if roll.is_doubles() {
            player.doubles_streak + 1
        } else {
            0
        };
        player.doubles_streak
    };
    if streak >= DOUBLES_TO_JAIL {
        state.extra_roll = false;
        jail_player(state, who, events)?;
        return advance_turn(state, events);
    }

    state.extra_roll = roll.is_doubles();
    advance(state, who, roll.total(), events)?;
    resolve_landing(state, who, RentMode::Standard, 0, events)
}

fn roll_for_doubles(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let roll = state.dice.roll();
    record_roll(state, who, roll, events);
    // Leaving jail never earns another roll.
    state.extra_roll = false;

    if !roll.is_doubles() {
        let remaining = match state.ledger.player(who)?.jail {
            JailState::InJail { turns_remaining } => turns_remaining.saturating_sub(1),
            JailState::Free => 0,
        };
        if remaining > 0 {
            state.ledger.player_mut(who)?.jail = JailState::InJail {
                turns_remaining: remaining,
            };
            return set_phase(state, TurnPhase::AwaitingTurnEnd, events);
        }
        // Last attempt missed: bail is taken, raising funds if needed.
        let bail = state.settings.jail_bail;
        if !cover_or_bankrupt(state, who, bail, Creditor::Bank, events)? {
            return Ok(());
        }
        state.ledger.debit(who, bail, BankFlow::Bail)?;
        events.push(GameEvent::Payment {
            from: Some(who),
            to: None,
            amount: bail,
        });
    }

    free_player(state, who, events)?;
    advance(state, who, roll.total(), events)?;
    resolve_landing(state, who, RentMode::Standard, 0, events)
}

/// A skipped turn in jail counts as a missed attempt. Once none remain, bail
/// is taken and the player is released on the jail space without moving.
fn serve_skipped_jail_turn(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let remaining = match state.ledger.player(who)?.jail {
        JailState::InJail { turns_remaining } => turns_remaining.saturating_sub(1),
        JailState::Free => return Ok(()),
    };
    if remaining > 0 {
        state.ledger.player_mut(who)?.jail = JailState::InJail {
            turns_remaining: remaining,
        };
        return Ok(());
    }
    let bail = state.settings.jail_bail;
    if !cover_or_bankrupt(state, who, bail, Creditor::Bank, events)? {
        return Ok(());
    }
    state.ledger.debit(who, bail, BankFlow::Bail)?;
    events.push(GameEvent::Payment {
        from: Some(who),
        to: None,
        amount: bail,
    });
    free_player(state, who, events)
}

fn record_roll(state: &mut GameState, who: PlayerId, roll: DiceRoll, events: &mut Vec<GameEvent>) {
    state.last_roll = Some(roll);
    events.push(GameEvent::DiceRolled {
        player_id: who,
        values: roll.values(),
    });
}

/// Move forward `steps`, paying salary when passing or landing on GO.
fn advance(state: &mut GameState, who: PlayerId, steps: u8, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    state.phase = TurnPhase::Moving;
    let from = state.ledger.player(who)?.position;
    let total = u16::from(from) + u16::from(steps);
    let to = (total % u16::from(BOARD_SIZE)) as SpaceId;
    let passed_go = total >= u16::from(BOARD_SIZE);
    state.ledger.move_player_to(who, to)?;
    events.push(GameEvent::PlayerMoved {
        player_id: who,
        position: to,
        passed_go,
    });
    if passed_go {
        let salary = state.settings.go_salary;
        state.ledger.credit(who, salary, BankFlow::Salary)?;
        events.push(GameEvent::SalaryCollected {
            player_id: who,
            amount: salary,
        });
    }
    Ok(())
}

fn resolve_landing(
    state: &mut GameState,
    who: PlayerId,
    mode: RentMode,
    depth: u8,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    state.phase = TurnPhase::ResolvingSpace;
    let position = state.ledger.player(who)?.position;
    let space = state.board.space(position)?;

    match space.kind {
        SpaceKind::Property { .. } | SpaceKind::Railroad { .. } | SpaceKind::Utility { .. } => {
            match state.registry.owner_of(position) {
                None => {
                    return set_phase(
                        state,
                        TurnPhase::AwaitingPurchaseDecision { space_id: position },
                        events,
                    );
                }
                Some(owner) if owner == who => {}
                Some(owner) => {
                    let dice_total = state.last_roll.map_or(0, |r| r.total());
                    let base = state.registry.compute_rent(state.board, position, dice_total)?;
                    let rent = match mode {
                        RentMode::Standard => base,
                        RentMode::DoubleRailroad => base * 2,
                        RentMode::TenfoldUtility if base > 0 => Money::from(dice_total) * 10,
                        RentMode::TenfoldUtility => 0,
                    };
                    if rent > 0 {
                        let debt = Debt {
                            creditor: Creditor::Player { player_id: owner },
                            amount: rent,
                            reason: DebtReason::Rent { space_id: position },
                        };
                        charge(state, who, debt, events)?;
                    }
                }
            }
        }
        SpaceKind::Tax { amount } => {
            let debt = Debt {
                creditor: Creditor::Bank,
                amount,
                reason: DebtReason::Tax { space_id: position },
            };
            charge(state, who, debt, events)?;
        }
        SpaceKind::Chance => draw_card(state, who, DeckKind::Chance, depth, events)?,
        SpaceKind::Community => draw_card(state, who, DeckKind::Community, depth, events)?,
        SpaceKind::GoToJail => {
            state.extra_roll = false;
            jail_player(state, who, events)?;
        }
        SpaceKind::Go | SpaceKind::Jail | SpaceKind::FreeParking => {}
    }

    if !state.phase.is_resting() && state.current == who {
        finish_step(state, who, events)?;
    }
    Ok(())
}

/// Charge `debt` now if cash covers it, otherwise wait for the player to
/// raise funds, or bankrupt them when even full liquidation falls short.
fn charge(state: &mut GameState, who: PlayerId, debt: Debt, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let cash = state.ledger.player(who)?.cash;
    if cash >= debt.amount {
        return pay_now(state, who, debt, events);
    }
    let worth = state
        .registry
        .liquidatable_net_worth(state.board, &state.ledger, who)?;
    if worth >= debt.amount {
        events.push(GameEvent::PaymentRequired { player_id: who, debt });
        return set_phase(state, TurnPhase::AwaitingPayment { debt }, events);
    }
    bankrupt(state, who, debt.creditor, events)
}

pub(crate) fn pay_now(state: &mut GameState, who: PlayerId, debt: Debt, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    // Money owed to a player who has since gone bankrupt goes to the bank.
    let creditor = match debt.creditor {
        Creditor::Player { player_id } if state.ledger.player(player_id)?.bankrupt => Creditor::Bank,
        other => other,
    };
    let recipient = match creditor {
        Creditor::Bank => {
            let flow = match debt.reason {
                DebtReason::Tax { .. } => BankFlow::Tax,
                DebtReason::Bail => BankFlow::Bail,
                DebtReason::Card | DebtReason::Repairs => BankFlow::Card,
                DebtReason::Rent { .. } => BankFlow::Bankruptcy,
            };
            state.ledger.debit(who, debt.amount, flow)?;
            None
        }
        Creditor::Player { player_id } => {
            state.ledger.transfer(who, player_id, debt.amount)?;
            Some(player_id)
        }
        Creditor::EachPlayer { per_player } => {
            let others: Vec<PlayerId> = state.ledger.active_ids().filter(|id| *id != who).collect();
            for other in others {
                state.ledger.transfer(who, other, per_player)?;
                events.push(GameEvent::Payment {
                    from: Some(who),
                    to: Some(other),
                    amount: per_player,
                });
            }
            return Ok(());
        }
    };
    events.push(match (debt.reason, recipient) {
        (DebtReason::Rent { space_id }, Some(to)) => GameEvent::RentCharged {
            from: who,
            to,
            amount: debt.amount,
            space_id,
        },
        (DebtReason::Tax { space_id }, _) => GameEvent::TaxPaid {
            player_id: who,
            amount: debt.amount,
            space_id,
        },
        (_, to) => GameEvent::Payment {
            from: Some(who),
            to,
            amount: debt.amount,
        },
    });
    Ok(())
}

fn draw_card(
    state: &mut GameState,
    who: PlayerId,
    kind: DeckKind,
    depth: u8,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    let card = state.deck_mut(kind).draw()?;
    state.phase = TurnPhase::AwaitingCardOutcome {
        deck: kind,
        card_id: card.id,
    };
    events.push(GameEvent::CardDrawn {
        player_id: who,
        card: card.clone(),
    });
    if card.is_keep() {
        state.deck_mut(kind).withhold(card.id);
        state.ledger.player_mut(who)?.jail_cards.push(HeldCard {
            deck: kind,
            card: card.id,
        });
        return Ok(());
    }
    apply_card(state, who, card, depth, events)?;
    state.deck_mut(kind).discard(card.id);
    Ok(())
}

fn apply_card(
    state: &mut GameState,
    who: PlayerId,
    card: &Card,
    depth: u8,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    let position = state.ledger.player(who)?.position;
    match card.effect {
        CardEffect::MoveTo { space } => {
            advance(state, who, distance_forward(position, space), events)?;
            reland(state, who, RentMode::Standard, depth, events)
        }
        CardEffect::MoveBack { steps } => {
            state.phase = TurnPhase::Moving;
            let to = (position + BOARD_SIZE - steps % BOARD_SIZE) % BOARD_SIZE;
            state.ledger.move_player_to(who, to)?;
            events.push(GameEvent::PlayerMoved {
                player_id: who,
                position: to,
                passed_go: false,
            });
            reland(state, who, RentMode::Standard, depth, events)
        }
        CardEffect::MoveToNearest { kind } => {
            let target = state.board.nearest_of_kind(position, kind)?.id;
            advance(state, who, distance_forward(position, target), events)?;
            let mode = match kind {
                SpaceType::Railroad => RentMode::DoubleRailroad,
                SpaceType::Utility => RentMode::TenfoldUtility,
                _ => RentMode::Standard,
            };
            reland(state, who, mode, depth, events)
        }
        CardEffect::Collect { amount } => {
            state.ledger.credit(who, amount, BankFlow::Card)?;
            events.push(GameEvent::Payment {
                from: None,
                to: Some(who),
                amount,
            });
            Ok(())
        }
        CardEffect::Pay { amount } => charge(
            state,
            who,
            Debt {
                creditor: Creditor::Bank,
                amount,
                reason: DebtReason::Card,
            },
            events,
        ),
        CardEffect::PayAll { amount } => {
            let others = state.ledger.active_ids().filter(|id| *id != who).count() as Money;
            if others == 0 {
                return Ok(());
            }
            charge(
                state,
                who,
                Debt {
                    creditor: Creditor::EachPlayer { per_player: amount },
                    amount: amount * others,
                    reason: DebtReason::Card,
                },
                events,
            )
        }
        CardEffect::CollectFromAll { amount } => collect_from_each(state, who, amount, events),
        CardEffect::GoToJail => {
            state.extra_roll = false;
            jail_player(state, who, events)
        }
        CardEffect::JailFree => Ok(()),
        CardEffect::Repairs {
            per_house,
            per_hotel,
        } => {
            let (houses, hotels) = state.registry.building_counts(who);
            let amount = Money::from(houses) * per_house + Money::from(hotels) * per_hotel;
            if amount == 0 {
                return Ok(());
            }
            charge(
                state,
                who,
                Debt {
                    creditor: Creditor::Bank,
                    amount,
                    reason: DebtReason::Repairs,
                },
                events,
            )
        }
    }
}

/// A card moved the player: resolve the new space, but only once per roll.
fn reland(state: &mut GameState, who: PlayerId, mode: RentMode, depth: u8, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    if depth > 0 {
        return Ok(());
    }
    resolve_landing(state, who, mode, depth + 1, events)
}

pub(crate) fn jail_player(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    state.ledger.send_to_jail(who)?;
    let position = state.ledger.player(who)?.position;
    events.push(GameEvent::PlayerMoved {
        player_id: who,
        position,
        passed_go: false,
    });
    events.push(GameEvent::JailChanged {
        player_id: who,
        in_jail: true,
    });
    Ok(())
}

fn free_player(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    state.ledger.release_from_jail(who)?;
    events.push(GameEvent::JailChanged {
        player_id: who,
        in_jail: false,
    });
    Ok(())
}

/// The landing is settled: either roll again after doubles or wait for end-turn.
fn finish_step(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let in_jail = state.ledger.player(who)?.in_jail();
    let next = if state.extra_roll && !in_jail {
        TurnPhase::AwaitingRoll
    } else {
        TurnPhase::AwaitingTurnEnd
    };
    set_phase(state, next, events)
}

pub(crate) fn set_phase(state: &mut GameState, phase: TurnPhase, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    state.phase = phase;
    if phase.is_resting() && !matches!(phase, TurnPhase::GameOver { .. }) {
        events.push(GameEvent::TurnChanged {
            player_id: state.current,
            phase,
        });
    }
    Ok(())
}

pub(crate) fn advance_turn(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let next = state
        .next_active_after(state.current)
        .ok_or_else(|| DomainError::fatal("no other active player to pass the turn to"))?;
    start_turn(state, next, events)
}

fn start_turn(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    state.current = who;
    state.turn_no += 1;
    state.extra_roll = false;
    state.last_roll = None;
    let player = state.ledger.player_mut(who)?;
    player.doubles_streak = 0;
    let phase = if player.in_jail() {
        TurnPhase::InJail
    } else {
        TurnPhase::AwaitingRoll
    };
    set_phase(state, phase, events)
}

pub fn buy_property(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    let TurnPhase::AwaitingPurchaseDecision { space_id } = state.phase else {
        return Err(phase_mismatch("buy", &state.phase));
    };
    let price = state
        .registry
        .purchase(state.board, &mut state.ledger, who, space_id)?;
    events.push(GameEvent::PropertyPurchased {
        space_id,
        player_id: who,
        price,
    });
    finish_step(state, who, events)
}

pub fn decline_purchase(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    let TurnPhase::AwaitingPurchaseDecision { space_id } = state.phase else {
        return Err(phase_mismatch("decline a purchase", &state.phase));
    };
    events.push(GameEvent::PurchaseDeclined {
        space_id,
        player_id: who,
    });
    finish_step(state, who, events)
}

pub fn pay_debt(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    let TurnPhase::AwaitingPayment { debt } = state.phase else {
        return Err(phase_mismatch("pay a debt", &state.phase));
    };
    let cash = state.ledger.player(who)?.cash;
    if cash < debt.amount {
        return Err(DomainError::rule(
            RuleKind::InsufficientFunds,
            format!("owes {} but holds {cash}; sell or mortgage first", debt.amount),
        ));
    }
    pay_now(state, who, debt, events)?;
    events.push(GameEvent::DebtSettled { player_id: who, debt });
    finish_step(state, who, events)
}

pub fn pay_bail(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    if state.phase != TurnPhase::InJail {
        return Err(phase_mismatch("pay bail", &state.phase));
    }
    let bail = state.settings.jail_bail;
    state.ledger.debit(who, bail, BankFlow::Bail)?;
    events.push(GameEvent::Payment {
        from: Some(who),
        to: None,
        amount: bail,
    });
    free_player(state, who, events)?;
    set_phase(state, TurnPhase::AwaitingRoll, events)
}

pub fn use_jail_card(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    if state.phase != TurnPhase::InJail {
        return Err(phase_mismatch("use a jail card", &state.phase));
    }
    let held = state
        .ledger
        .player_mut(who)?
        .jail_cards
        .pop()
        .ok_or_else(|| DomainError::rule(RuleKind::NoJailCard, "no get-out-of-jail card held"))?;
    state.deck_mut(held.deck).return_card(held.card)?;
    free_player(state, who, events)?;
    set_phase(state, TurnPhase::AwaitingRoll, events)
}

pub fn end_turn(state: &mut GameState, who: PlayerId, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    require_turn(state, who)?;
    if state.phase != TurnPhase::AwaitingTurnEnd {
        return Err(phase_mismatch("end the turn", &state.phase));
    }
    advance_turn(state, events)
}

/// End the current player's turn on their behalf: pending purchases are
/// declined, pending debts are settled by liquidation, no dice are rolled.
pub fn skip_turn(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), DomainError> {
    let who = state.current;
    match state.phase {
        TurnPhase::GameOver { .. } => return Ok(()),
        TurnPhase::AwaitingPurchaseDecision { space_id } => {
            events.push(GameEvent::PurchaseDeclined {
                space_id,
                player_id: who,
            });
        }
        TurnPhase::AwaitingPayment { debt } => {
            if cover_or_bankrupt(state, who, debt.amount, debt.creditor, events)? {
                pay_now(state, who, debt, events)?;
                events.push(GameEvent::DebtSettled { player_id: who, debt });
            }
        }
        TurnPhase::InJail => serve_skipped_jail_turn(state, who, events)?,
        _ => {}
    }
    if !state.is_over() && state.current == who {
        advance_turn(state, events)?;
    }
    Ok(())
}
