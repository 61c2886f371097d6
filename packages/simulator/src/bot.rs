//! The simple policy every simulated seat plays with.

use monopoly_backend::domain::bankruptcy::next_building_to_sell;
use monopoly_backend::domain::{legal_actions, Action, GameState, PlayerId, TurnPhase};
use rand::rngs::StdRng;
use rand::Rng;

const BUY_CHANCE: f64 = 0.8;
const BUILD_CHANCE: f64 = 0.5;
const UNMORTGAGE_CHANCE: f64 = 0.3;
const BAIL_CHANCE: f64 = 0.3;

/// Pick the next action for `seat`, or `None` when nothing is legal.
pub fn choose(state: &GameState, seat: PlayerId, rng: &mut StdRng) -> Option<Action> {
    let legal = legal_actions(state, seat);
    if legal.is_empty() {
        return None;
    }
    let has = |action: &Action| legal.contains(action);

    if matches!(state.phase, TurnPhase::AwaitingPayment { .. }) {
        return Some(raise_funds(state, seat, &legal));
    }

    if has(&Action::BuyProperty) {
        return Some(if rng.random_bool(BUY_CHANCE) {
            Action::BuyProperty
        } else {
            Action::DeclinePurchase
        });
    }

    if state.phase == TurnPhase::InJail {
        if has(&Action::UseJailCard) {
            return Some(Action::UseJailCard);
        }
        if has(&Action::PayBail) && rng.random_bool(BAIL_CHANCE) {
            return Some(Action::PayBail);
        }
    }

    let builds: Vec<&Action> = legal
        .iter()
        .filter(|a| matches!(a, Action::Build { .. }))
        .collect();
    if !builds.is_empty() && rng.random_bool(BUILD_CHANCE) {
        return Some(builds[rng.random_range(0..builds.len())].clone());
    }

    if let Some(unmortgage) = legal.iter().find(|a| matches!(a, Action::Unmortgage { .. })) {
        if rng.random_bool(UNMORTGAGE_CHANCE) {
            return Some(unmortgage.clone());
        }
    }

    for action in [Action::RollDice, Action::EndTurn] {
        if has(&action) {
            return Some(action);
        }
    }
    Some(legal[rng.random_range(0..legal.len())].clone())
}

/// Pay if possible, otherwise sell or mortgage one step, otherwise give up.
fn raise_funds(state: &GameState, seat: PlayerId, legal: &[Action]) -> Action {
    if legal.contains(&Action::PayDebt) {
        return Action::PayDebt;
    }
    if let Some((space_id, kind)) = next_building_to_sell(state, seat) {
        let sell = Action::SellBuilding { space_id, kind };
        if legal.contains(&sell) {
            return sell;
        }
    }
    legal
        .iter()
        .find(|a| matches!(a, Action::Mortgage { .. }))
        .cloned()
        .unwrap_or(Action::DeclareBankruptcy)
}
