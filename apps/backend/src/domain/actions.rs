//! In-game actions and their dispatch.

use serde::{Deserialize, Serialize};

use super::bankruptcy::declare_bankruptcy;
use super::board::SpaceId;
use super::events::GameEvent;
use super::improvements::{build, mortgage, sell_building, unmortgage};
use super::registry::BuildingKind;
use super::state::{GameState, TurnPhase};
use super::trade::{propose_trade, respond_trade, withdraw_trade, OfferId, TradeTerms};
use super::turn::{buy_property, decline_purchase, end_turn, pay_bail, pay_debt, roll_dice, use_jail_card};
use super::PlayerId;
use crate::errors::domain::DomainError;

/// Everything a seated player can ask the game to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Action {
    RollDice,
    BuyProperty,
    DeclinePurchase,
    PayDebt,
    DeclareBankruptcy,
    PayBail,
    UseJailCard,
    Build {
        space_id: SpaceId,
        kind: BuildingKind,
    },
    SellBuilding {
        space_id: SpaceId,
        kind: BuildingKind,
    },
    Mortgage {
        space_id: SpaceId,
    },
    Unmortgage {
        space_id: SpaceId,
    },
    ProposeTrade {
        responder_id: PlayerId,
        #[serde(default)]
        offered: TradeTerms,
        #[serde(default)]
        requested: TradeTerms,
    },
    RespondTrade {
        offer_id: OfferId,
        accept: bool,
    },
    WithdrawTrade {
        offer_id: OfferId,
    },
    EndTurn,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::RollDice => "roll-dice",
            Action::BuyProperty => "buy-property",
            Action::DeclinePurchase => "decline-purchase",
            Action::PayDebt => "pay-debt",
            Action::DeclareBankruptcy => "declare-bankruptcy",
            Action::PayBail => "pay-bail",
            Action::UseJailCard => "use-jail-card",
            Action::Build { .. } => "build",
            Action::SellBuilding { .. } => "sell-building",
            Action::Mortgage { .. } => "mortgage",
            Action::Unmortgage { .. } => "unmortgage",
            Action::ProposeTrade { .. } => "propose-trade",
            Action::RespondTrade { .. } => "respond-trade",
            Action::WithdrawTrade { .. } => "withdraw-trade",
            Action::EndTurn => "end-turn",
        }
    }
}

/// Apply `action` for seat `who`. Run it through [`GameState::transact`]
/// to get all-or-nothing semantics.
pub fn apply_action(
    state: &mut GameState,
    who: PlayerId,
    action: Action,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    match action {
        Action::RollDice => roll_dice(state, who, events),
        Action::BuyProperty => buy_property(state, who, events),
        Action::DeclinePurchase => decline_purchase(state, who, events),
        Action::PayDebt => pay_debt(state, who, events),
        Action::DeclareBankruptcy => declare_bankruptcy(state, who, events),
        Action::PayBail => pay_bail(state, who, events),
        Action::UseJailCard => use_jail_card(state, who, events),
        Action::Build { space_id, kind } => build(state, who, space_id, kind, events),
        Action::SellBuilding { space_id, kind } => sell_building(state, who, space_id, kind, events),
        Action::Mortgage { space_id } => mortgage(state, who, space_id, events),
        Action::Unmortgage { space_id } => unmortgage(state, who, space_id, events),
        Action::ProposeTrade {
            responder_id,
            offered,
            requested,
        } => propose_trade(state, who, responder_id, offered, requested, events).map(|_| ()),
        Action::RespondTrade { offer_id, accept } => respond_trade(state, who, offer_id, accept, events),
        Action::WithdrawTrade { offer_id } => withdraw_trade(state, who, offer_id, events),
        Action::EndTurn => end_turn(state, who, events),
    }
}

/// Turn and property actions `who` could take right now. Each candidate is
/// tried on a copy of the state. Trades and voluntary bankruptcy are left
/// out; bankruptcy is offered only while a debt is pending.
pub fn legal_actions(state: &GameState, who: PlayerId) -> Vec<Action> {
    let mut candidates = vec![
        Action::RollDice,
        Action::BuyProperty,
        Action::DeclinePurchase,
        Action::PayDebt,
        Action::PayBail,
        Action::UseJailCard,
        Action::EndTurn,
    ];
    if state.current == who && matches!(state.phase, TurnPhase::AwaitingPayment { .. }) {
        candidates.push(Action::DeclareBankruptcy);
    }
    if let Ok(player) = state.ledger.player(who) {
        for &space_id in &player.properties {
            for kind in [BuildingKind::House, BuildingKind::Hotel] {
                candidates.push(Action::Build { space_id, kind });
                candidates.push(Action::SellBuilding { space_id, kind });
            }
            candidates.push(Action::Mortgage { space_id });
            candidates.push(Action::Unmortgage { space_id });
        }
    }

    candidates
        .into_iter()
        .filter(|action| {
            let mut probe = state.clone();
            apply_action(&mut probe, who, action.clone(), &mut Vec::new()).is_ok()
        })
        .collect()
}
