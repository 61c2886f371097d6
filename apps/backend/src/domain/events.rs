//! Events produced by domain operations, in the order they happened.

use serde::Serialize;

use super::board::SpaceId;
use super::cards::Card;
use super::state::{Creditor, Debt, TurnPhase};
use super::trade::TradeOffer;
use super::{Money, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum GameEvent {
    TurnChanged {
        player_id: PlayerId,
        phase: TurnPhase,
    },
    DiceRolled {
        player_id: PlayerId,
        values: [u8; 2],
    },
    PlayerMoved {
        player_id: PlayerId,
        position: SpaceId,
        passed_go: bool,
    },
    SalaryCollected {
        player_id: PlayerId,
        amount: Money,
    },
    PropertyPurchased {
        space_id: SpaceId,
        player_id: PlayerId,
        price: Money,
    },
    PurchaseDeclined {
        space_id: SpaceId,
        player_id: PlayerId,
    },
    RentCharged {
        from: PlayerId,
        to: PlayerId,
        amount: Money,
        space_id: SpaceId,
    },
    TaxPaid {
        player_id: PlayerId,
        amount: Money,
        space_id: SpaceId,
    },
    CardDrawn {
        player_id: PlayerId,
        card: Card,
    },
    /// Money moved for a card, repairs, bail or an off-turn collection.
    Payment {
        from: Option<PlayerId>,
        to: Option<PlayerId>,
        amount: Money,
    },
    PaymentRequired {
        player_id: PlayerId,
        debt: Debt,
    },
    /// A pending debt was paid in full.
    DebtSettled {
        player_id: PlayerId,
        debt: Debt,
    },
    JailChanged {
        player_id: PlayerId,
        in_jail: bool,
    },
    BuildingsChanged {
        space_id: SpaceId,
        houses: u8,
        hotel: bool,
    },
    MortgageChanged {
        space_id: SpaceId,
        mortgaged: bool,
    },
    TradeUpdated {
        offer: TradeOffer,
    },
    PlayerBankrupt {
        player_id: PlayerId,
        creditor: Creditor,
    },
    GameOver {
        winner_id: PlayerId,
    },
}
