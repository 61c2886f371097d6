//! Chance and Community Chest card tables.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::board::{Board, SpaceId, SpaceType};
use super::settings::Edition;
use super::Money;
use crate::errors::domain::{DomainError, ValidationKind};

pub type CardId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckKind {
    Chance,
    Community,
}

/// What a card does when drawn. Amounts are already scaled to the edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CardEffect {
    /// Advance to a space, collecting salary when passing GO.
    MoveTo { space: SpaceId },
    MoveBack { steps: u8 },
    /// Advance to the next space of a kind. Railroads charge double rent,
    /// utilities charge ten times the dice.
    MoveToNearest { kind: SpaceType },
    Collect { amount: Money },
    Pay { amount: Money },
    /// Pay every other active player.
    PayAll { amount: Money },
    /// Collect from every other active player.
    CollectFromAll { amount: Money },
    GoToJail,
    /// Kept by the player until used.
    JailFree,
    Repairs { per_house: Money, per_hotel: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub deck: DeckKind,
    pub title: String,
    #[serde(flatten)]
    pub effect: CardEffect,
}

impl Card {
    pub fn is_keep(&self) -> bool {
        matches!(self.effect, CardEffect::JailFree)
    }

    pub fn moves_player(&self) -> bool {
        matches!(
            self.effect,
            CardEffect::MoveTo { .. } | CardEffect::MoveBack { .. } | CardEffect::MoveToNearest { .. }
        )
    }
}

struct Tables {
    chance: Vec<Card>,
    community: Vec<Card>,
}

static CLASSIC: Lazy<Tables> = Lazy::new(|| build(Edition::Classic));
static HERITAGE: Lazy<Tables> = Lazy::new(|| build(Edition::Heritage));

/// Cards of one deck in their printed order.
pub fn deck_cards(edition: Edition, deck: DeckKind) -> &'static [Card] {
    let tables: &'static Tables = match edition {
        Edition::Classic => &CLASSIC,
        Edition::Heritage => &HERITAGE,
    };
    match deck {
        DeckKind::Chance => &tables.chance,
        DeckKind::Community => &tables.community,
    }
}

pub fn card(edition: Edition, deck: DeckKind, id: CardId) -> Result<&'static Card, DomainError> {
    deck_cards(edition, deck)
        .get(usize::from(id))
        .ok_or_else(|| {
            DomainError::validation(
                ValidationKind::Other("card".into()),
                format!("no card {id} in {deck:?} deck"),
            )
        })
}

fn build(edition: Edition) -> Tables {
    let board = Board::for_edition(edition);
    let s = edition.scale();
    let name = |id: SpaceId| board.space(id).map(|sp| sp.name).unwrap_or("?");

    let chance = vec![
        (format!("Advance to {}", name(39)), CardEffect::MoveTo { space: 39 }),
        (
            format!("Advance to Go, collect {}", 200 * s),
            CardEffect::MoveTo { space: 0 },
        ),
        (format!("Advance to {}", name(24)), CardEffect::MoveTo { space: 24 }),
        (format!("Advance to {}", name(11)), CardEffect::MoveTo { space: 11 }),
        (
            "Advance to the nearest station and pay double rent".to_string(),
            CardEffect::MoveToNearest {
                kind: SpaceType::Railroad,
            },
        ),
        (
            "Advance to the nearest station and pay double rent".to_string(),
            CardEffect::MoveToNearest {
                kind: SpaceType::Railroad,
            },
        ),
        (
            "Advance to the nearest utility and pay ten times the dice".to_string(),
            CardEffect::MoveToNearest {
                kind: SpaceType::Utility,
            },
        ),
        (
            format!("Bank pays you a dividend of {}", 50 * s),
            CardEffect::Collect { amount: 50 * s },
        ),
        ("Get out of jail free".to_string(), CardEffect::JailFree),
        ("Go back three spaces".to_string(), CardEffect::MoveBack { steps: 3 }),
        ("Go directly to jail".to_string(), CardEffect::GoToJail),
        (
            format!(
                "General repairs: pay {} per house and {} per hotel",
                25 * s,
                100 * s
            ),
            CardEffect::Repairs {
                per_house: 25 * s,
                per_hotel: 100 * s,
            },
        ),
        (
            format!("Speeding fine of {}", 15 * s),
            CardEffect::Pay { amount: 15 * s },
        ),
        (format!("Take a trip to {}", name(5)), CardEffect::MoveTo { space: 5 }),
        (
            format!("Elected chairman of the board, pay each player {}", 50 * s),
            CardEffect::PayAll { amount: 50 * s },
        ),
        (
            format!("Your building loan matures, collect {}", 150 * s),
            CardEffect::Collect { amount: 150 * s },
        ),
    ];

    let community = vec![
        (
            format!("Advance to Go, collect {}", 200 * s),
            CardEffect::MoveTo { space: 0 },
        ),
        (
            format!("Bank error in your favour, collect {}", 200 * s),
            CardEffect::Collect { amount: 200 * s },
        ),
        (
            format!("Doctor's fee, pay {}", 50 * s),
            CardEffect::Pay { amount: 50 * s },
        ),
        (
            format!("From sale of stock you get {}", 50 * s),
            CardEffect::Collect { amount: 50 * s },
        ),
        ("Get out of jail free".to_string(), CardEffect::JailFree),
        ("Go directly to jail".to_string(), CardEffect::GoToJail),
        (
            format!("Holiday fund matures, receive {}", 100 * s),
            CardEffect::Collect { amount: 100 * s },
        ),
        (
            format!("Income tax refund, collect {}", 20 * s),
            CardEffect::Collect { amount: 20 * s },
        ),
        (
            format!("It is your birthday, collect {} from every player", 10 * s),
            CardEffect::CollectFromAll { amount: 10 * s },
        ),
        (
            format!("Life insurance matures, collect {}", 100 * s),
            CardEffect::Collect { amount: 100 * s },
        ),
        (
            format!("Hospital fees of {}", 100 * s),
            CardEffect::Pay { amount: 100 * s },
        ),
        (
            format!("School fees of {}", 50 * s),
            CardEffect::Pay { amount: 50 * s },
        ),
        (
            format!("Receive {} consultancy fee", 25 * s),
            CardEffect::Collect { amount: 25 * s },
        ),
        (
            format!(
                "Street repairs: pay {} per house and {} per hotel",
                40 * s,
                115 * s
            ),
            CardEffect::Repairs {
                per_house: 40 * s,
                per_hotel: 115 * s,
            },
        ),
        (
            format!("Second prize in a beauty contest, collect {}", 10 * s),
            CardEffect::Collect { amount: 10 * s },
        ),
        (
            format!("You inherit {}", 100 * s),
            CardEffect::Collect { amount: 100 * s },
        ),
    ];

    Tables {
        chance: number(DeckKind::Chance, chance),
        community: number(DeckKind::Community, community),
    }
}

fn number(deck: DeckKind, rows: Vec<(String, CardEffect)>) -> Vec<Card> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, (title, effect))| Card {
            id: idx as CardId,
            deck,
            title,
            effect,
        })
        .collect()
}
