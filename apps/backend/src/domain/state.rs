use serde::Serialize;

use super::board::{Board, SpaceId, BOARD_SIZE};
use super::cards::{deck_cards, CardId, DeckKind};
use super::deck::Deck;
use super::dice::{Dice, DiceRoll};
use super::events::GameEvent;
use super::ledger::Ledger;
use super::registry::Registry;
use super::seed_derivation::{derive_deck_seed, derive_dice_seed};
use super::settings::{RoomSettings, MIN_PLAYERS};
use super::trade::TradeBook;
use super::{Money, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

/// Where the current player's turn stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum TurnPhase {
    AwaitingRoll,
    /// Turn started in jail; the player may roll for doubles, pay bail or
    /// use a card.
    InJail,
    Moving,
    ResolvingSpace,
    AwaitingPurchaseDecision { space_id: SpaceId },
    AwaitingCardOutcome { deck: DeckKind, card_id: CardId },
    /// A charge exceeds cash but not liquidatable worth; the player must
    /// raise funds and pay, or declare bankruptcy.
    AwaitingPayment { debt: Debt },
    AwaitingTurnEnd,
    GameOver { winner_id: PlayerId },
}

impl TurnPhase {
    /// Phases that wait for player input. The rest only exist while an
    /// intent is being applied.
    pub fn is_resting(&self) -> bool {
        !matches!(
            self,
            TurnPhase::Moving | TurnPhase::ResolvingSpace | TurnPhase::AwaitingCardOutcome { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Creditor {
    Bank,
    Player { player_id: PlayerId },
    /// Every other active player receives `per_player`.
    EachPlayer { per_player: Money },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum DebtReason {
    Rent { space_id: SpaceId },
    Tax { space_id: SpaceId },
    Card,
    Repairs,
    Bail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub creditor: Creditor,
    pub amount: Money,
    pub reason: DebtReason,
}

/// Entire game container, sufficient for pure domain operations.
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: RoomSettings,
    pub board: &'static Board,
    pub ledger: Ledger,
    pub registry: Registry,
    pub chance: Deck,
    pub community: Deck,
    pub dice: Dice,
    /// Seat whose turn it is.
    pub current: PlayerId,
    pub phase: TurnPhase,
    pub last_roll: Option<DiceRoll>,
    /// Set when the last normal roll was doubles and another roll is owed.
    pub extra_roll: bool,
    /// 1-based count of turns started.
    pub turn_no: u32,
    pub trades: TradeBook,
}

impl GameState {
    /// Start a game for `names` in seating order. Decks are shuffled once and
    /// dice seeded, both derived from `seed`.
    pub fn new(settings: RoomSettings, names: Vec<String>, seed: u64) -> Result<Self, DomainError> {
        settings.validate()?;
        if names.len() < usize::from(MIN_PLAYERS) || names.len() > usize::from(settings.max_players) {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                format!(
                    "a game needs {MIN_PLAYERS} to {} players, got {}",
                    settings.max_players,
                    names.len()
                ),
            ));
        }
        let edition = settings.edition;
        Ok(Self {
            board: Board::for_edition(edition),
            ledger: Ledger::new(names, settings.starting_cash),
            registry: Registry::from_settings(&settings),
            chance: Deck::shuffled(edition, DeckKind::Chance, derive_deck_seed(seed, DeckKind::Chance)),
            community: Deck::shuffled(
                edition,
                DeckKind::Community,
                derive_deck_seed(seed, DeckKind::Community),
            ),
            dice: Dice::seeded(derive_dice_seed(seed)),
            current: 0,
            phase: TurnPhase::AwaitingRoll,
            last_roll: None,
            extra_roll: false,
            turn_no: 1,
            trades: TradeBook::default(),
            settings,
        })
    }

    /// Replace the dice, keeping everything else. Used to stage exact rolls.
    pub fn with_dice(mut self, dice: Dice) -> Self {
        self.dice = dice;
        self
    }

    pub fn deck(&self, kind: DeckKind) -> &Deck {
        match kind {
            DeckKind::Chance => &self.chance,
            DeckKind::Community => &self.community,
        }
    }

    pub fn deck_mut(&mut self, kind: DeckKind) -> &mut Deck {
        match kind {
            DeckKind::Chance => &mut self.chance,
            DeckKind::Community => &mut self.community,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::GameOver { .. })
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            TurnPhase::GameOver { winner_id } => Some(winner_id),
            _ => None,
        }
    }

    pub fn active_players(&self) -> Vec<PlayerId> {
        self.ledger.active_ids().collect()
    }

    /// Next active seat after `seat` in turn order, skipping bankrupt players.
    pub fn next_active_after(&self, seat: PlayerId) -> Option<PlayerId> {
        let n = self.ledger.len();
        (1..=n)
            .map(|step| ((usize::from(seat) + step) % n) as PlayerId)
            .find(|id| self.ledger.player(*id).is_ok_and(|p| !p.bankrupt))
            .filter(|id| *id != seat)
    }

    /// Apply `op` to a copy of the state and commit it only when `op`
    /// succeeds and the result passes [`GameState::check_invariants`].
    pub fn transact<F>(&mut self, op: F) -> Result<Vec<GameEvent>, DomainError>
    where
        F: FnOnce(&mut GameState, &mut Vec<GameEvent>) -> Result<(), DomainError>,
    {
        let mut next = self.clone();
        let mut events = Vec::new();
        op(&mut next, &mut events)?;
        next.check_invariants()?;
        *self = next;
        Ok(events)
    }

    /// Cross-component consistency. Any failure here is fatal for the room.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        self.registry.check_invariants(self.board, &self.ledger)?;

        let books = self.ledger.total_cash() + self.ledger.bank().net();
        if books != self.ledger.initial_total() {
            return Err(DomainError::fatal(format!(
                "money not conserved: players plus bank hold {books}, expected {}",
                self.ledger.initial_total()
            )));
        }

        let mut held = [0usize; 2];
        for p in self.ledger.players() {
            if p.cash < 0 {
                return Err(DomainError::fatal(format!("seat {} has negative cash", p.id)));
            }
            if p.position >= BOARD_SIZE {
                return Err(DomainError::fatal(format!("seat {} is off the board", p.id)));
            }
            if p.bankrupt && (p.cash != 0 || !p.properties.is_empty() || !p.jail_cards.is_empty()) {
                return Err(DomainError::fatal(format!("bankrupt seat {} still holds assets", p.id)));
            }
            for c in &p.jail_cards {
                held[c.deck as usize] += 1;
                if !self.deck(c.deck).withheld().contains(&c.card) {
                    return Err(DomainError::fatal(format!(
                        "seat {} holds a card its deck does not know about",
                        p.id
                    )));
                }
            }
        }
        for (idx, kind) in [DeckKind::Chance, DeckKind::Community].into_iter().enumerate() {
            let deck = self.deck(kind);
            if deck.total_cards() != deck_cards(self.settings.edition, kind).len()
                || deck.withheld().len() != held[idx]
            {
                return Err(DomainError::fatal(format!("{kind:?} deck lost track of its cards")));
            }
        }

        if !self.phase.is_resting() {
            return Err(DomainError::fatal(format!(
                "intent finished in transient phase {:?}",
                self.phase
            )));
        }
        match self.phase {
            TurnPhase::GameOver { winner_id } => {
                if self.active_players() != vec![winner_id] {
                    return Err(DomainError::fatal("game over with more than one player left"));
                }
            }
            _ => {
                if self.ledger.player(self.current)?.bankrupt {
                    return Err(DomainError::fatal("current seat is bankrupt"));
                }
            }
        }
        Ok(())
    }
}

pub fn require_turn(state: &GameState, who: PlayerId) -> Result<(), DomainError> {
    require_active(state, who)?;
    if state.current != who {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!("it is seat {}'s turn", state.current),
        ));
    }
    Ok(())
}

pub fn require_active(state: &GameState, who: PlayerId) -> Result<(), DomainError> {
    if state.is_over() {
        return Err(DomainError::validation(ValidationKind::PhaseMismatch, "the game is over"));
    }
    if state.ledger.player(who)?.bankrupt {
        return Err(DomainError::validation(
            ValidationKind::PlayerBankrupt,
            format!("seat {who} is bankrupt"),
        ));
    }
    Ok(())
}

pub fn phase_mismatch(action: &str, phase: &TurnPhase) -> DomainError {
    DomainError::validation(
        ValidationKind::PhaseMismatch,
        format!("cannot {action} while {phase:?}"),
    )
}
