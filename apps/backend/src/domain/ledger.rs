//! Player ledger: cash, position, jail state and the bank's side of every
//! payment.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::board::{SpaceId, BOARD_SIZE, JAIL};
use super::cards::{CardId, DeckKind};
use super::{Money, PlayerId};
use crate::errors::domain::{DomainError, NotFoundKind, RuleKind, ValidationKind};

/// Failed doubles attempts allowed before bail becomes mandatory.
pub const JAIL_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum JailState {
    Free,
    InJail { turns_remaining: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldCard {
    pub deck: DeckKind,
    pub card: CardId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub cash: Money,
    pub position: SpaceId,
    pub properties: BTreeSet<SpaceId>,
    pub jail: JailState,
    pub bankrupt: bool,
    pub jail_cards: Vec<HeldCard>,
    pub doubles_streak: u8,
}

impl Player {
    pub fn in_jail(&self) -> bool {
        matches!(self.jail, JailState::InJail { .. })
    }
}

/// Why money moved between a player and the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BankFlow {
    Salary,
    Tax,
    Purchase,
    Building,
    Mortgage,
    Interest,
    Card,
    Bail,
    /// Cash surrendered by a player going bankrupt to the bank.
    Bankruptcy,
}

/// Running totals of money the bank has paid out and taken in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub issued: Money,
    pub collected: Money,
    /// Net per flow, positive when the bank took in more than it paid out.
    pub by_flow: BTreeMap<BankFlow, Money>,
}

impl BankAccount {
    fn record(&mut self, flow: BankFlow, delta: Money) {
        if delta >= 0 {
            self.collected += delta;
        } else {
            self.issued -= delta;
        }
        *self.by_flow.entry(flow).or_insert(0) += delta;
    }

    pub fn net(&self) -> Money {
        self.collected - self.issued
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    players: Vec<Player>,
    bank: BankAccount,
    initial_total: Money,
}

impl Ledger {
    /// Seats players in the given order, each with `starting_cash`.
    pub fn new(names: impl IntoIterator<Item = String>, starting_cash: Money) -> Self {
        let players: Vec<Player> = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Player {
                id: idx as PlayerId,
                name,
                cash: starting_cash,
                position: 0,
                properties: BTreeSet::new(),
                jail: JailState::Free,
                bankrupt: false,
                jail_cards: Vec::new(),
                doubles_streak: 0,
            })
            .collect();
        let initial_total = starting_cash.saturating_mul(players.len() as Money);
        Self {
            players,
            bank: BankAccount::default(),
            initial_total,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn bank(&self) -> &BankAccount {
        &self.bank
    }

    pub fn initial_total(&self) -> Money {
        self.initial_total
    }

    pub fn total_cash(&self) -> Money {
        self.players.iter().map(|p| p.cash).sum()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, DomainError> {
        self.players
            .get(usize::from(id))
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("no seat {id}")))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, DomainError> {
        self.players
            .get_mut(usize::from(id))
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("no seat {id}")))
    }

    /// Seats still in the game, in turn order.
    pub fn active_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| !p.bankrupt).map(|p| p.id)
    }

    /// Bank pays a player.
    pub fn credit(&mut self, id: PlayerId, amount: Money, flow: BankFlow) -> Result<(), DomainError> {
        check_amount(amount)?;
        let player = self.player_mut(id)?;
        player.cash = add_cash(player.cash, amount)?;
        self.bank.record(flow, -amount);
        Ok(())
    }

    /// Player pays the bank. Never raises funds on the player's behalf.
    pub fn debit(&mut self, id: PlayerId, amount: Money, flow: BankFlow) -> Result<(), DomainError> {
        check_amount(amount)?;
        let player = self.player_mut(id)?;
        if player.cash < amount {
            return Err(insufficient(player, amount));
        }
        player.cash -= amount;
        self.bank.record(flow, amount);
        Ok(())
    }

    /// Player pays player.
    pub fn transfer(&mut self, from: PlayerId, to: PlayerId, amount: Money) -> Result<(), DomainError> {
        check_amount(amount)?;
        self.player(to)?;
        let payer = self.player_mut(from)?;
        if payer.cash < amount {
            return Err(insufficient(payer, amount));
        }
        if from == to {
            return Ok(());
        }
        let payee_cash = add_cash(self.player(to)?.cash, amount)?;
        self.player_mut(from)?.cash -= amount;
        self.player_mut(to)?.cash = payee_cash;
        Ok(())
    }

    pub fn move_player_to(&mut self, id: PlayerId, space: SpaceId) -> Result<(), DomainError> {
        if space >= BOARD_SIZE {
            return Err(DomainError::validation(
                ValidationKind::InvalidSpace,
                format!("space {space} is off the board"),
            ));
        }
        self.player_mut(id)?.position = space;
        Ok(())
    }

    pub fn send_to_jail(&mut self, id: PlayerId) -> Result<(), DomainError> {
        let player = self.player_mut(id)?;
        player.position = JAIL;
        player.jail = JailState::InJail {
            turns_remaining: JAIL_ATTEMPTS,
        };
        player.doubles_streak = 0;
        Ok(())
    }

    pub fn release_from_jail(&mut self, id: PlayerId) -> Result<(), DomainError> {
        let player = self.player_mut(id)?;
        if !player.in_jail() {
            return Err(DomainError::rule(
                RuleKind::NotInJail,
                format!("{} is not in jail", player.name),
            ));
        }
        player.jail = JailState::Free;
        Ok(())
    }
}

fn add_cash(cash: Money, amount: Money) -> Result<Money, DomainError> {
    cash.checked_add(amount)
        .ok_or_else(|| DomainError::fatal(format!("cash {cash} + {amount} overflows")))
}

fn check_amount(amount: Money) -> Result<(), DomainError> {
    if amount < 0 {
        return Err(DomainError::fatal(format!("negative amount {amount}")));
    }
    Ok(())
}

fn insufficient(player: &Player, amount: Money) -> DomainError {
    DomainError::rule(
        RuleKind::InsufficientFunds,
        format!(
            "{} needs {amount} but holds {}",
            player.name, player.cash
        ),
    )
}
