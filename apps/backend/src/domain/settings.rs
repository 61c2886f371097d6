//! Per-room rule settings chosen when a room is created.

use serde::{Deserialize, Serialize};

use super::Money;
use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 6;
/// Ceiling for every configurable amount of money.
pub const MAX_SETTING_MONEY: Money = 1_000_000_000;
pub const MAX_TURN_TIMEOUT_SECS: u64 = 86_400;
pub const MAX_EVENT_LOG_CAPACITY: usize = 10_000;

/// Board naming and currency scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edition {
    /// Classic street names, amounts as printed on the classic board.
    Classic,
    /// Indian heritage board, every amount multiplied by ten.
    Heritage,
}

impl Edition {
    pub const fn scale(self) -> Money {
        match self {
            Edition::Classic => 1,
            Edition::Heritage => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomSettings {
    pub edition: Edition,
    pub starting_cash: Money,
    pub go_salary: Money,
    pub jail_bail: Money,
    /// Percent of the mortgage value charged on top when lifting a mortgage.
    pub mortgage_interest_percent: u8,
    pub house_supply: u8,
    pub hotel_supply: u8,
    pub max_players: u8,
    pub event_log_capacity: usize,
    /// Seconds a disconnected player's turn may stall before it is skipped.
    pub turn_timeout_secs: u64,
}

impl RoomSettings {
    pub fn for_edition(edition: Edition) -> Self {
        let scale = edition.scale();
        Self {
            edition,
            starting_cash: 1500 * scale,
            go_salary: 200 * scale,
            jail_bail: 50 * scale,
            mortgage_interest_percent: 10,
            house_supply: 32,
            hotel_supply: 12,
            max_players: MAX_PLAYERS,
            event_log_capacity: 256,
            turn_timeout_secs: 60,
        }
    }

    pub fn classic() -> Self {
        Self::for_edition(Edition::Classic)
    }

    pub fn heritage() -> Self {
        Self::for_edition(Edition::Heritage)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |detail: &str| {
            Err(DomainError::validation(
                ValidationKind::InvalidSettings,
                detail.to_string(),
            ))
        };
        if !(1..=MAX_SETTING_MONEY).contains(&self.starting_cash) {
            return invalid("startingCash must be between 1 and 1000000000");
        }
        let in_range = |amount: Money| (0..=MAX_SETTING_MONEY).contains(&amount);
        if !in_range(self.go_salary) || !in_range(self.jail_bail) {
            return invalid("goSalary and jailBail must be between 0 and 1000000000");
        }
        if self.mortgage_interest_percent > 100 {
            return invalid("mortgageInterestPercent must be at most 100");
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return invalid("maxPlayers must be between 2 and 6");
        }
        if !(1..=MAX_EVENT_LOG_CAPACITY).contains(&self.event_log_capacity) {
            return invalid("eventLogCapacity must be between 1 and 10000");
        }
        if !(1..=MAX_TURN_TIMEOUT_SECS).contains(&self.turn_timeout_secs) {
            return invalid("turnTimeoutSecs must be between 1 and 86400");
        }
        Ok(())
    }

    /// Interest due when lifting a mortgage worth `mortgage_value`, rounded up.
    pub fn mortgage_interest(&self, mortgage_value: Money) -> Money {
        let pct = Money::from(self.mortgage_interest_percent);
        (mortgage_value * pct + 99) / 100
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::heritage()
    }
}
