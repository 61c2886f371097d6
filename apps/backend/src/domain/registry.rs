//! Property ownership registry.
//!
//! Single source of truth for who owns what, which improvements stand where,
//! and how many houses and hotels the bank still has.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::board::{Board, ColorGroup, Deed, SpaceId, SpaceKind, UTILITY_MULTIPLIERS};
use super::ledger::{BankFlow, Ledger};
use super::settings::RoomSettings;
use super::{Money, PlayerId};
use crate::errors::domain::{DomainError, RuleKind};

pub const HOUSES_PER_HOTEL: u8 = 4;
/// Improvement level of a hotel: four houses plus the hotel itself.
pub const HOTEL_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub owner: PlayerId,
    pub houses: u8,
    pub hotel: bool,
    pub mortgaged: bool,
}

impl Holding {
    fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            houses: 0,
            hotel: false,
            mortgaged: false,
        }
    }

    pub fn level(&self) -> u8 {
        if self.hotel {
            HOTEL_LEVEL
        } else {
            self.houses
        }
    }

    pub fn has_buildings(&self) -> bool {
        self.hotel || self.houses > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildingKind {
    House,
    Hotel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    holdings: BTreeMap<SpaceId, Holding>,
    house_supply: u8,
    hotel_supply: u8,
    houses_available: u8,
    hotels_available: u8,
}

impl Registry {
    pub fn new(house_supply: u8, hotel_supply: u8) -> Self {
        Self {
            holdings: BTreeMap::new(),
            house_supply,
            hotel_supply,
            houses_available: house_supply,
            hotels_available: hotel_supply,
        }
    }

    pub fn from_settings(settings: &RoomSettings) -> Self {
        Self::new(settings.house_supply, settings.hotel_supply)
    }

    pub fn holding(&self, space: SpaceId) -> Option<&Holding> {
        self.holdings.get(&space)
    }

    pub fn owner_of(&self, space: SpaceId) -> Option<PlayerId> {
        self.holdings.get(&space).map(|h| h.owner)
    }

    pub fn holdings(&self) -> impl Iterator<Item = (SpaceId, &Holding)> {
        self.holdings.iter().map(|(id, h)| (*id, h))
    }

    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = (SpaceId, &Holding)> {
        self.holdings()
            .filter(move |(_, h)| h.owner == player)
    }

    pub fn houses_available(&self) -> u8 {
        self.houses_available
    }

    pub fn hotels_available(&self) -> u8 {
        self.hotels_available
    }

    pub fn houses_in_play(&self) -> u32 {
        self.holdings.values().map(|h| u32::from(h.houses)).sum()
    }

    pub fn hotels_in_play(&self) -> u32 {
        self.holdings.values().filter(|h| h.hotel).count() as u32
    }

    /// Number of houses and hotels standing on a player's properties.
    pub fn building_counts(&self, player: PlayerId) -> (u32, u32) {
        self.owned_by(player).fold((0, 0), |(houses, hotels), (_, h)| {
            (houses + u32::from(h.houses), hotels + u32::from(h.hotel))
        })
    }

    pub fn owns_group(&self, board: &Board, player: PlayerId, group: ColorGroup) -> bool {
        board
            .spaces_in_group(group)
            .iter()
            .all(|s| self.owner_of(s.id) == Some(player))
    }

    /// True when any member of `space`'s colour group carries a building.
    pub fn group_has_buildings(&self, board: &Board, space: SpaceId) -> Result<bool, DomainError> {
        Ok(group_members(board, space)?
            .iter()
            .any(|id| self.holdings.get(id).is_some_and(Holding::has_buildings)))
    }

    pub fn purchase(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let sp = board.space(space)?;
        let deed = sp.deed().ok_or_else(|| {
            DomainError::rule(RuleKind::NotPurchasable, format!("{} cannot be bought", sp.name))
        })?;
        if let Some(owner) = self.owner_of(space) {
            return Err(DomainError::rule(
                RuleKind::AlreadyOwned,
                format!("{} is already owned by seat {owner}", sp.name),
            ));
        }
        ledger.debit(player, deed.price, BankFlow::Purchase)?;
        self.holdings.insert(space, Holding::new(player));
        ledger.player_mut(player)?.properties.insert(space);
        Ok(deed.price)
    }

    /// Rent due for landing on `space`. Unowned and mortgaged spaces charge nothing.
    pub fn compute_rent(&self, board: &Board, space: SpaceId, dice_total: u8) -> Result<Money, DomainError> {
        let sp = board.space(space)?;
        let Some(holding) = self.holdings.get(&space) else {
            return Ok(0);
        };
        if holding.mortgaged {
            return Ok(0);
        }
        let rent = match &sp.kind {
            SpaceKind::Property { group, deed } => {
                let level = holding.level();
                if level == 0 && self.owns_group(board, holding.owner, *group) {
                    deed.rent.base * 2
                } else {
                    deed.rent.at_level(level)
                }
            }
            SpaceKind::Railroad { deed } => {
                let owned = self.count_owned_of(board, holding.owner, |k| {
                    matches!(k, SpaceKind::Railroad { .. })
                });
                deed.rent.base << owned.saturating_sub(1)
            }
            SpaceKind::Utility { .. } => {
                let owned = self.count_owned_of(board, holding.owner, |k| {
                    matches!(k, SpaceKind::Utility { .. })
                });
                let multiplier = if owned >= 2 {
                    UTILITY_MULTIPLIERS[1]
                } else {
                    UTILITY_MULTIPLIERS[0]
                };
                Money::from(dice_total) * multiplier
            }
            _ => 0,
        };
        Ok(rent)
    }

    fn count_owned_of(&self, board: &Board, player: PlayerId, pred: impl Fn(&SpaceKind) -> bool) -> u32 {
        self.owned_by(player)
            .filter(|(id, _)| board.space(*id).map(|s| pred(&s.kind)).unwrap_or(false))
            .count() as u32
    }

    pub fn build_house(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let (deed, members) = self.require_buildable(board, player, space)?;
        let holding = self.require_holding(space)?;
        if holding.hotel || holding.houses >= HOUSES_PER_HOTEL {
            return Err(DomainError::rule(
                RuleKind::UnevenBuilding,
                "four houses already stand here; build a hotel instead",
            ));
        }
        let min_level = self.min_level(&members);
        if holding.houses > min_level {
            return Err(DomainError::rule(
                RuleKind::UnevenBuilding,
                "build on the least developed property of the group first",
            ));
        }
        if self.houses_available == 0 {
            return Err(DomainError::rule(RuleKind::SupplyExhausted, "the bank has no houses left"));
        }
        ledger.debit(player, deed.house_cost, BankFlow::Building)?;
        self.houses_available -= 1;
        self.holding_mut(space)?.houses += 1;
        Ok(deed.house_cost)
    }

    pub fn build_hotel(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let (deed, members) = self.require_buildable(board, player, space)?;
        let holding = self.require_holding(space)?;
        if holding.hotel {
            return Err(DomainError::rule(RuleKind::UnevenBuilding, "a hotel already stands here"));
        }
        if holding.houses < HOUSES_PER_HOTEL || self.min_level(&members) < HOUSES_PER_HOTEL {
            return Err(DomainError::rule(
                RuleKind::UnevenBuilding,
                "every property in the group needs four houses first",
            ));
        }
        if self.hotels_available == 0 {
            return Err(DomainError::rule(RuleKind::SupplyExhausted, "the bank has no hotels left"));
        }
        ledger.debit(player, deed.house_cost, BankFlow::Building)?;
        self.hotels_available -= 1;
        self.houses_available += HOUSES_PER_HOTEL;
        let h = self.holding_mut(space)?;
        h.houses = 0;
        h.hotel = true;
        Ok(deed.house_cost)
    }

    pub fn sell_house(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let (deed, members) = self.require_improvable_owner(board, player, space)?;
        let holding = self.require_holding(space)?;
        if holding.houses == 0 {
            return Err(DomainError::rule(RuleKind::UnevenBuilding, "no house to sell here"));
        }
        if holding.level() < self.max_level(&members) {
            return Err(DomainError::rule(
                RuleKind::UnevenBuilding,
                "sell from the most developed property of the group first",
            ));
        }
        let proceeds = deed.house_cost / 2;
        self.houses_available += 1;
        self.holding_mut(space)?.houses -= 1;
        ledger.credit(player, proceeds, BankFlow::Building)?;
        Ok(proceeds)
    }

    /// Break a hotel back down to four houses.
    pub fn sell_hotel(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let (deed, _) = self.require_improvable_owner(board, player, space)?;
        let holding = self.require_holding(space)?;
        if !holding.hotel {
            return Err(DomainError::rule(RuleKind::UnevenBuilding, "no hotel to sell here"));
        }
        if self.houses_available < HOUSES_PER_HOTEL {
            return Err(DomainError::rule(
                RuleKind::SupplyExhausted,
                "the bank lacks the four houses a hotel breaks down into",
            ));
        }
        let proceeds = deed.house_cost / 2;
        self.hotels_available += 1;
        self.houses_available -= HOUSES_PER_HOTEL;
        let h = self.holding_mut(space)?;
        h.hotel = false;
        h.houses = HOUSES_PER_HOTEL;
        ledger.credit(player, proceeds, BankFlow::Building)?;
        Ok(proceeds)
    }

    /// Sell every building a player owns back to the bank at half cost,
    /// ignoring the even-selling rule. Used when a player goes bankrupt or
    /// must be liquidated without enough houses in the bank.
    pub fn sell_all_buildings(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        group: Option<ColorGroup>,
    ) -> Result<Money, DomainError> {
        let targets: Vec<SpaceId> = self
            .owned_by(player)
            .filter(|(_, h)| h.has_buildings())
            .map(|(id, _)| id)
            .filter(|id| group.is_none() || board.space(*id).ok().and_then(|s| s.group()) == group)
            .collect();
        let mut total = 0;
        for id in targets {
            let deed = require_deed(board, id)?;
            let h = self.holding_mut(id)?;
            let level = Money::from(h.level());
            let (houses, hotel) = (h.houses, h.hotel);
            h.houses = 0;
            h.hotel = false;
            self.houses_available += houses;
            if hotel {
                self.hotels_available += 1;
            }
            total += level * (deed.house_cost / 2);
        }
        ledger.credit(player, total, BankFlow::Building)?;
        Ok(total)
    }

    pub fn mortgage(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let deed = *require_deed(board, space)?;
        let holding = self.require_owned_by(space, player)?;
        if holding.mortgaged {
            return Err(DomainError::rule(RuleKind::AlreadyMortgaged, format!("space {space} is already mortgaged")));
        }
        if self.group_has_buildings(board, space)? {
            return Err(DomainError::rule(
                RuleKind::BuildingsInGroup,
                "sell the group's buildings before mortgaging",
            ));
        }
        self.holding_mut(space)?.mortgaged = true;
        ledger.credit(player, deed.mortgage_value, BankFlow::Mortgage)?;
        Ok(deed.mortgage_value)
    }

    /// Lift a mortgage, paying its value plus interest. Returns the total paid.
    pub fn unmortgage(
        &mut self,
        board: &Board,
        ledger: &mut Ledger,
        settings: &RoomSettings,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<Money, DomainError> {
        let deed = *require_deed(board, space)?;
        let holding = self.require_owned_by(space, player)?;
        if !holding.mortgaged {
            return Err(DomainError::rule(RuleKind::NotMortgaged, format!("space {space} is not mortgaged")));
        }
        if self.group_has_buildings(board, space)? {
            return Err(DomainError::rule(
                RuleKind::BuildingsInGroup,
                "the group carries buildings",
            ));
        }
        let interest = settings.mortgage_interest(deed.mortgage_value);
        let total = deed.mortgage_value + interest;
        let cash = ledger.player(player)?.cash;
        if cash < total {
            return Err(DomainError::rule(
                RuleKind::InsufficientFunds,
                format!("lifting the mortgage costs {total} but seat {player} holds {cash}"),
            ));
        }
        ledger.debit(player, deed.mortgage_value, BankFlow::Mortgage)?;
        ledger.debit(player, interest, BankFlow::Interest)?;
        self.holding_mut(space)?.mortgaged = false;
        Ok(total)
    }

    /// Cash plus everything the player could raise by selling all buildings
    /// and mortgaging every unmortgaged property.
    pub fn liquidatable_net_worth(&self, board: &Board, ledger: &Ledger, player: PlayerId) -> Result<Money, DomainError> {
        let mut worth = ledger.player(player)?.cash;
        for (id, h) in self.owned_by(player) {
            let deed = require_deed(board, id)?;
            worth += Money::from(h.level()) * (deed.house_cost / 2);
            if !h.mortgaged {
                worth += deed.mortgage_value;
            }
        }
        Ok(worth)
    }

    /// Hand an unimproved property to another player, mortgage included.
    pub fn transfer(&mut self, ledger: &mut Ledger, space: SpaceId, to: PlayerId) -> Result<(), DomainError> {
        let holding = self.require_holding(space)?;
        if holding.has_buildings() {
            return Err(DomainError::rule(
                RuleKind::EncumberedProperty,
                format!("space {space} carries buildings"),
            ));
        }
        let from = holding.owner;
        ledger.player_mut(from)?.properties.remove(&space);
        ledger.player_mut(to)?.properties.insert(space);
        self.holding_mut(space)?.owner = to;
        Ok(())
    }

    /// Return a property to the bank: unowned, unmortgaged, unimproved.
    pub fn release_to_bank(&mut self, ledger: &mut Ledger, space: SpaceId) -> Result<(), DomainError> {
        let holding = self.holdings.remove(&space).ok_or_else(|| not_owned(space))?;
        self.houses_available += holding.houses;
        if holding.hotel {
            self.hotels_available += 1;
        }
        ledger.player_mut(holding.owner)?.properties.remove(&space);
        Ok(())
    }

    /// Structural consistency between registry, ledger and supply.
    pub fn check_invariants(&self, board: &Board, ledger: &Ledger) -> Result<(), DomainError> {
        let houses = self.houses_in_play() + u32::from(self.houses_available);
        if houses != u32::from(self.house_supply) {
            return Err(DomainError::fatal(format!(
                "house count {houses} does not match supply {}",
                self.house_supply
            )));
        }
        let hotels = self.hotels_in_play() + u32::from(self.hotels_available);
        if hotels != u32::from(self.hotel_supply) {
            return Err(DomainError::fatal(format!(
                "hotel count {hotels} does not match supply {}",
                self.hotel_supply
            )));
        }
        for (id, h) in self.holdings() {
            let space = board.space(id)?;
            if !space.is_ownable() {
                return Err(DomainError::fatal(format!("{} is not ownable but has an owner", space.name)));
            }
            let owner = ledger.player(h.owner)?;
            if owner.bankrupt || !owner.properties.contains(&id) {
                return Err(DomainError::fatal(format!(
                    "{} owner seat {} does not list it",
                    space.name, h.owner
                )));
            }
            if h.houses > HOUSES_PER_HOTEL || (h.hotel && h.houses > 0) {
                return Err(DomainError::fatal(format!("{} has an impossible building count", space.name)));
            }
            if h.has_buildings() {
                let Some(group) = space.group() else {
                    return Err(DomainError::fatal(format!("{} cannot carry buildings", space.name)));
                };
                if h.mortgaged || !self.owns_group(board, h.owner, group) {
                    return Err(DomainError::fatal(format!(
                        "{} carries buildings without a clean monopoly",
                        space.name
                    )));
                }
                let members = group_members(board, id)?;
                if self.max_level(&members) - self.min_level(&members) > 1 {
                    return Err(DomainError::fatal(format!("{:?} group is unevenly built", group)));
                }
            }
        }
        for player in ledger.players() {
            for id in &player.properties {
                if self.owner_of(*id) != Some(player.id) {
                    return Err(DomainError::fatal(format!(
                        "seat {} lists space {id} it does not own",
                        player.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn require_holding(&self, space: SpaceId) -> Result<Holding, DomainError> {
        self.holdings.get(&space).copied().ok_or_else(|| not_owned(space))
    }

    fn holding_mut(&mut self, space: SpaceId) -> Result<&mut Holding, DomainError> {
        self.holdings.get_mut(&space).ok_or_else(|| not_owned(space))
    }

    fn require_owned_by(&self, space: SpaceId, player: PlayerId) -> Result<Holding, DomainError> {
        let holding = self.require_holding(space)?;
        if holding.owner != player {
            return Err(DomainError::rule(
                RuleKind::NotOwner,
                format!("seat {player} does not own space {space}"),
            ));
        }
        Ok(holding)
    }

    /// Owner check plus colour-group lookup for building and selling.
    fn require_improvable_owner(
        &self,
        board: &Board,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<(Deed, Vec<SpaceId>), DomainError> {
        let sp = board.space(space)?;
        let SpaceKind::Property { deed, .. } = sp.kind else {
            return Err(DomainError::rule(
                RuleKind::NotMonopoly,
                format!("{} cannot be improved", sp.name),
            ));
        };
        self.require_owned_by(space, player)?;
        Ok((deed, group_members(board, space)?))
    }

    fn require_buildable(
        &self,
        board: &Board,
        player: PlayerId,
        space: SpaceId,
    ) -> Result<(Deed, Vec<SpaceId>), DomainError> {
        let (deed, members) = self.require_improvable_owner(board, player, space)?;
        let complete = members.iter().all(|id| self.owner_of(*id) == Some(player));
        if !complete {
            return Err(DomainError::rule(RuleKind::NotMonopoly, "the colour group is incomplete"));
        }
        if members
            .iter()
            .any(|id| self.holdings.get(id).is_some_and(|h| h.mortgaged))
        {
            return Err(DomainError::rule(RuleKind::NotMonopoly, "a property in the group is mortgaged"));
        }
        Ok((deed, members))
    }

    fn min_level(&self, members: &[SpaceId]) -> u8 {
        members
            .iter()
            .map(|id| self.holdings.get(id).map_or(0, Holding::level))
            .min()
            .unwrap_or(0)
    }

    fn max_level(&self, members: &[SpaceId]) -> u8 {
        members
            .iter()
            .map(|id| self.holdings.get(id).map_or(0, Holding::level))
            .max()
            .unwrap_or(0)
    }
}

fn not_owned(space: SpaceId) -> DomainError {
    DomainError::rule(RuleKind::NotOwner, format!("space {space} has no owner"))
}

fn require_deed(board: &Board, space: SpaceId) -> Result<&Deed, DomainError> {
    let sp = board.space(space)?;
    sp.deed().ok_or_else(|| {
        DomainError::rule(RuleKind::NotPurchasable, format!("{} has no title deed", sp.name))
    })
}

/// Space ids sharing `space`'s colour group; a lone id for railroads and utilities.
fn group_members(board: &Board, space: SpaceId) -> Result<Vec<SpaceId>, DomainError> {
    Ok(match board.space(space)?.group() {
        Some(group) => board.spaces_in_group(group).iter().map(|s| s.id).collect(),
        None => vec![space],
    })
}
