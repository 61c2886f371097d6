//! Static board model: 40 spaces, title deeds and colour groups.
//!
//! Every edition shares one layout and one rent table expressed in classic
//! units; an edition only renames spaces and multiplies amounts by its scale.
//! Boards are built once per process and handed out as `&'static Board`.

use once_cell::sync::Lazy;
use serde::Serialize;

use super::settings::Edition;
use super::Money;
use crate::errors::domain::{DomainError, ValidationKind};

pub type SpaceId = u8;

pub const BOARD_SIZE: u8 = 40;
pub const GO: SpaceId = 0;
pub const JAIL: SpaceId = 10;
pub const GO_TO_JAIL: SpaceId = 30;

/// Railroad rent in classic units for one railroad owned; doubles per extra one.
const RAILROAD_BASE_RENT: Money = 25;
/// Dice multipliers for one and for both utilities owned.
pub const UTILITY_MULTIPLIERS: [Money; 2] = [4, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentSchedule {
    pub base: Money,
    pub houses: [Money; 4],
    pub hotel: Money,
}

impl RentSchedule {
    /// Rent at improvement level 0 (bare) through 5 (hotel).
    pub fn at_level(&self, level: u8) -> Money {
        match level {
            0 => self.base,
            1..=4 => self.houses[usize::from(level - 1)],
            _ => self.hotel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deed {
    pub price: Money,
    pub mortgage_value: Money,
    /// Cost of one house; a hotel costs the same on top of four houses.
    pub house_cost: Money,
    pub rent: RentSchedule,
}

/// Space kind with the data each kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SpaceKind {
    Go,
    Property { group: ColorGroup, deed: Deed },
    Railroad { deed: Deed },
    Utility { deed: Deed },
    Tax { amount: Money },
    Chance,
    Community,
    Jail,
    FreeParking,
    GoToJail,
}

/// Data-free tag used for "nearest" lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpaceType {
    Go,
    Property,
    Railroad,
    Utility,
    Tax,
    Chance,
    Community,
    Jail,
    FreeParking,
    GoToJail,
}

impl SpaceKind {
    pub fn space_type(&self) -> SpaceType {
        match self {
            SpaceKind::Go => SpaceType::Go,
            SpaceKind::Property { .. } => SpaceType::Property,
            SpaceKind::Railroad { .. } => SpaceType::Railroad,
            SpaceKind::Utility { .. } => SpaceType::Utility,
            SpaceKind::Tax { .. } => SpaceType::Tax,
            SpaceKind::Chance => SpaceType::Chance,
            SpaceKind::Community => SpaceType::Community,
            SpaceKind::Jail => SpaceType::Jail,
            SpaceKind::FreeParking => SpaceType::FreeParking,
            SpaceKind::GoToJail => SpaceType::GoToJail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: SpaceKind,
}

impl Space {
    pub fn deed(&self) -> Option<&Deed> {
        match &self.kind {
            SpaceKind::Property { deed, .. }
            | SpaceKind::Railroad { deed }
            | SpaceKind::Utility { deed } => Some(deed),
            _ => None,
        }
    }

    pub fn group(&self) -> Option<ColorGroup> {
        match self.kind {
            SpaceKind::Property { group, .. } => Some(group),
            _ => None,
        }
    }

    pub fn is_ownable(&self) -> bool {
        self.deed().is_some()
    }
}

#[derive(Debug)]
pub struct Board {
    edition: Edition,
    spaces: Vec<Space>,
}

static CLASSIC: Lazy<Board> = Lazy::new(|| Board::build(Edition::Classic));
static HERITAGE: Lazy<Board> = Lazy::new(|| Board::build(Edition::Heritage));

impl Board {
    pub fn for_edition(edition: Edition) -> &'static Board {
        match edition {
            Edition::Classic => &CLASSIC,
            Edition::Heritage => &HERITAGE,
        }
    }

    fn build(edition: Edition) -> Board {
        let scale = edition.scale();
        let spaces = LAYOUT
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let name = match edition {
                    Edition::Classic => row.classic,
                    Edition::Heritage => row.heritage,
                };
                Space {
                    id: idx as SpaceId,
                    name,
                    kind: row.def.materialize(scale),
                }
            })
            .collect();
        Board { edition, spaces }
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn space(&self, id: SpaceId) -> Result<&Space, DomainError> {
        self.spaces.get(usize::from(id)).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidSpace,
                format!("space {id} is off the board"),
            )
        })
    }

    /// Deed of an ownable space, `None` for corners, taxes and card spaces.
    pub fn deed(&self, id: SpaceId) -> Result<Option<&Deed>, DomainError> {
        Ok(self.space(id)?.deed())
    }

    /// Members of a colour group in board order.
    pub fn spaces_in_group(&self, group: ColorGroup) -> Vec<&Space> {
        self.spaces
            .iter()
            .filter(|s| s.group() == Some(group))
            .collect()
    }

    pub fn spaces_of_type(&self, kind: SpaceType) -> impl Iterator<Item = &Space> {
        self.spaces
            .iter()
            .filter(move |s| s.kind.space_type() == kind)
    }

    /// First space of `kind` strictly ahead of `from`, wrapping past GO.
    pub fn nearest_of_kind(&self, from: SpaceId, kind: SpaceType) -> Result<&Space, DomainError> {
        self.space(from)?;
        (1..=BOARD_SIZE)
            .map(|step| (from + step) % BOARD_SIZE)
            .map(|id| &self.spaces[usize::from(id)])
            .find(|s| s.kind.space_type() == kind)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidSpace,
                    format!("no {kind:?} space on the board"),
                )
            })
    }
}

/// Steps forward from `from` to `to`, 0..40.
pub fn distance_forward(from: SpaceId, to: SpaceId) -> u8 {
    (to + BOARD_SIZE - from) % BOARD_SIZE
}

#[derive(Clone, Copy)]
enum Def {
    Go,
    Street {
        group: ColorGroup,
        price: Money,
        house: Money,
        rent: [Money; 6],
    },
    Railroad,
    Utility,
    Tax(Money),
    Chance,
    Community,
    Jail,
    FreeParking,
    GoToJail,
}

impl Def {
    fn materialize(self, scale: Money) -> SpaceKind {
        let deed = |price: Money, house: Money, rent: [Money; 6]| Deed {
            price: price * scale,
            mortgage_value: price * scale / 2,
            house_cost: house * scale,
            rent: RentSchedule {
                base: rent[0] * scale,
                houses: [
                    rent[1] * scale,
                    rent[2] * scale,
                    rent[3] * scale,
                    rent[4] * scale,
                ],
                hotel: rent[5] * scale,
            },
        };
        match self {
            Def::Go => SpaceKind::Go,
            Def::Street {
                group,
                price,
                house,
                rent,
            } => SpaceKind::Property {
                group,
                deed: deed(price, house, rent),
            },
            Def::Railroad => SpaceKind::Railroad {
                deed: deed(200, 0, [RAILROAD_BASE_RENT, 0, 0, 0, 0, 0]),
            },
            Def::Utility => SpaceKind::Utility {
                deed: deed(150, 0, [0; 6]),
            },
            Def::Tax(amount) => SpaceKind::Tax {
                amount: amount * scale,
            },
            Def::Chance => SpaceKind::Chance,
            Def::Community => SpaceKind::Community,
            Def::Jail => SpaceKind::Jail,
            Def::FreeParking => SpaceKind::FreeParking,
            Def::GoToJail => SpaceKind::GoToJail,
        }
    }
}

struct Row {
    classic: &'static str,
    heritage: &'static str,
    def: Def,
}

const fn street(
    classic: &'static str,
    heritage: &'static str,
    group: ColorGroup,
    price: Money,
    house: Money,
    rent: [Money; 6],
) -> Row {
    Row {
        classic,
        heritage,
        def: Def::Street {
            group,
            price,
            house,
            rent,
        },
    }
}

const fn fixed(classic: &'static str, heritage: &'static str, def: Def) -> Row {
    Row {
        classic,
        heritage,
        def,
    }
}

#[allow(clippy::wildcard_imports)]
use ColorGroup::*;

const LAYOUT: [Row; BOARD_SIZE as usize] = [
    fixed("Go", "Go", Def::Go),
    street("Mediterranean Avenue", "Goa", Brown, 60, 50, [2, 10, 30, 90, 160, 250]),
    fixed("Community Chest", "Community Chest", Def::Community),
    street("Baltic Avenue", "Odisha", Brown, 60, 50, [4, 20, 60, 180, 320, 450]),
    fixed("Income Tax", "Income Tax", Def::Tax(200)),
    fixed("Reading Railroad", "Chandigarh Station", Def::Railroad),
    street("Oriental Avenue", "Mumbai", LightBlue, 100, 50, [6, 30, 90, 270, 400, 550]),
    fixed("Chance", "Chance", Def::Chance),
    street("Vermont Avenue", "Jaipur", LightBlue, 100, 50, [6, 30, 90, 270, 400, 550]),
    street("Connecticut Avenue", "Hyderabad", LightBlue, 120, 50, [8, 40, 100, 300, 450, 600]),
    fixed("Jail", "Jail", Def::Jail),
    street("St. Charles Place", "Chennai", Pink, 140, 100, [10, 50, 150, 450, 625, 750]),
    fixed("Electric Company", "Electric Company", Def::Utility),
    street("States Avenue", "Karnataka", Pink, 140, 100, [10, 50, 150, 450, 625, 750]),
    street("Virginia Avenue", "Andhra Pradesh", Pink, 160, 100, [12, 60, 180, 500, 700, 900]),
    fixed("Pennsylvania Railroad", "Bangalore Station", Def::Railroad),
    street("St. James Place", "Kerala", Orange, 180, 100, [14, 70, 200, 550, 750, 950]),
    fixed("Community Chest", "Community Chest", Def::Community),
    street("Tennessee Avenue", "Tamil Nadu", Orange, 180, 100, [14, 70, 200, 550, 750, 950]),
    street("New York Avenue", "Telangana", Orange, 200, 100, [16, 80, 220, 600, 800, 1000]),
    fixed("Free Parking", "Free Parking", Def::FreeParking),
    street("Kentucky Avenue", "Rajasthan", Red, 220, 150, [18, 90, 250, 700, 875, 1050]),
    fixed("Chance", "Chance", Def::Chance),
    street("Indiana Avenue", "Uttar Pradesh", Red, 220, 150, [18, 90, 250, 700, 875, 1050]),
    street("Illinois Avenue", "Bihar", Red, 240, 150, [20, 100, 300, 750, 925, 1100]),
    fixed("B&O Railroad", "Kolkata Station", Def::Railroad),
    street("Atlantic Avenue", "West Bengal", Yellow, 260, 150, [22, 110, 330, 800, 975, 1150]),
    street("Ventnor Avenue", "Madhya Pradesh", Yellow, 260, 150, [22, 110, 330, 800, 975, 1150]),
    fixed("Water Works", "Water Works", Def::Utility),
    street("Marvin Gardens", "Punjab", Yellow, 280, 150, [24, 120, 360, 850, 1025, 1200]),
    fixed("Go To Jail", "Go To Jail", Def::GoToJail),
    street("Pacific Avenue", "Haryana", Green, 300, 200, [26, 130, 390, 900, 1100, 1275]),
    street("North Carolina Avenue", "Assam", Green, 300, 200, [26, 130, 390, 900, 1100, 1275]),
    fixed("Community Chest", "Community Chest", Def::Community),
    street("Pennsylvania Avenue", "Manipur", Green, 320, 200, [28, 150, 450, 1000, 1200, 1400]),
    fixed("Short Line", "Delhi Station", Def::Railroad),
    fixed("Chance", "Chance", Def::Chance),
    street("Park Place", "Himachal Pradesh", DarkBlue, 350, 200, [35, 175, 500, 1100, 1300, 1500]),
    fixed("Luxury Tax", "Luxury Tax", Def::Tax(100)),
    street("Boardwalk", "Jammu & Kashmir", DarkBlue, 400, 200, [50, 200, 600, 1400, 1700, 2000]),
];
