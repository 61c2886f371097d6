// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::dice::DiceRoll;
use crate::domain::settings::Edition;

pub fn edition() -> impl Strategy<Value = Edition> {
    prop_oneof![Just(Edition::Classic), Just(Edition::Heritage)]
}

pub fn player_count() -> impl Strategy<Value = usize> {
    2usize..=6
}

pub fn seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

pub fn die() -> impl Strategy<Value = u8> {
    1u8..=6
}

pub fn dice_roll() -> impl Strategy<Value = DiceRoll> {
    (die(), die()).prop_map(|(a, b)| DiceRoll::new(a, b).unwrap())
}

/// Three doubles in a row.
pub fn three_doubles() -> impl Strategy<Value = [DiceRoll; 3]> {
    (die(), die(), die()).prop_map(|(a, b, c)| {
        [a, b, c].map(|d| DiceRoll::new(d, d).unwrap())
    })
}

/// Indices used by random-play properties to pick among legal actions.
pub fn choices(len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), len)
}
