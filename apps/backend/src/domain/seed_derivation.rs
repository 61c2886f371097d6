//! RNG seed derivation for deterministic games.
//!
//! A room is created with one base seed. Dice and each deck get their own
//! stream so that drawing a card never shifts the dice sequence.

use super::cards::DeckKind;

/// Derive the seed for the dice stream.
pub fn derive_dice_seed(game_seed: u64) -> u64 {
    game_seed.wrapping_mul(6364136223846793005).wrapping_add(1)
}

/// Derive the seed used to shuffle a deck once at game start.
pub fn derive_deck_seed(game_seed: u64, deck: DeckKind) -> u64 {
    let slot = match deck {
        DeckKind::Chance => 1u64,
        DeckKind::Community => 2,
    };
    game_seed
        .wrapping_add(slot.wrapping_mul(1_000_003))
        .wrapping_add(2) // distinct from the dice offset
}
