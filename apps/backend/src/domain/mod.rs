//! Domain layer: pure game logic types and helpers.

pub mod actions;
pub mod bankruptcy;
pub mod board;
pub mod cards;
pub mod deck;
pub mod dice;
pub mod events;
pub mod improvements;
pub mod ledger;
pub mod registry;
pub mod seed_derivation;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod trade;
pub mod turn;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_state_helpers;
#[cfg(test)]
mod tests_bankruptcy;
#[cfg(test)]
mod tests_jail;
#[cfg(test)]
mod tests_props_conservation;
#[cfg(test)]
mod tests_props_deck;
#[cfg(test)]
mod tests_turn;

/// Seat index, 0-based in turn order.
pub type PlayerId = u8;
/// Whole currency units; never fractional.
pub type Money = i64;

// Re-exports for ergonomics
pub use actions::{apply_action, legal_actions, Action};
pub use board::{Board, SpaceId, SpaceKind};
pub use cards::{Card, CardEffect, DeckKind};
pub use events::GameEvent;
pub use registry::BuildingKind;
pub use settings::{Edition, RoomSettings};
pub use snapshot::{snapshot, GameSnapshot};
pub use state::{GameState, TurnPhase};
pub use trade::{OfferId, TradeOffer, TradeTerms};
