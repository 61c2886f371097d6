//! Cyclic draw piles.
//!
//! A deck is shuffled once when the game starts and never again. Drawn cards
//! go back underneath; a kept card (get out of jail free) stays out of the
//! pile while a player holds it and goes underneath when it is used.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use super::cards::{card, deck_cards, Card, CardId, DeckKind};
use super::settings::Edition;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    edition: Edition,
    kind: DeckKind,
    pile: VecDeque<CardId>,
    withheld: Vec<CardId>,
}

/// Public view of a deck. The order of the pile is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckView {
    pub kind: DeckKind,
    pub remaining: usize,
    pub withheld: usize,
}

impl Deck {
    /// Deck in printed order.
    pub fn ordered(edition: Edition, kind: DeckKind) -> Self {
        let pile = deck_cards(edition, kind).iter().map(|c| c.id).collect();
        Self {
            edition,
            kind,
            pile,
            withheld: Vec::new(),
        }
    }

    /// Deck shuffled once from `seed`.
    pub fn shuffled(edition: Edition, kind: DeckKind, seed: u64) -> Self {
        let mut ids: Vec<CardId> = deck_cards(edition, kind).iter().map(|c| c.id).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        ids.shuffle(&mut rng);
        Self {
            edition,
            kind,
            pile: ids.into(),
            withheld: Vec::new(),
        }
    }

    pub fn kind(&self) -> DeckKind {
        self.kind
    }

    /// Take the top card. The caller settles it with [`Deck::discard`] or
    /// [`Deck::withhold`] once its effect is applied.
    pub fn draw(&mut self) -> Result<&'static Card, DomainError> {
        let id = self.pile.pop_front().ok_or_else(|| {
            DomainError::fatal(format!("{:?} deck has no cards left to draw", self.kind))
        })?;
        card(self.edition, self.kind, id)
    }

    /// Put a resolved card underneath the pile.
    pub fn discard(&mut self, id: CardId) {
        self.pile.push_back(id);
    }

    /// Keep a card out of rotation while a player holds it.
    pub fn withhold(&mut self, id: CardId) {
        self.withheld.push(id);
    }

    /// A held card was used or surrendered; it goes underneath.
    pub fn return_card(&mut self, id: CardId) -> Result<(), DomainError> {
        let pos = self
            .withheld
            .iter()
            .position(|c| *c == id)
            .ok_or_else(|| {
                DomainError::fatal(format!("card {id} is not held out of the {:?} deck", self.kind))
            })?;
        self.withheld.swap_remove(pos);
        self.pile.push_back(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pile.is_empty()
    }

    pub fn withheld(&self) -> &[CardId] {
        &self.withheld
    }

    /// Cards in the pile plus those held by players.
    pub fn total_cards(&self) -> usize {
        self.pile.len() + self.withheld.len()
    }

    pub fn view(&self) -> DeckView {
        DeckView {
            kind: self.kind,
            remaining: self.pile.len(),
            withheld: self.withheld.len(),
        }
    }

    /// Printed order rotated so `top` is drawn first.
    #[cfg(test)]
    pub(crate) fn stacked(edition: Edition, kind: DeckKind, top: CardId) -> Self {
        let mut deck = Self::ordered(edition, kind);
        if let Some(pos) = deck.pile.iter().position(|c| *c == top) {
            deck.pile.rotate_left(pos);
        }
        deck
    }

    #[cfg(test)]
    pub(crate) fn pile(&self) -> Vec<CardId> {
        self.pile.iter().copied().collect()
    }
}
