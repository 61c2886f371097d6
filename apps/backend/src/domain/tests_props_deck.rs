//! Property-based tests for deck rotation.

use proptest::prelude::*;

use crate::domain::cards::{CardId, DeckKind};
use crate::domain::deck::Deck;
use crate::domain::{test_gens, test_prelude};

fn deck_kind() -> impl Strategy<Value = DeckKind> {
    prop_oneof![Just(DeckKind::Chance), Just(DeckKind::Community)]
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: Cyclic draw order
    /// With nothing held out of the deck, drawing twice the deck size yields
    /// every card exactly twice, in the same relative order both times.
    #[test]
    fn prop_two_passes_repeat_the_same_order(
        edition in test_gens::edition(),
        kind in deck_kind(),
        seed in test_gens::seed(),
    ) {
        let mut deck = Deck::shuffled(edition, kind, seed);
        let size = deck.len();
        let mut drawn: Vec<CardId> = Vec::with_capacity(size * 2);
        for _ in 0..size * 2 {
            let card = deck.draw().map_err(|e| TestCaseError::fail(e.to_string()))?;
            deck.discard(card.id);
            drawn.push(card.id);
        }
        let (first, second) = drawn.split_at(size);
        prop_assert_eq!(first, second);

        let mut sorted = first.to_vec();
        sorted.sort_unstable();
        let expected: Vec<CardId> = (0..size as CardId).collect();
        prop_assert_eq!(sorted, expected);
    }

    /// Property: A held card never comes up
    /// Once the keep card is withheld, a full pass of the pile never draws it;
    /// returning it puts it at the bottom.
    #[test]
    fn prop_withheld_card_skips_rotation(
        edition in test_gens::edition(),
        kind in deck_kind(),
        seed in test_gens::seed(),
    ) {
        let mut deck = Deck::shuffled(edition, kind, seed);
        let mut keep = None;
        while keep.is_none() {
            let card = deck.draw().map_err(|e| TestCaseError::fail(e.to_string()))?;
            if card.is_keep() {
                deck.withhold(card.id);
                keep = Some(card.id);
            } else {
                deck.discard(card.id);
            }
        }
        let keep = keep.unwrap();
        for _ in 0..deck.len() {
            let card = deck.draw().map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_ne!(card.id, keep);
            deck.discard(card.id);
        }
        deck.return_card(keep).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(deck.pile().last().copied(), Some(keep));
        prop_assert_eq!(deck.total_cards(), 16);
    }
}
