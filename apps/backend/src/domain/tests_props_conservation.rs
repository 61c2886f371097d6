//! Property-based tests for whole-game consistency under random legal play.

use proptest::prelude::*;

use crate::domain::actions::{apply_action, legal_actions};
use crate::domain::settings::{Edition, RoomSettings};
use crate::domain::snapshot::{snapshot, GameSnapshot};
use crate::domain::state::GameState;
use crate::domain::{test_gens, test_prelude};

/// Play `choices.len()` steps, each picking one of the current player's
/// legal actions. Every step must be accepted and keep the books balanced.
fn random_play(
    seed: u64,
    players: usize,
    edition: Edition,
    choices: &[usize],
) -> Result<GameState, TestCaseError> {
    let names = (0..players).map(|i| format!("P{i}")).collect();
    let mut g = GameState::new(RoomSettings::for_edition(edition), names, seed)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

    for pick in choices {
        if g.is_over() {
            break;
        }
        let who = g.current;
        let legal = legal_actions(&g, who);
        prop_assert!(!legal.is_empty(), "seat {} has nothing to do in {:?}", who, g.phase);
        let action = legal[pick % legal.len()].clone();
        let label = format!("{action:?}");
        g.transact(|s, ev| apply_action(s, who, action, ev))
            .map_err(|e| TestCaseError::fail(format!("legal {label} rejected: {e}")))?;

        let books = g.ledger.total_cash() + g.ledger.bank().net();
        prop_assert_eq!(books, g.ledger.initial_total());
        prop_assert!(g.ledger.players().iter().all(|p| p.cash >= 0));
    }
    Ok(g)
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: Conservation of money
    /// Player cash plus the bank's net intake equals the starting total after
    /// every accepted action, and the full invariant check holds throughout.
    #[test]
    fn prop_money_is_conserved(
        seed in test_gens::seed(),
        players in test_gens::player_count(),
        edition in test_gens::edition(),
        choices in test_gens::choices(150),
    ) {
        let g = random_play(seed, players, edition, &choices)?;
        g.check_invariants().map_err(|e| TestCaseError::fail(e.to_string()))?;
    }

    /// Property: Deterministic replay
    /// The same seed and the same choices produce an identical snapshot.
    #[test]
    fn prop_same_seed_same_game(
        seed in test_gens::seed(),
        players in test_gens::player_count(),
        choices in test_gens::choices(80),
    ) {
        let a: GameSnapshot = snapshot(&random_play(seed, players, Edition::Classic, &choices)?);
        let b: GameSnapshot = snapshot(&random_play(seed, players, Edition::Classic, &choices)?);
        prop_assert_eq!(a, b);
    }
}
