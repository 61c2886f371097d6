use crate::domain::actions::Action;
use crate::domain::bankruptcy::raise_cash;
use crate::domain::cards::DeckKind;
use crate::domain::deck::Deck;
use crate::domain::events::GameEvent;
use crate::domain::registry::BuildingKind;
use crate::domain::settings::Edition;
use crate::domain::state::{Creditor, TurnPhase};
use crate::domain::test_state_helpers::{act, cash, classic_game, give, place, set_cash};

#[test]
fn tax_with_no_assets_reverts_everything_to_the_bank() {
    let mut g = classic_game(3, &[(1, 3)]);
    give(&mut g, 0, &[1, 3]);
    act(&mut g, 0, Action::Mortgage { space_id: 1 });
    act(&mut g, 0, Action::Mortgage { space_id: 3 });
    set_cash(&mut g, 0, 100);

    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.contains(&GameEvent::PlayerBankrupt {
        player_id: 0,
        creditor: Creditor::Bank,
    }));
    let a = g.ledger.player(0).unwrap();
    assert!(a.bankrupt);
    assert_eq!(a.cash, 0);
    assert!(a.properties.is_empty());
    for space in [1, 3] {
        assert_eq!(g.registry.owner_of(space), None);
    }
    assert_eq!(g.current, 1);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
}

#[test]
fn rent_bankruptcy_hands_assets_to_the_owner_and_ends_the_game() {
    let mut g = classic_game(2, &[(1, 3)]);
    set_cash(&mut g, 1, 5000);
    give(&mut g, 1, &[37, 39]);
    for _ in 0..4 {
        for space_id in [37, 39] {
            act(
                &mut g,
                1,
                Action::Build {
                    space_id,
                    kind: BuildingKind::House,
                },
            );
        }
    }
    act(
        &mut g,
        1,
        Action::Build {
            space_id: 39,
            kind: BuildingKind::Hotel,
        },
    );
    give(&mut g, 0, &[1]);
    place(&mut g, 0, 35);
    let b_before = cash(&g, 1);

    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.contains(&GameEvent::PlayerBankrupt {
        player_id: 0,
        creditor: Creditor::Player { player_id: 1 },
    }));
    assert_eq!(ev.last(), Some(&GameEvent::GameOver { winner_id: 1 }));
    assert_eq!(g.phase, TurnPhase::GameOver { winner_id: 1 });
    assert_eq!(g.winner(), Some(1));
    assert_eq!(g.registry.owner_of(1), Some(1));
    assert_eq!(cash(&g, 1), b_before + 1500);
}

#[test]
fn declaring_during_a_debt_pays_the_creditor() {
    let mut g = classic_game(3, &[(2, 3)]);
    give(&mut g, 1, &[5]);
    give(&mut g, 0, &[39]);
    set_cash(&mut g, 0, 10);
    act(&mut g, 0, Action::RollDice);
    assert!(matches!(g.phase, TurnPhase::AwaitingPayment { .. }));

    let ev = act(&mut g, 0, Action::DeclareBankruptcy);
    assert!(ev.contains(&GameEvent::PlayerBankrupt {
        player_id: 0,
        creditor: Creditor::Player { player_id: 1 },
    }));
    assert_eq!(g.registry.owner_of(39), Some(1));
    assert_eq!(cash(&g, 1), 1510);
    assert_eq!(g.current, 1);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
}

#[test]
fn off_turn_payers_liquidate_or_go_bankrupt() {
    let mut g = classic_game(3, &[(1, 1)]);
    g.community = Deck::stacked(Edition::Classic, DeckKind::Community, 8);
    give(&mut g, 1, &[6]);
    set_cash(&mut g, 1, 5);
    set_cash(&mut g, 2, 0);

    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.contains(&GameEvent::MortgageChanged {
        space_id: 6,
        mortgaged: true,
    }));
    assert!(ev.contains(&GameEvent::PlayerBankrupt {
        player_id: 2,
        creditor: Creditor::Player { player_id: 0 },
    }));
    assert_eq!(cash(&g, 1), 45);
    assert_eq!(cash(&g, 0), 1510);
    assert!(g.ledger.player(2).unwrap().bankrupt);
    assert_eq!(g.current, 0);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
}

#[test]
fn liquidation_sells_buildings_before_mortgaging() {
    let mut g = classic_game(2, &[]);
    give(&mut g, 0, &[1, 3]);
    for space_id in [1, 3] {
        act(
            &mut g,
            0,
            Action::Build {
                space_id,
                kind: BuildingKind::House,
            },
        );
    }
    set_cash(&mut g, 0, 0);
    let ev = g.transact(|s, ev| raise_cash(s, 0, 30, ev)).unwrap();
    assert_eq!(cash(&g, 0), 50);
    assert_eq!(g.registry.building_counts(0), (0, 0));
    assert!(!g.registry.holding(1).unwrap().mortgaged);
    assert!(!ev.iter().any(|e| matches!(e, GameEvent::MortgageChanged { .. })));
}

#[test]
fn bankrupt_players_jail_cards_go_back() {
    let mut g = classic_game(3, &[(3, 4), (1, 3)]);
    g.chance = Deck::stacked(Edition::Classic, DeckKind::Chance, 8);
    act(&mut g, 0, Action::RollDice);
    assert_eq!(g.chance.withheld().len(), 1);
    act(&mut g, 0, Action::DeclareBankruptcy);
    assert!(g.chance.withheld().is_empty());
    assert_eq!(g.chance.len(), 16);
    assert_eq!(g.current, 1);
}
