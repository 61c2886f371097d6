use crate::domain::actions::Action;
use crate::domain::events::GameEvent;
use crate::domain::ledger::JailState;
use crate::domain::registry::BuildingKind;
use crate::domain::state::{Creditor, Debt, DebtReason, TurnPhase};
use crate::domain::test_state_helpers::{act, cash, classic_game, give, place, set_cash, try_act};
use crate::domain::turn::skip_turn;
use crate::errors::domain::{DomainError, RuleKind, ValidationKind};

#[test]
fn buy_then_rent() {
    let mut g = classic_game(2, &[(2, 3), (1, 4)]);

    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.contains(&GameEvent::PlayerMoved {
        player_id: 0,
        position: 5,
        passed_go: false,
    }));
    assert_eq!(g.phase, TurnPhase::AwaitingPurchaseDecision { space_id: 5 });

    let ev = act(&mut g, 0, Action::BuyProperty);
    assert!(ev.contains(&GameEvent::PropertyPurchased {
        space_id: 5,
        player_id: 0,
        price: 200,
    }));
    assert_eq!(cash(&g, 0), 1300);
    assert_eq!(g.registry.owner_of(5), Some(0));
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);

    act(&mut g, 0, Action::EndTurn);
    assert_eq!(g.current, 1);
    assert_eq!(g.turn_no, 2);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);

    let ev = act(&mut g, 1, Action::RollDice);
    assert!(ev.contains(&GameEvent::RentCharged {
        from: 1,
        to: 0,
        amount: 25,
        space_id: 5,
    }));
    assert_eq!(cash(&g, 1), 1475);
    assert_eq!(cash(&g, 0), 1325);
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);
}

#[test]
fn doubles_grant_one_extra_roll() {
    let mut g = classic_game(2, &[(3, 3), (1, 2)]);
    act(&mut g, 0, Action::RollDice);
    assert_eq!(g.phase, TurnPhase::AwaitingPurchaseDecision { space_id: 6 });
    act(&mut g, 0, Action::DeclinePurchase);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
    assert_eq!(g.current, 0);

    let err = try_act(&mut g, 0, Action::EndTurn).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));

    act(&mut g, 0, Action::RollDice);
    assert_eq!(g.ledger.player(0).unwrap().position, 9);
    act(&mut g, 0, Action::DeclinePurchase);
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);
    assert_eq!(g.registry.owner_of(6), None);
}

#[test]
fn third_double_jails_without_moving() {
    let mut g = classic_game(2, &[(2, 2), (3, 3), (1, 1)]);
    // Income Tax, then visiting jail, both with another roll owed.
    act(&mut g, 0, Action::RollDice);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
    act(&mut g, 0, Action::RollDice);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
    assert_eq!(g.ledger.player(0).unwrap().position, 10);

    let ev = act(&mut g, 0, Action::RollDice);
    assert!(!ev.iter().any(|e| matches!(e, GameEvent::PlayerMoved { position: 12, .. })));
    assert!(ev.contains(&GameEvent::JailChanged {
        player_id: 0,
        in_jail: true,
    }));
    let a = g.ledger.player(0).unwrap();
    assert_eq!(a.jail, JailState::InJail { turns_remaining: 3 });
    assert_eq!(a.position, 10);
    assert_eq!(a.cash, 1300);
    assert_eq!(g.current, 1);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
}

#[test]
fn go_to_jail_space_voids_the_extra_roll() {
    let mut g = classic_game(2, &[(2, 2)]);
    place(&mut g, 0, 26);
    let ev = act(&mut g, 0, Action::RollDice);
    assert!(!ev.iter().any(|e| matches!(e, GameEvent::SalaryCollected { .. })));
    assert!(g.ledger.player(0).unwrap().in_jail());
    assert_eq!(g.ledger.player(0).unwrap().position, 10);
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);
}

#[test]
fn passing_go_pays_salary_once() {
    let mut g = classic_game(2, &[(1, 2)]);
    place(&mut g, 0, 38);
    let ev = act(&mut g, 0, Action::RollDice);
    let salaries = ev
        .iter()
        .filter(|e| matches!(e, GameEvent::SalaryCollected { amount: 200, .. }))
        .count();
    assert_eq!(salaries, 1);
    assert_eq!(cash(&g, 0), 1700);
    assert_eq!(g.phase, TurnPhase::AwaitingPurchaseDecision { space_id: 1 });
}

#[test]
fn out_of_turn_and_wrong_phase_are_rejected() {
    let mut g = classic_game(2, &[]);
    let err = try_act(&mut g, 1, Action::RollDice).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::OutOfTurn, _)));
    for action in [Action::EndTurn, Action::BuyProperty, Action::PayDebt, Action::PayBail] {
        let err = try_act(&mut g, 0, action).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));
    }
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
}

#[test]
fn unimproved_monopoly_doubles_rent() {
    let mut g = classic_game(2, &[(1, 2)]);
    give(&mut g, 1, &[1, 3]);
    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.contains(&GameEvent::RentCharged {
        from: 0,
        to: 1,
        amount: 8,
        space_id: 3,
    }));
}

fn stuck_on_income_tax() -> crate::domain::state::GameState {
    let mut g = classic_game(2, &[(1, 3)]);
    set_cash(&mut g, 0, 100);
    give(&mut g, 0, &[39]);
    let ev = act(&mut g, 0, Action::RollDice);
    let debt = Debt {
        creditor: Creditor::Bank,
        amount: 200,
        reason: DebtReason::Tax { space_id: 4 },
    };
    assert!(ev.contains(&GameEvent::PaymentRequired { player_id: 0, debt }));
    assert_eq!(g.phase, TurnPhase::AwaitingPayment { debt });
    g
}

#[test]
fn short_player_raises_funds_then_pays() {
    let mut g = stuck_on_income_tax();
    let err = try_act(&mut g, 0, Action::PayDebt).unwrap_err();
    assert!(matches!(err, DomainError::Rule(RuleKind::InsufficientFunds, _)));

    act(&mut g, 0, Action::Mortgage { space_id: 39 });
    assert_eq!(cash(&g, 0), 300);
    let ev = act(&mut g, 0, Action::PayDebt);
    assert!(ev.iter().any(|e| matches!(e, GameEvent::DebtSettled { player_id: 0, .. })));
    assert_eq!(cash(&g, 0), 100);
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);
}

#[test]
fn mortgage_round_trip_restores_build_eligibility() {
    let mut g = classic_game(2, &[]);
    give(&mut g, 0, &[1, 3]);
    act(&mut g, 0, Action::Mortgage { space_id: 1 });
    let err = try_act(
        &mut g,
        0,
        Action::Build {
            space_id: 3,
            kind: BuildingKind::House,
        },
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::Rule(RuleKind::NotMonopoly, _)));

    act(&mut g, 0, Action::Unmortgage { space_id: 1 });
    assert_eq!(cash(&g, 0), 1500 - 3);
    act(
        &mut g,
        0,
        Action::Build {
            space_id: 3,
            kind: BuildingKind::House,
        },
    );
    assert_eq!(g.registry.holding(3).unwrap().houses, 1);
}

#[test]
fn skipped_turn_declines_the_purchase() {
    let mut g = classic_game(2, &[(2, 3)]);
    act(&mut g, 0, Action::RollDice);
    let ev = g.transact(skip_turn).unwrap();
    assert!(ev.contains(&GameEvent::PurchaseDeclined {
        space_id: 5,
        player_id: 0,
    }));
    assert_eq!(g.registry.owner_of(5), None);
    assert_eq!(g.current, 1);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
}

#[test]
fn skipped_turn_settles_a_pending_debt() {
    let mut g = stuck_on_income_tax();
    let ev = g.transact(skip_turn).unwrap();
    assert!(ev.contains(&GameEvent::MortgageChanged {
        space_id: 39,
        mortgaged: true,
    }));
    assert!(g.registry.holding(39).unwrap().mortgaged);
    assert_eq!(cash(&g, 0), 100);
    assert_eq!(g.current, 1);
}
