use crate::domain::actions::Action;
use crate::domain::cards::DeckKind;
use crate::domain::deck::Deck;
use crate::domain::events::GameEvent;
use crate::domain::ledger::JailState;
use crate::domain::settings::Edition;
use crate::domain::state::{GameState, TurnPhase};
use crate::domain::test_state_helpers::{act, cash, classic_game, try_act};
use crate::domain::turn::skip_turn;
use crate::errors::domain::{DomainError, RuleKind, ValidationKind};

fn jailed_at_turn_start(rolls: &[(u8, u8)]) -> GameState {
    let mut g = classic_game(2, rolls);
    g.ledger.send_to_jail(0).unwrap();
    g.phase = TurnPhase::InJail;
    g
}

fn bail_payments(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::Payment {
                    from: Some(0),
                    to: None,
                    amount: 50
                }
            )
        })
        .count()
}

#[test]
fn three_failed_attempts_release_with_bail_charged_once() {
    let mut g = jailed_at_turn_start(&[(1, 2), (1, 3), (1, 2), (2, 3), (1, 2)]);
    let mut all = Vec::new();

    all.extend(act(&mut g, 0, Action::RollDice));
    assert_eq!(g.ledger.player(0).unwrap().jail, JailState::InJail { turns_remaining: 2 });
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);
    act(&mut g, 0, Action::EndTurn);
    act(&mut g, 1, Action::RollDice); // Income Tax
    act(&mut g, 1, Action::EndTurn);

    assert_eq!(g.phase, TurnPhase::InJail);
    all.extend(act(&mut g, 0, Action::RollDice));
    assert_eq!(g.ledger.player(0).unwrap().jail, JailState::InJail { turns_remaining: 1 });
    act(&mut g, 0, Action::EndTurn);
    act(&mut g, 1, Action::RollDice); // Connecticut Avenue
    act(&mut g, 1, Action::DeclinePurchase);
    act(&mut g, 1, Action::EndTurn);

    all.extend(act(&mut g, 0, Action::RollDice));
    let a = g.ledger.player(0).unwrap();
    assert_eq!(a.jail, JailState::Free);
    assert_eq!(a.position, 13);
    assert_eq!(a.cash, 1450);
    assert_eq!(bail_payments(&all), 1);
    assert_eq!(g.phase, TurnPhase::AwaitingPurchaseDecision { space_id: 13 });
}

#[test]
fn doubles_release_without_extra_roll() {
    let mut g = jailed_at_turn_start(&[(3, 3)]);
    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.contains(&GameEvent::JailChanged {
        player_id: 0,
        in_jail: false,
    }));
    assert_eq!(g.ledger.player(0).unwrap().position, 16);
    act(&mut g, 0, Action::DeclinePurchase);
    assert_eq!(g.phase, TurnPhase::AwaitingTurnEnd);
    assert_eq!(bail_payments(&ev), 0);
}

#[test]
fn paying_bail_frees_before_rolling() {
    let mut g = jailed_at_turn_start(&[(1, 2)]);
    act(&mut g, 0, Action::PayBail);
    assert_eq!(cash(&g, 0), 1450);
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
    act(&mut g, 0, Action::RollDice);
    assert_eq!(g.ledger.player(0).unwrap().position, 13);

    let err = try_act(&mut g, 0, Action::PayBail).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));
}

#[test]
fn jail_card_is_kept_then_returned_to_its_deck() {
    let mut g = classic_game(2, &[(3, 4), (1, 2), (1, 2)]);
    g.chance = Deck::stacked(Edition::Classic, DeckKind::Chance, 8);

    let ev = act(&mut g, 0, Action::RollDice);
    assert!(ev.iter().any(|e| matches!(e, GameEvent::CardDrawn { card, .. } if card.id == 8)));
    assert_eq!(g.ledger.player(0).unwrap().jail_cards.len(), 1);
    assert_eq!(g.chance.withheld(), &[8]);
    assert_eq!(g.chance.len(), 15);
    act(&mut g, 0, Action::EndTurn);
    act(&mut g, 1, Action::RollDice);
    act(&mut g, 1, Action::DeclinePurchase);
    act(&mut g, 1, Action::EndTurn);

    // Locked up later in the game.
    g.ledger.send_to_jail(0).unwrap();
    g.phase = TurnPhase::InJail;
    act(&mut g, 0, Action::UseJailCard);
    assert!(g.ledger.player(0).unwrap().jail_cards.is_empty());
    assert!(g.chance.withheld().is_empty());
    assert_eq!(g.chance.pile().last(), Some(&8));
    assert_eq!(g.phase, TurnPhase::AwaitingRoll);
    assert_eq!(cash(&g, 0), 1500);
}

#[test]
fn using_a_card_without_one_fails() {
    let mut g = jailed_at_turn_start(&[]);
    let err = try_act(&mut g, 0, Action::UseJailCard).unwrap_err();
    assert!(matches!(err, DomainError::Rule(RuleKind::NoJailCard, _)));
    assert!(g.ledger.player(0).unwrap().in_jail());
}

#[test]
fn skipped_turns_in_jail_use_up_attempts_then_take_bail() {
    let mut g = jailed_at_turn_start(&[]);
    let mut all = Vec::new();

    all.extend(g.transact(skip_turn).unwrap());
    assert_eq!(g.ledger.player(0).unwrap().jail, JailState::InJail { turns_remaining: 2 });
    g.transact(skip_turn).unwrap();
    assert_eq!(g.phase, TurnPhase::InJail);
    all.extend(g.transact(skip_turn).unwrap());
    assert_eq!(g.ledger.player(0).unwrap().jail, JailState::InJail { turns_remaining: 1 });
    g.transact(skip_turn).unwrap();

    all.extend(g.transact(skip_turn).unwrap());
    let a = g.ledger.player(0).unwrap();
    assert_eq!(a.jail, JailState::Free);
    assert_eq!(a.position, 10);
    assert_eq!(cash(&g, 0), 1450);
    assert_eq!(bail_payments(&all), 1);
    assert!(!all.iter().any(|e| matches!(e, GameEvent::DiceRolled { .. })));
    assert_eq!(g.current, 1);
}
