// Property: any sequence of legal intents replays to the same room.

use monopoly_backend::domain::legal_actions;
use monopoly_backend::rooms::{RoomIntent, RoomStatus};
use proptest::prelude::*;

use crate::common::proptest_prelude::proptest_prelude_config;
use crate::support::rooms::started_room;

proptest! {
    #![proptest_config(proptest_prelude_config())]

    #[test]
    fn legal_play_replays_identically(
        seed in any::<u64>(),
        players in 2usize..=4,
        picks in prop::collection::vec(any::<u16>(), 1..200),
    ) {
        let (mut room, keys) = started_room(players, seed);

        for pick in picks {
            if room.status() != RoomStatus::InProgress {
                break;
            }
            let (seat, _) = room.awaited().expect("someone is on turn");
            let legal = legal_actions(room.game().expect("game"), seat);
            prop_assert!(!legal.is_empty(), "seat {} has nothing to do", seat);
            let action = legal[usize::from(pick) % legal.len()].clone();
            let name = action.name();
            let applied = room.handle(keys[usize::from(seat)], RoomIntent::Game(action), None);
            prop_assert!(applied.is_ok(), "{} was legal but failed: {:?}", name, applied.err());
            room.game().expect("game").check_invariants().expect("invariants hold");
        }

        let replayed = room.replay().expect("replay");
        prop_assert_eq!(replayed.snapshot(), room.snapshot());
        prop_assert_eq!(replayed.version(), room.version());
    }
}
