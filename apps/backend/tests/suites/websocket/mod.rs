pub mod game_tests;
pub mod reconnect_tests;
