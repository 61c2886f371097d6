pub mod handles;
pub mod lifecycle;
pub mod replay_props;
