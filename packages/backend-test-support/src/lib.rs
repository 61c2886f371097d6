//! Helpers shared by the backend's integration tests.

pub mod logging;
pub mod problem_details;
