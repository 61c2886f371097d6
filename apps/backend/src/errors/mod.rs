//! Error handling for the Monopoly backend.

pub mod domain;
pub mod error_code;

pub use domain::{
    ConflictKind, DomainError, ErrorCategory, NotFoundKind, RuleKind, ValidationKind,
};
pub use error_code::ErrorCode;
