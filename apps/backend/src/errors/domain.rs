//! Domain-level error type used by the rules engine and the room layer.
//!
//! This error type is transport-agnostic. HTTP handlers convert it with
//! `From<DomainError> for AppError`; WebSocket sessions turn it into an
//! `error` frame using [`DomainError::code`] and [`DomainError::category`].

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use super::ErrorCode;

/// Malformed or out-of-place intents. State is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    Malformed,
    InvalidSpace,
    InvalidSettings,
    OutOfTurn,
    PhaseMismatch,
    NotHost,
    NotSeated,
    RoomFull,
    GameNotStarted,
    GameAlreadyStarted,
    NotEnoughPlayers,
    PlayersNotReady,
    PlayerBankrupt,
    Other(String),
}

/// Game-rule violations: the intent is well formed but not allowed now.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleKind {
    InsufficientFunds,
    AlreadyOwned,
    NotPurchasable,
    NotOwner,
    NotMonopoly,
    UnevenBuilding,
    SupplyExhausted,
    BuildingsInGroup,
    AlreadyMortgaged,
    NotMortgaged,
    NoJailCard,
    NotInJail,
    InvalidOffer,
    EncumberedProperty,
    Other(String),
}

/// Semantic conflicts: the client acted on a state that no longer holds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    StaleOffer,
    OptimisticLock,
    JoinCodeConflict,
    RoomFrozen,
    RoomLimit,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Player,
    Offer,
    Other(String),
}

/// Coarse error class carried on every `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Validation,
    Rule,
    Conflict,
    NotFound,
    Fatal,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed, out-of-turn or wrong-phase intent
    Validation(ValidationKind, String),
    /// Well-formed intent that breaks a game rule
    Rule(RuleKind, String),
    /// Stale offer or stale state version
    Conflict(ConflictKind, String),
    /// Missing room, player or offer
    NotFound(NotFoundKind, String),
    /// Internal invariant broken; the room must freeze
    Fatal(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Rule(kind, d) => write!(f, "rule {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Fatal(d) => write!(f, "fatal: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn rule(kind: RuleKind, detail: impl Into<String>) -> Self {
        Self::Rule(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn fatal(detail: impl Into<String>) -> Self {
        Self::Fatal(detail.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::Fatal(_))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::Validation(..) => ErrorCategory::Validation,
            DomainError::Rule(..) => ErrorCategory::Rule,
            DomainError::Conflict(..) => ErrorCategory::Conflict,
            DomainError::NotFound(..) => ErrorCategory::NotFound,
            DomainError::Fatal(_) => ErrorCategory::Fatal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Rule(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Fatal(d) => d,
        }
    }

    /// Stable wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::Malformed => ErrorCode::MalformedIntent,
                ValidationKind::InvalidSpace => ErrorCode::InvalidSpace,
                ValidationKind::InvalidSettings => ErrorCode::InvalidSettings,
                ValidationKind::OutOfTurn => ErrorCode::OutOfTurn,
                ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
                ValidationKind::NotHost => ErrorCode::NotHost,
                ValidationKind::NotSeated => ErrorCode::NotSeated,
                ValidationKind::RoomFull => ErrorCode::RoomFull,
                ValidationKind::GameNotStarted => ErrorCode::GameNotStarted,
                ValidationKind::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
                ValidationKind::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
                ValidationKind::PlayersNotReady => ErrorCode::PlayersNotReady,
                ValidationKind::PlayerBankrupt => ErrorCode::PlayerBankrupt,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::Rule(kind, _) => match kind {
                RuleKind::InsufficientFunds => ErrorCode::InsufficientFunds,
                RuleKind::AlreadyOwned => ErrorCode::AlreadyOwned,
                RuleKind::NotPurchasable => ErrorCode::NotPurchasable,
                RuleKind::NotOwner => ErrorCode::NotOwner,
                RuleKind::NotMonopoly => ErrorCode::NotMonopoly,
                RuleKind::UnevenBuilding => ErrorCode::UnevenBuilding,
                RuleKind::SupplyExhausted => ErrorCode::SupplyExhausted,
                RuleKind::BuildingsInGroup => ErrorCode::BuildingsInGroup,
                RuleKind::AlreadyMortgaged => ErrorCode::AlreadyMortgaged,
                RuleKind::NotMortgaged => ErrorCode::NotMortgaged,
                RuleKind::NoJailCard => ErrorCode::NoJailCard,
                RuleKind::NotInJail => ErrorCode::NotInJail,
                RuleKind::InvalidOffer => ErrorCode::InvalidOffer,
                RuleKind::EncumberedProperty => ErrorCode::EncumberedProperty,
                RuleKind::Other(_) => ErrorCode::RuleViolation,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::StaleOffer => ErrorCode::StaleOffer,
                ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                ConflictKind::JoinCodeConflict => ErrorCode::JoinCodeConflict,
                ConflictKind::RoomFrozen => ErrorCode::RoomFrozen,
                ConflictKind::RoomLimit => ErrorCode::RoomLimitReached,
                ConflictKind::Other(_) => ErrorCode::Conflict,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Room => ErrorCode::RoomNotFound,
                NotFoundKind::Player => ErrorCode::PlayerNotFound,
                NotFoundKind::Offer => ErrorCode::OfferNotFound,
                NotFoundKind::Other(_) => ErrorCode::NotFound,
            },
            DomainError::Fatal(_) => ErrorCode::InvariantViolation,
        }
    }
}
