//! Error codes for the Monopoly backend.
//!
//! Every code that can reach a client lives here, whether it travels in an
//! HTTP Problem Details body or a WebSocket `error` frame. Add new codes here;
//! never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Intent validation
    /// Frame could not be parsed or carries impossible values
    MalformedIntent,
    /// Space id outside 0..40
    InvalidSpace,
    /// Room settings out of range
    InvalidSettings,
    /// Out of turn
    OutOfTurn,
    /// Phase mismatch
    PhaseMismatch,
    /// Only the host may do this
    NotHost,
    /// Connection is not bound to a seat
    NotSeated,
    /// Room has no free seat
    RoomFull,
    GameNotStarted,
    GameAlreadyStarted,
    NotEnoughPlayers,
    PlayersNotReady,
    PlayerBankrupt,
    /// General validation error
    ValidationError,

    // Game rules
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
    /// General rule violation
    RuleViolation,

    // Resource not found
    RoomNotFound,
    PlayerNotFound,
    OfferNotFound,
    NotFound,

    // Conflicts
    StaleOffer,
    OptimisticLock,
    JoinCodeConflict,
    /// Room hit an invariant violation and accepts no more mutations
    RoomFrozen,
    /// Server is at its configured room limit
    RoomLimitReached,
    Conflict,

    // System errors
    InvariantViolation,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Intent validation
            Self::MalformedIntent => "MALFORMED_INTENT",
            Self::InvalidSpace => "INVALID_SPACE",
            Self::InvalidSettings => "INVALID_SETTINGS",
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::NotHost => "NOT_HOST",
            Self::NotSeated => "NOT_SEATED",
            Self::RoomFull => "ROOM_FULL",
            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::PlayersNotReady => "PLAYERS_NOT_READY",
            Self::PlayerBankrupt => "PLAYER_BANKRUPT",
            Self::ValidationError => "VALIDATION_ERROR",

            // Game rules
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::AlreadyOwned => "ALREADY_OWNED",
            Self::NotPurchasable => "NOT_PURCHASABLE",
            Self::NotOwner => "NOT_OWNER",
            Self::NotMonopoly => "NOT_MONOPOLY",
            Self::UnevenBuilding => "UNEVEN_BUILDING",
            Self::SupplyExhausted => "SUPPLY_EXHAUSTED",
            Self::BuildingsInGroup => "BUILDINGS_IN_GROUP",
            Self::AlreadyMortgaged => "ALREADY_MORTGAGED",
            Self::NotMortgaged => "NOT_MORTGAGED",
            Self::NoJailCard => "NO_JAIL_CARD",
            Self::NotInJail => "NOT_IN_JAIL",
            Self::InvalidOffer => "INVALID_OFFER",
            Self::EncumberedProperty => "ENCUMBERED_PROPERTY",
            Self::RuleViolation => "RULE_VIOLATION",

            // Resource not found
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::OfferNotFound => "OFFER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Conflicts
            Self::StaleOffer => "STALE_OFFER",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::JoinCodeConflict => "JOIN_CODE_CONFLICT",
            Self::RoomFrozen => "ROOM_FROZEN",
            Self::RoomLimitReached => "ROOM_LIMIT_REACHED",
            Self::Conflict => "CONFLICT",

            // System errors
            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
