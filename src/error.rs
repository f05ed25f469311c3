use crate::{
    dice::Side,
    round::Phase,
};
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a bet is refused. A refused bet leaves balance and held bet
/// untouched.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BetError {
    #[error("betting is closed ({phase})")]
    PhaseNotOpen { phase: Phase },
    #[error("already holding a {held} bet, cannot bet {attempted}")]
    ConflictingSide { held: Side, attempted: Side },
    #[error("insufficient balance (requested={requested}, available={available})")]
    InsufficientBalance { requested: u64, available: u64 },
    #[error("bet amount must be positive")]
    ZeroAmount,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("die face {0} is outside 1..=6")]
    FaceOutOfRange(u8),
    #[error("dice script contains no rolls")]
    EmptyScript,
    #[error("malformed roll '{0}', expected three comma separated faces")]
    MalformedRoll(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
