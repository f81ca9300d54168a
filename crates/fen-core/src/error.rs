//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid notation: empty position string")]
    InvalidNotation,

    #[error("Invalid square: {0}")]
    InvalidSquare(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Position is not a legal game state")]
    Unavailable,

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid SAN '{0}'")]
    InvalidSan(String),
}
