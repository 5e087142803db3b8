//! Errors raised by the Hold'em engine.
//!
//! The `Display` text of each variant is what a client sees in an outbound
//! `error` envelope, so keep it short and human readable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("invalid starting stack {0}")]
    InvalidStack(i64),
    #[error("table is full")]
    TableFull,
    #[error("game already in progress")]
    AlreadyStarted,
    #[error("not enough players")]
    NotEnoughPlayers,
    #[error("player not in hand")]
    PlayerNotInHand,
    #[error("wrong turn")]
    WrongTurn,
    #[error("invalid action")]
    InvalidAction,
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("invalid card {0:?}")]
    InvalidCard(String),
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: Chips, available: Chips },
    #[error("hand not in progress")]
    HandNotInProgress,
    #[error("hand still in progress")]
    HandStillInProgress,
    #[error("deck exhausted")]
    DeckExhausted,
}
