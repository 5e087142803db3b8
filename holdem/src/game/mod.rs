//! Texas Hold'em rules: cards, hand scoring and the per-hand state machine.
//!
//! Nothing in here knows about connections or tasks. The engine is plain
//! data plus methods; the table layer decides who may call it and when.

pub mod constants;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod eval;

pub use engine::{DisconnectOutcome, TexasHoldem};
pub use errors::GameError;
