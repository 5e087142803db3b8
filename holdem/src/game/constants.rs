use super::entities::Chips;

/// Fewest seats a hand can be dealt with.
pub const REQUIRED_PLAYERS: usize = 3;

/// 52 cards cover 5 community cards plus 2 hole cards for 23 seats.
pub const MAX_PLAYERS: usize = 23;

pub const SMALL_BLIND: Chips = 1;
pub const BIG_BLIND: Chips = 2;

/// A raise always lifts the current bet by this much.
pub const RAISE_INCREMENT: Chips = 2;

pub const HOLE_CARDS: usize = 2;
pub const FLOP_CARDS: usize = 3;

pub const MAX_USERNAME_LENGTH: usize = 32;

pub const LAST_MAN_STANDING: &str = "Last man standing";
pub const NO_ONE_WON: &str = "No one won";
