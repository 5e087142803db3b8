use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    fmt::{self},
    str::FromStr,
};

use super::{constants, errors::GameError};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a uInt8 value (deuce=2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            10 => "T".to_string(),
            v => v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// Parses the two-character shorthand used by most poker tools,
/// e.g. `"Qs"`, `"Th"`, `"2c"`.
impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidCard(s.to_string());
        let mut chars = s.chars();
        let (Some(v), Some(u), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let value = match v.to_ascii_uppercase() {
            'A' => 14,
            'K' => 13,
            'Q' => 12,
            'J' => 11,
            'T' => 10,
            d @ '2'..='9' => d as u8 - b'0',
            _ => return Err(invalid()),
        };
        let suit = match u.to_ascii_lowercase() {
            'c' => Suit::Club,
            's' => Suit::Spade,
            'd' => Suit::Diamond,
            'h' => Suit::Heart,
            _ => return Err(invalid()),
        };
        Ok(Card(value, suit))
    }
}

/// An ordered, finite deck. Drawn cards are removed and never returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A fresh 52-card deck in random order.
    pub fn shuffled() -> Self {
        let mut deck = Self::default();
        deck.cards.shuffle(&mut rand::rng());
        deck
    }

    /// A deck that deals `cards` front to back. Mostly useful for
    /// reproducing specific hands.
    pub fn stacked(cards: Vec<Card>) -> Self {
        let mut cards = cards;
        cards.reverse();
        Self { cards }
    }

    /// Draws `n` cards without replacement. Either all `n` cards are drawn
    /// or the deck is left untouched.
    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, GameError> {
        if self.cards.len() < n {
            return Err(GameError::DeckExhausted);
        }
        let split = self.cards.len() - n;
        let mut drawn = self.cards.split_off(split);
        drawn.reverse();
        Ok(drawn)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = Vec::with_capacity(52);
        for value in 2u8..=14u8 {
            for suit in Suit::ALL {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }
}

/// Type alias for whole chips. Stacks, bets and the pot are all
/// represented as whole chips.
pub type Chips = u32;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        if let Some((idx, _)) = username.char_indices().nth(constants::MAX_USERNAME_LENGTH) {
            username.truncate(idx);
        }
        Self(username)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Username {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Username {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The four betting phases of a hand. Rounds only ever move forward.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    #[default]
    PreFlop,
    Flop,
    Turn,
    River,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Call,
    Raise,
    Check,
    Fold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Call => "calls",
            Self::Raise => "raises",
            Self::Check => "checks",
            Self::Fold => "folds",
        };
        write!(f, "{repr}")
    }
}

/// Decodes the textual action carried by an inbound `action` envelope.
/// Anything but the four known names is rejected.
impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(Self::Call),
            "raise" => Ok(Self::Raise),
            "check" => Ok(Self::Check),
            "fold" => Ok(Self::Fold),
            other => Err(GameError::UnknownAction(other.to_string())),
        }
    }
}

/// One seat in a hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub name: Username,
    pub hole_cards: Vec<Card>,
    pub stack: Chips,
    pub bet: Chips,
    pub last_action: Option<Action>,
    pub active: bool,
}

impl Player {
    pub fn new(name: Username, stack: Chips) -> Self {
        Self {
            name,
            hole_cards: Vec::new(),
            stack,
            bet: 0,
            last_action: None,
            active: false,
        }
    }
}

/// What a single viewer is allowed to see of a hand. This is the payload
/// of outbound `state` envelopes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HandView {
    pub community_cards: Vec<Card>,
    pub players: Vec<Player>,
    pub round: Round,
    pub current_player: usize,
    pub current_bet: Chips,
    pub pot: Chips,
    pub started: bool,
    pub game_over: bool,
    pub winner: Option<Username>,
    pub best_rank: Option<String>,
    pub best_hand: Vec<Card>,
}
