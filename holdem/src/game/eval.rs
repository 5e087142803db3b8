//! Hand scoring.
//!
//! Five-card hands are scored into a [`HandStrength`] whose ordering is the
//! poker ordering of hands: a greater strength is a better hand. Larger card
//! pools (hole cards plus board) are scored by trying every 5-card subset.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entities::{Card, Value};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::OnePair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
        };
        write!(f, "{repr}")
    }
}

/// Rank first, then the tie-breaking card values in significance order
/// (grouped cards before kickers, higher groups first).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HandStrength {
    pub rank: Rank,
    pub values: Vec<Value>,
}

/// Scores exactly five cards.
pub fn eval(hand: &[Card]) -> HandStrength {
    debug_assert_eq!(hand.len(), 5);

    let mut values: Vec<Value> = hand.iter().map(|card| card.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = hand.iter().all(|card| card.1 == hand[0].1);
    let straight = straight_high(&values);

    // (count, value) pairs, biggest groups first, then highest value.
    let mut groups: Vec<(usize, Value)> = Vec::with_capacity(5);
    for &value in &values {
        let n = groups.len();
        if n > 0 && groups[n - 1].1 == value {
            groups[n - 1].0 += 1;
        } else {
            groups.push((1, value));
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let largest = groups[0].0;
    let second = groups.get(1).map_or(0, |g| g.0);
    let rank = match (straight, is_flush) {
        (Some(_), true) => Rank::StraightFlush,
        _ if largest == 4 => Rank::FourOfAKind,
        _ if largest == 3 && second == 2 => Rank::FullHouse,
        (_, true) => Rank::Flush,
        (Some(_), false) => Rank::Straight,
        _ if largest == 3 => Rank::ThreeOfAKind,
        _ if largest == 2 && second == 2 => Rank::TwoPair,
        _ if largest == 2 => Rank::OnePair,
        _ => Rank::HighCard,
    };

    let values = match (rank, straight) {
        (Rank::Straight | Rank::StraightFlush, Some(high)) => vec![high],
        _ => groups.iter().map(|&(_, value)| value).collect(),
    };

    HandStrength { rank, values }
}

/// High card of a straight, if the descending values form one. The wheel
/// (A-2-3-4-5) is a five-high straight.
fn straight_high(desc: &[Value]) -> Option<Value> {
    if desc.windows(2).all(|w| w[0] == w[1] + 1) {
        return Some(desc[0]);
    }
    if desc == [14, 5, 4, 3, 2].as_slice() {
        return Some(5);
    }
    None
}

/// Best 5-card hand out of `cards`, found by scoring every 5-card subset
/// (21 subsets for 2 hole + 5 community cards). On equal strength the first
/// subset found is kept. Returns `None` for fewer than five cards.
pub fn best_hand(cards: &[Card]) -> Option<(HandStrength, Vec<Card>)> {
    let n = cards.len();
    if n < 5 || n > 16 {
        return None;
    }

    let mut best: Option<(HandStrength, Vec<Card>)> = None;
    for mask in 0u32..(1 << n) {
        if mask.count_ones() != 5 {
            continue;
        }
        let hand: Vec<Card> = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, card)| *card)
            .collect();
        let strength = eval(&hand);
        if best.as_ref().is_none_or(|(b, _)| strength > *b) {
            best = Some((strength, hand));
        }
    }
    best
}
