pub(crate) mod detector;
pub(crate) mod hand_analysis;
pub(crate) mod rank_groups;
pub(crate) mod straight_info;
pub(crate) mod suit_info;

use crate::cards::Card;
use crate::hand::{validate_deal, Board, HandError, HoleCards};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Poker hand category from weakest (0) to strongest (9).
///
/// Two hands of the same category are equal strength: no kicker or
/// high-card comparison happens inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl HandCategory {
    pub const ALL: [HandCategory; 10] = [
        HandCategory::HighCard,
        HandCategory::OnePair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
        HandCategory::RoyalFlush,
    ];

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<HandCategory> {
        HandCategory::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandCategory::HighCard => "high card",
            HandCategory::OnePair => "one pair",
            HandCategory::TwoPair => "two pair",
            HandCategory::ThreeOfAKind => "three of a kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full house",
            HandCategory::FourOfAKind => "four of a kind",
            HandCategory::StraightFlush => "straight flush",
            HandCategory::RoyalFlush => "royal flush",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("invalid hand: {0}")]
    InvalidHand(#[from] HandError),
    #[error("not enough cards to evaluate: board has {0}, need 5")]
    NotEnoughCards(usize),
}

/// Classify exactly seven cards. The result does not depend on card order.
///
/// ```
/// use poker_tuner::cards::parse_cards;
/// use poker_tuner::evaluator::{evaluate, HandCategory};
///
/// let cards: [_; 7] = parse_cards("As Ks Qs Js Ts 2d 3c").unwrap().try_into().unwrap();
/// assert_eq!(evaluate(&cards), HandCategory::RoyalFlush);
/// ```
pub fn evaluate(cards: &[Card; 7]) -> HandCategory {
    use detector::DETECTORS;
    use hand_analysis::HandAnalysis;

    let analysis = HandAnalysis::new(cards);

    DETECTORS
        .iter()
        .find(|d| d.detect(&analysis))
        .map_or(HandCategory::HighCard, |d| d.category())
}

/// Evaluate a Hold'em hand given hole cards and a complete five-card board.
///
/// ```
/// use poker_tuner::evaluator::{evaluate_holdem, HandCategory};
/// use poker_tuner::hand::{Board, HoleCards};
///
/// let hole: HoleCards = "As Ah".parse().unwrap();
/// let board: Board = "Qc Jd 9h 3s 2c".parse().unwrap();
/// assert_eq!(evaluate_holdem(&hole, &board).unwrap(), HandCategory::OnePair);
/// ```
pub fn evaluate_holdem(hole: &HoleCards, board: &Board) -> Result<HandCategory, EvalError> {
    validate_deal(hole, board)?;
    match board.as_slice() {
        &[b0, b1, b2, b3, b4] => Ok(evaluate(&[hole.first(), hole.second(), b0, b1, b2, b3, b4])),
        other => Err(EvalError::NotEnoughCards(other.len())),
    }
}
