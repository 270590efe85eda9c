// Narrow adapter between the betting policies and whatever runs the table.
// Strategies only ever see these types, never the table engine's internals.

use crate::cards::Card;
use crate::hand::HoleCards;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Betting round. The index doubles as the slot in a per-street parameter array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }

    /// Number of community cards visible during this street.
    pub const fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown street: '{0}'")]
pub struct StreetParseError(pub String);

impl FromStr for Street {
    type Err = StreetParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Street::ALL
            .into_iter()
            .find(|st| st.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StreetParseError(s.to_string()))
    }
}

/// Raise offer: either one fixed total or a `[min, max]` range of totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaiseAmount {
    Fixed(u64),
    Range { min: u64, max: u64 },
}

impl RaiseAmount {
    /// Smallest legal raise-to amount.
    pub fn min(self) -> u64 {
        match self {
            RaiseAmount::Fixed(v) => v,
            RaiseAmount::Range { min, .. } => min,
        }
    }

    pub fn max(self) -> u64 {
        match self {
            RaiseAmount::Fixed(v) => v,
            RaiseAmount::Range { max, .. } => max,
        }
    }

    pub fn contains(self, amount: u64) -> bool {
        (self.min()..=self.max()).contains(&amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ValidAction {
    Fold,
    Call { amount: u64 },
    Raise { amount: RaiseAmount },
}

/// Actions legally available to the player on turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidActions(Vec<ValidAction>);

impl ValidActions {
    pub fn new(actions: Vec<ValidAction>) -> Self {
        Self(actions)
    }

    pub fn as_slice(&self) -> &[ValidAction] {
        &self.0
    }

    pub fn can_fold(&self) -> bool {
        self.0.iter().any(|a| matches!(a, ValidAction::Fold))
    }

    /// Amount needed to call, or `None` when calling is not offered.
    pub fn call_amount(&self) -> Option<u64> {
        self.0.iter().find_map(|a| match a {
            ValidAction::Call { amount } => Some(*amount),
            _ => None,
        })
    }

    pub fn raise(&self) -> Option<RaiseAmount> {
        self.0.iter().find_map(|a| match a {
            ValidAction::Raise { amount } => Some(*amount),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatState {
    Participating,
    AllIn,
    Folded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub name: String,
    pub stack: u64,
    pub state: SeatState,
}

/// Public table state at the moment of a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub street: Street,
    pub main_pot: u64,
    pub community: Vec<Card>,
    pub seats: Vec<SeatInfo>,
}

impl RoundState {
    pub fn seat(&self, name: &str) -> Option<&SeatInfo> {
        self.seats.iter().find(|s| s.name == name)
    }

    /// Seats still holding cards in this hand.
    pub fn contesting(&self) -> usize {
        self.seats.iter().filter(|s| !matches!(s.state, SeatState::Folded)).count()
    }
}

/// Everything a strategy is shown when it is asked to act.
#[derive(Debug, Clone)]
pub struct DecisionView {
    pub player: String,
    pub hole: HoleCards,
    pub valid_actions: ValidActions,
    pub round_state: RoundState,
}

/// Action token returned to the table.
/// `Raise(None)` means the offered fixed amount, or the minimum of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Call,
    Raise(Option<u64>),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => f.write_str("fold"),
            Action::Call => f.write_str("call"),
            Action::Raise(None) => f.write_str("raise"),
            Action::Raise(Some(v)) => write!(f, "raise {v}"),
        }
    }
}

/// Result of one full match between two named players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner(String),
    Draw,
}

impl MatchOutcome {
    /// Decide by final stacks; equal stacks are a draw.
    pub fn from_stacks(a: (&str, u64), b: (&str, u64)) -> Self {
        match a.1.cmp(&b.1) {
            std::cmp::Ordering::Greater => MatchOutcome::Winner(a.0.to_string()),
            std::cmp::Ordering::Less => MatchOutcome::Winner(b.0.to_string()),
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    pub fn is_win_for(&self, name: &str) -> bool {
        matches!(self, MatchOutcome::Winner(w) if w == name)
    }
}

/// Plays a complete match between two strategies.
pub trait MatchSimulator: Send + Sync {
    fn play(
        &self,
        hero: (&str, &dyn crate::agents::Strategy),
        villain: (&str, &dyn crate::agents::Strategy),
        rng: &mut dyn RngCore,
    ) -> Result<MatchOutcome, crate::arena::MatchError>;
}
