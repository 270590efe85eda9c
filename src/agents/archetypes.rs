use super::{check_board, PolicyError, Strategy};
use crate::cards::Rank;
use crate::engine::{Action, DecisionView, RaiseAmount, ValidAction};
use crate::equity::{EquityError, EquityEstimator};
use crate::hand::{Board, HoleCards};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed opponents used as a scoring roster. None of them adapt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Archetype {
    AlwaysCall,
    /// Minimum (or fixed) raise whenever raising is legal, else call.
    AlwaysRaise,
    /// Uniform over the legal actions; raise amounts uniform in range.
    Random,
    /// Plays suited, paired and high-card hands, raising some of them.
    Loose,
    /// Raises premium pairs, calls suited broadway, folds the rest.
    Tight,
    /// Raise at `raise_threshold` equity, call at `call_threshold`, else fold.
    EquityThreshold { call_threshold: f64, raise_threshold: f64, trials: u32 },
}

impl Archetype {
    pub fn equity_threshold() -> Self {
        Archetype::EquityThreshold { call_threshold: 0.5, raise_threshold: 0.7, trials: 100 }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::AlwaysCall => "always-call",
            Archetype::AlwaysRaise => "always-raise",
            Archetype::Random => "random",
            Archetype::Loose => "loose",
            Archetype::Tight => "tight",
            Archetype::EquityThreshold { .. } => "equity-threshold",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Strategy for Archetype {
    fn decide(&self, view: &DecisionView, rng: &mut dyn RngCore) -> Result<Action, PolicyError> {
        let valid = &view.valid_actions;
        let raise_or_call = |raise: bool| {
            if raise && valid.raise().is_some() {
                Action::Raise(None)
            } else {
                Action::Call
            }
        };

        let action = match *self {
            Archetype::AlwaysCall => Action::Call,
            Archetype::AlwaysRaise => raise_or_call(true),
            Archetype::Random => random_action(valid.as_slice(), rng),
            Archetype::Loose => {
                let hole = &view.hole;
                if hole.is_suited() || hole.is_pair() {
                    raise_or_call(rng.random_bool(0.5))
                } else if has_broadway(hole) {
                    raise_or_call(rng.random_bool(0.25))
                } else {
                    Action::Fold
                }
            }
            Archetype::Tight => {
                let hole = &view.hole;
                if hole.is_pair() && hole.first().rank() >= Rank::Queen {
                    raise_or_call(true)
                } else if hole.is_suited() && both_broadway(hole) {
                    Action::Call
                } else {
                    Action::Fold
                }
            }
            Archetype::EquityThreshold { call_threshold, raise_threshold, trials } => {
                check_board(view)?;
                let estimator = EquityEstimator::new(trials)?;
                let board =
                    Board::try_new(view.round_state.community.clone()).map_err(EquityError::from)?;
                let equity =
                    estimator.estimate(&view.hole, &board, view.round_state.contesting(), rng)?;
                if equity >= raise_threshold && valid.raise().is_some() {
                    Action::Raise(None)
                } else if equity >= call_threshold && valid.call_amount().is_some() {
                    Action::Call
                } else {
                    Action::Fold
                }
            }
        };
        Ok(action)
    }

    fn label(&self) -> String {
        self.name().to_string()
    }
}

fn has_broadway(hole: &HoleCards) -> bool {
    hole.first().rank().is_broadway() || hole.second().rank().is_broadway()
}

fn both_broadway(hole: &HoleCards) -> bool {
    hole.first().rank().is_broadway() && hole.second().rank().is_broadway()
}

fn random_action(valid: &[ValidAction], rng: &mut dyn RngCore) -> Action {
    if valid.is_empty() {
        return Action::Call;
    }
    match valid[rng.random_range(0..valid.len())] {
        ValidAction::Fold => Action::Fold,
        ValidAction::Call { .. } => Action::Call,
        ValidAction::Raise { amount: RaiseAmount::Fixed(_) } => Action::Raise(None),
        ValidAction::Raise { amount: RaiseAmount::Range { min, max } } => {
            Action::Raise(Some(rng.random_range(min..=max.max(min))))
        }
    }
}
