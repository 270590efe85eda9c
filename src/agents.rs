//! Agents: strategies that pick an action from a [`DecisionView`].
//!
//! [`EquityPolicy`] is the tunable, equity-driven player. [`Archetype`]
//! covers the simple fixed opponents it is scored against. Both implement
//! [`Strategy`], so a match runner can seat either without knowing which.

use crate::engine::{Action, DecisionView, Street};
use crate::equity::EquityError;
use rand::RngCore;

mod archetypes;
mod policy;

pub use archetypes::Archetype;
pub use policy::{DecisionInputs, DecisionParameters, EquityPolicy};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("no seat named '{0}' in round state")]
    SeatNotFound(String),
    #[error("action '{0}' is not available")]
    MissingAction(&'static str),
    #[error("street {street} does not match {board} community cards")]
    InvalidStreet { street: Street, board: usize },
    #[error(transparent)]
    Equity(#[from] EquityError),
}

/// A seat controller. Implementations hold no per-hand state; all
/// randomness comes from the `rng` the caller passes in.
pub trait Strategy: Send + Sync {
    fn decide(&self, view: &DecisionView, rng: &mut dyn RngCore) -> Result<Action, PolicyError>;

    /// Short label for logs.
    fn label(&self) -> String {
        "strategy".to_string()
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn decide(&self, view: &DecisionView, rng: &mut dyn RngCore) -> Result<Action, PolicyError> {
        (**self).decide(view, rng)
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

/// Fail fast on a view whose board size contradicts its street.
pub(crate) fn check_board(view: &DecisionView) -> Result<(), PolicyError> {
    let street = view.round_state.street;
    let board = view.round_state.community.len();
    if board != street.board_len() {
        return Err(PolicyError::InvalidStreet { street, board });
    }
    Ok(())
}
