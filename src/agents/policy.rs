use super::{check_board, PolicyError, Strategy};
use crate::engine::{Action, DecisionView, RaiseAmount, Street, ValidActions};
use crate::equity::{EquityError, EquityEstimator};
use crate::hand::Board;
use log::trace;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Tunable knobs of [`EquityPolicy`]. All values are expected in `[0, 1]`;
/// the optimizer clamps them, the policy does not check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionParameters {
    /// Minimum equity to raise, indexed by [`Street::index`].
    pub aggression_thresholds: [f64; 4],
    /// Required edge of equity over pot odds before calling.
    pub call_threshold_margin: f64,
    pub bluff_probability: f64,
    /// Share of the own stack aimed for when sizing a raise.
    pub raise_stack_fraction: f64,
}

impl Default for DecisionParameters {
    fn default() -> Self {
        Self {
            aggression_thresholds: [0.70, 0.60, 0.57, 0.53],
            call_threshold_margin: 0.045,
            bluff_probability: 0.04,
            raise_stack_fraction: 0.55,
        }
    }
}

impl DecisionParameters {
    pub fn with_aggression_thresholds(mut self, thresholds: [f64; 4]) -> Self {
        self.aggression_thresholds = thresholds;
        self
    }

    pub fn with_call_threshold_margin(mut self, margin: f64) -> Self {
        self.call_threshold_margin = margin;
        self
    }

    pub fn with_bluff_probability(mut self, p: f64) -> Self {
        self.bluff_probability = p;
        self
    }

    pub fn with_raise_stack_fraction(mut self, fraction: f64) -> Self {
        self.raise_stack_fraction = fraction;
        self
    }

    pub fn aggression_threshold(&self, street: Street) -> f64 {
        self.aggression_thresholds[street.index()]
    }
}

/// The numbers a decision depends on once equity is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    pub equity: f64,
    pub street: Street,
    pub pot: u64,
    pub stack: u64,
}

/// Fold, call or raise from Monte Carlo equity against pot odds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPolicy {
    params: DecisionParameters,
    estimator: EquityEstimator,
}

impl EquityPolicy {
    pub fn new(params: DecisionParameters) -> Self {
        Self { params, estimator: EquityEstimator::default() }
    }

    pub fn with_estimator(mut self, estimator: EquityEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn params(&self) -> &DecisionParameters {
        &self.params
    }

    /// Decision rule given an already estimated equity.
    ///
    /// Folds when `equity - pot_odds < call_threshold_margin`. Otherwise raises
    /// when raising is offered and either equity reaches the street's
    /// aggression threshold or the bluff draw hits; calls in every other case.
    ///
    /// ```
    /// use poker_tuner::agents::{DecisionInputs, DecisionParameters, EquityPolicy};
    /// use poker_tuner::engine::{Action, RaiseAmount, Street, ValidAction, ValidActions};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let policy = EquityPolicy::new(
    ///     DecisionParameters::default().with_bluff_probability(0.0),
    /// );
    /// let valid = ValidActions::new(vec![
    ///     ValidAction::Fold,
    ///     ValidAction::Call { amount: 20 },
    ///     ValidAction::Raise { amount: RaiseAmount::Range { min: 40, max: 1000 } },
    /// ]);
    /// let inputs = DecisionInputs { equity: 0.40, street: Street::Preflop, pot: 100, stack: 1000 };
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// assert_eq!(policy.act_on_equity(inputs, &valid, &mut rng).unwrap(), Action::Call);
    /// ```
    pub fn act_on_equity(
        &self,
        inputs: DecisionInputs,
        valid: &ValidActions,
        rng: &mut dyn RngCore,
    ) -> Result<Action, PolicyError> {
        let call_amount = valid.call_amount().unwrap_or(0);
        let pot_odds = if call_amount == 0 {
            0.0
        } else {
            call_amount as f64 / (inputs.pot + call_amount) as f64
        };

        if inputs.equity - pot_odds < self.params.call_threshold_margin {
            if !valid.can_fold() {
                return Err(PolicyError::MissingAction("fold"));
            }
            return Ok(Action::Fold);
        }

        if let Some(raise) = valid.raise() {
            let strong = inputs.equity >= self.params.aggression_threshold(inputs.street);
            if strong || rng.random::<f64>() < self.params.bluff_probability {
                return Ok(Action::Raise(self.raise_size(raise, inputs)));
            }
        }

        if valid.call_amount().is_none() {
            return Err(PolicyError::MissingAction("call"));
        }
        Ok(Action::Call)
    }

    /// `min(fraction * stack, 0.8 * pot, max)`, lifted to the minimum raise.
    fn raise_size(&self, raise: RaiseAmount, inputs: DecisionInputs) -> Option<u64> {
        match raise {
            RaiseAmount::Fixed(_) => None,
            RaiseAmount::Range { min, max } => {
                let target = (self.params.raise_stack_fraction * inputs.stack as f64)
                    .min(0.8 * inputs.pot as f64)
                    .min(max as f64);
                Some((target as u64).max(min))
            }
        }
    }
}

impl Strategy for EquityPolicy {
    fn decide(&self, view: &DecisionView, rng: &mut dyn RngCore) -> Result<Action, PolicyError> {
        check_board(view)?;
        let state = &view.round_state;
        let stack = state
            .seat(&view.player)
            .ok_or_else(|| PolicyError::SeatNotFound(view.player.clone()))?
            .stack;
        let board = Board::try_new(state.community.clone()).map_err(EquityError::from)?;
        let equity = self.estimator.estimate(&view.hole, &board, state.contesting(), rng)?;

        let inputs = DecisionInputs { equity, street: state.street, pot: state.main_pot, stack };
        let action = self.act_on_equity(inputs, &view.valid_actions, rng)?;
        trace!(
            "{} {} equity={equity:.3} pot={} stack={stack} -> {action}",
            view.player,
            state.street,
            state.main_pot
        );
        Ok(action)
    }

    fn label(&self) -> String {
        "equity-policy".to_string()
    }
}
