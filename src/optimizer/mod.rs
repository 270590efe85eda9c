//! Local search over [`DecisionParameters`].
//!
//! One loop drives both searches: pick a dimension, perturb it by a bounded
//! random step, clamp and round, score the candidate, then let an
//! [`AcceptanceRule`] decide. [`HillClimbing`] accepts only improvements and
//! adapts per-dimension step sizes; [`SimulatedAnnealing`] accepts worse
//! candidates with probability `exp(delta / temperature)` and cools
//! geometrically.
//!
//! ```
//! use poker_tuner::agents::DecisionParameters;
//! use poker_tuner::arena::ScoreError;
//! use poker_tuner::optimizer::{
//!     Bounds, HillClimbConfig, HillClimbing, MemorySink, Optimizer, Param, SearchSpace, Start,
//! };
//! use rand::SeedableRng;
//! use rand::RngCore;
//! use rand_chacha::ChaCha8Rng;
//!
//! // Higher bluff probability scores better.
//! let scorer = |p: &DecisionParameters, _: &mut dyn RngCore| -> Result<f64, ScoreError> {
//!     Ok(p.bluff_probability)
//! };
//! let space = SearchSpace::single(
//!     Param::BluffProbability,
//!     Bounds::new(0.0, 0.5),
//!     Start::Value(0.1),
//! );
//! let mut sink = MemorySink::default();
//! let outcome = Optimizer::new(space, HillClimbing::new(HillClimbConfig::default()), &scorer)
//!     .with_iterations(50)
//!     .run(DecisionParameters::default(), &mut ChaCha8Rng::seed_from_u64(1), &mut sink)
//!     .unwrap();
//! assert!(outcome.best_score >= 0.1);
//! assert_eq!(sink.records.len(), 51);
//! ```

mod annealing;
mod hill_climb;
pub mod record;

pub use annealing::{
    AnnealingConfig, AnnealingPlan, AnnealingPreset, PresetParseError, SimulatedAnnealing,
};
pub use hill_climb::{HillClimbConfig, HillClimbing};
pub use record::{
    IterationOutcome, IterationRecord, JsonLinesSink, LogSink, MemorySink, RecordError,
    RecordSink, Tee,
};

use crate::agents::DecisionParameters;
use crate::arena::{ScoreError, Scorer};
use log::{debug, info};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum OptimizerError {
    #[error("search space has no dimensions")]
    EmptySearchSpace,
    #[error("invalid bounds for {param}: [{min}, {max}]")]
    InvalidBounds { param: Param, min: f64, max: f64 },
    #[error("no such parameter: {0}")]
    UnknownParam(Param),
    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// One tunable scalar of [`DecisionParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    AggressionThreshold(usize),
    CallThresholdMargin,
    RaiseStackFraction,
    BluffProbability,
}

impl Param {
    pub const ALL: [Param; 7] = [
        Param::AggressionThreshold(0),
        Param::AggressionThreshold(1),
        Param::AggressionThreshold(2),
        Param::AggressionThreshold(3),
        Param::CallThresholdMargin,
        Param::RaiseStackFraction,
        Param::BluffProbability,
    ];

    pub fn get(self, params: &DecisionParameters) -> Option<f64> {
        match self {
            Param::AggressionThreshold(i) => params.aggression_thresholds.get(i).copied(),
            Param::CallThresholdMargin => Some(params.call_threshold_margin),
            Param::RaiseStackFraction => Some(params.raise_stack_fraction),
            Param::BluffProbability => Some(params.bluff_probability),
        }
    }

    pub fn set(self, params: &mut DecisionParameters, value: f64) -> Result<(), OptimizerError> {
        match self {
            Param::AggressionThreshold(i) => {
                let slot = params
                    .aggression_thresholds
                    .get_mut(i)
                    .ok_or(OptimizerError::UnknownParam(self))?;
                *slot = value;
            }
            Param::CallThresholdMargin => params.call_threshold_margin = value,
            Param::RaiseStackFraction => params.raise_stack_fraction = value,
            Param::BluffProbability => params.bluff_probability = value,
        }
        Ok(())
    }

    /// Thresholds share one group so every index counts as a single choice.
    fn group(self) -> u8 {
        match self {
            Param::AggressionThreshold(_) => 0,
            Param::CallThresholdMargin => 1,
            Param::RaiseStackFraction => 2,
            Param::BluffProbability => 3,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::AggressionThreshold(i) => write!(f, "aggression_threshold[{i}]"),
            Param::CallThresholdMargin => f.write_str("call_threshold_margin"),
            Param::RaiseStackFraction => f.write_str("raise_stack_fraction"),
            Param::BluffProbability => f.write_str("bluff_probability"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Where a dimension begins the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Start {
    /// Whatever the base parameters hold, clamped into bounds.
    Keep,
    Lower,
    Value(f64),
    Uniform(Bounds),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub param: Param,
    pub bounds: Bounds,
    pub start: Start,
}

/// The dimensions a search may move, with their bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub dimensions: Vec<Dimension>,
}

/// Round to three decimals, the resolution candidates are explored at.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl SearchSpace {
    pub fn single(param: Param, bounds: Bounds, start: Start) -> Self {
        Self { dimensions: vec![Dimension { param, bounds, start }] }
    }

    /// Every scalar, thresholds in `[0.01, 0.99]` and the rest in
    /// `[0.001, 0.999]`, starting from a random point.
    pub fn hill_climb() -> Self {
        let thresholds = Bounds::new(0.01, 0.99);
        let scalars = Bounds::new(0.001, 0.999);
        let mut dimensions: Vec<Dimension> = (0..4)
            .map(|i| Dimension {
                param: Param::AggressionThreshold(i),
                bounds: thresholds,
                start: Start::Uniform(Bounds::new(0.4, 0.9)),
            })
            .collect();
        dimensions.extend([
            Dimension {
                param: Param::CallThresholdMargin,
                bounds: scalars,
                start: Start::Uniform(Bounds::new(0.01, 0.2)),
            },
            Dimension {
                param: Param::RaiseStackFraction,
                bounds: scalars,
                start: Start::Uniform(Bounds::new(0.2, 0.9)),
            },
            Dimension {
                param: Param::BluffProbability,
                bounds: scalars,
                start: Start::Uniform(Bounds::new(0.0, 0.2)),
            },
        ]);
        Self { dimensions }
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn validate(&self) -> Result<(), OptimizerError> {
        if self.dimensions.is_empty() {
            return Err(OptimizerError::EmptySearchSpace);
        }
        for d in &self.dimensions {
            if !d.bounds.is_valid() {
                return Err(OptimizerError::InvalidBounds {
                    param: d.param,
                    min: d.bounds.min,
                    max: d.bounds.max,
                });
            }
            if d.param.get(&DecisionParameters::default()).is_none() {
                return Err(OptimizerError::UnknownParam(d.param));
            }
        }
        Ok(())
    }

    /// Starting point: `base` with every dimension placed per its [`Start`].
    pub fn initial<R: Rng + ?Sized>(
        &self,
        base: DecisionParameters,
        rng: &mut R,
    ) -> Result<DecisionParameters, OptimizerError> {
        let mut params = base;
        for d in &self.dimensions {
            let raw = match d.start {
                Start::Keep => d.param.get(&base).ok_or(OptimizerError::UnknownParam(d.param))?,
                Start::Lower => d.bounds.min,
                Start::Value(v) => v,
                Start::Uniform(range) => rng.random_range(range.min..=range.max),
            };
            d.param.set(&mut params, round3(d.bounds.clamp(raw)))?;
        }
        Ok(params)
    }

    /// Choose a dimension: a parameter group uniformly, then an index within it.
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut groups: Vec<u8> = self.dimensions.iter().map(|d| d.param.group()).collect();
        groups.sort_unstable();
        groups.dedup();
        let group = groups[rng.random_range(0..groups.len())];
        let slots: Vec<usize> = self
            .dimensions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.param.group() == group)
            .map(|(i, _)| i)
            .collect();
        slots[rng.random_range(0..slots.len())]
    }
}

/// Mutable search state, owned by the optimizer loop.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerState {
    pub current_params: DecisionParameters,
    pub current_score: f64,
    pub best_params: DecisionParameters,
    pub best_score: f64,
    /// One per search-space dimension.
    pub step_sizes: Vec<f64>,
    pub temperature: Option<f64>,
    pub iteration: u32,
}

/// The part that differs between hill climbing and annealing.
pub trait AcceptanceRule {
    fn initial_step(&self) -> f64;

    fn initial_temperature(&self) -> Option<f64> {
        None
    }

    /// Half-width of the uniform perturbation for dimension `slot`.
    fn step_size(&self, state: &OptimizerState, slot: usize) -> f64 {
        state.step_sizes[slot]
    }

    fn accept(&self, state: &OptimizerState, candidate_score: f64, rng: &mut dyn RngCore) -> bool;

    /// Adjust steps or temperature once the decision is made.
    fn update(&self, state: &mut OptimizerState, slot: usize, accepted: bool);

    fn outcome(&self, state: &OptimizerState, accepted: bool) -> IterationOutcome;
}

/// Shared flag checked between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerOutcome {
    pub best_params: DecisionParameters,
    pub best_score: f64,
    pub iterations_run: u32,
    pub cancelled: bool,
}

pub struct Optimizer<'a, A, S: ?Sized> {
    space: SearchSpace,
    rule: A,
    scorer: &'a S,
    iterations: u32,
    cancel: CancelToken,
}

impl<'a, A: AcceptanceRule, S: Scorer + ?Sized> Optimizer<'a, A, S> {
    pub fn new(space: SearchSpace, rule: A, scorer: &'a S) -> Self {
        Self { space, rule, scorer, iterations: 100, cancel: CancelToken::default() }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the search from `base`. Every iteration, the scored starting point
    /// included, goes to `sink`.
    pub fn run(
        &self,
        base: DecisionParameters,
        rng: &mut dyn RngCore,
        sink: &mut dyn RecordSink,
    ) -> Result<OptimizerOutcome, OptimizerError> {
        self.space.validate()?;
        let start = self.space.initial(base, rng)?;
        let start_score = self.scorer.score(&start, rng)?;
        let mut state = OptimizerState {
            current_params: start,
            current_score: start_score,
            best_params: start,
            best_score: start_score,
            step_sizes: vec![self.rule.initial_step(); self.space.len()],
            temperature: self.rule.initial_temperature(),
            iteration: 0,
        };
        info!("search start: {} dimensions, score {start_score:.4}", self.space.len());
        sink.record(&IterationRecord {
            iteration: 0,
            change: None,
            candidate_score: start_score,
            score: start_score,
            outcome: self.rule.outcome(&state, true),
            params: start,
        })?;

        let mut cancelled = false;
        while state.iteration < self.iterations {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            state.iteration += 1;

            let slot = self.space.pick(rng);
            let dim = self.space.dimensions[slot];
            let step = self.rule.step_size(&state, slot);
            let old = dim
                .param
                .get(&state.current_params)
                .ok_or(OptimizerError::UnknownParam(dim.param))?;
            let value = round3(dim.bounds.clamp(old + rng.random_range(-step..=step)));
            let mut candidate = state.current_params;
            dim.param.set(&mut candidate, value)?;

            let score = self.scorer.score(&candidate, rng)?;
            let accepted = self.rule.accept(&state, score, rng);
            debug!("candidate {} = {value:.3}: score {score:.4}, accepted {accepted}", dim.param);
            if accepted {
                state.current_params = candidate;
                state.current_score = score;
                if score > state.best_score {
                    state.best_params = candidate;
                    state.best_score = score;
                }
            }
            self.rule.update(&mut state, slot, accepted);

            sink.record(&IterationRecord {
                iteration: state.iteration,
                change: Some((dim.param, value)),
                candidate_score: score,
                score: state.current_score,
                outcome: self.rule.outcome(&state, accepted),
                params: state.current_params,
            })?;
        }

        info!(
            "search done after {} iterations: best score {:.4}{}",
            state.iteration,
            state.best_score,
            if cancelled { " (cancelled)" } else { "" }
        );
        Ok(OptimizerOutcome {
            best_params: state.best_params,
            best_score: state.best_score,
            iterations_run: state.iteration,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn param_get_set_round_trip() {
        let mut p = DecisionParameters::default();
        for (i, param) in Param::ALL.iter().enumerate() {
            param.set(&mut p, i as f64 / 10.0).unwrap();
            assert_eq!(param.get(&p), Some(i as f64 / 10.0));
        }
        assert!(Param::AggressionThreshold(4).set(&mut p, 0.5).is_err());
    }

    #[test]
    fn round3_rounds_half_away() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.9996), 1.0);
    }

    #[test]
    fn validate_rejects_bad_spaces() {
        assert!(matches!(
            SearchSpace { dimensions: vec![] }.validate(),
            Err(OptimizerError::EmptySearchSpace)
        ));
        let inverted =
            SearchSpace::single(Param::BluffProbability, Bounds::new(0.5, 0.1), Start::Lower);
        assert!(matches!(inverted.validate(), Err(OptimizerError::InvalidBounds { .. })));
        let bad_index =
            SearchSpace::single(Param::AggressionThreshold(7), Bounds::new(0.1, 0.5), Start::Lower);
        assert!(matches!(bad_index.validate(), Err(OptimizerError::UnknownParam(_))));
    }

    #[test]
    fn initial_point_respects_start_and_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = SearchSpace::hill_climb().initial(DecisionParameters::default(), &mut rng).unwrap();
        for t in p.aggression_thresholds {
            assert!((0.4..=0.9).contains(&t));
            assert_eq!(t, round3(t));
        }
        assert!((0.0..=0.2).contains(&p.bluff_probability));

        let lower =
            SearchSpace::single(Param::RaiseStackFraction, Bounds::new(0.05, 0.6), Start::Lower);
        let p = lower.initial(DecisionParameters::default(), &mut rng).unwrap();
        assert_eq!(p.raise_stack_fraction, 0.05);

        let keep =
            SearchSpace::single(Param::CallThresholdMargin, Bounds::new(0.03, 0.05), Start::Keep);
        let p = keep.initial(DecisionParameters::default(), &mut rng).unwrap();
        assert_eq!(p.call_threshold_margin, 0.045);
    }

    #[test]
    fn pick_treats_thresholds_as_one_group() {
        let space = SearchSpace::hill_climb();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let draws = 8000;
        let threshold_hits =
            (0..draws).filter(|_| space.pick(&mut rng) < 4).count() as f64 / draws as f64;
        assert!((threshold_hits - 0.25).abs() < 0.03, "threshold share {threshold_hits}");
    }

    #[test]
    fn cancelled_token_stops_before_first_iteration() {
        let scorer =
            |_: &DecisionParameters, _: &mut dyn RngCore| -> Result<f64, ScoreError> { Ok(0.5) };
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut sink = MemorySink::default();
        let outcome = Optimizer::new(
            SearchSpace::hill_climb(),
            HillClimbing::new(HillClimbConfig::default()),
            &scorer,
        )
        .with_cancel_token(cancel)
        .run(DecisionParameters::default(), &mut ChaCha8Rng::seed_from_u64(3), &mut sink)
        .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.iterations_run, 0);
        assert_eq!(sink.records.len(), 1);
    }

    #[test]
    fn score_errors_abort_the_run() {
        let scorer = |_: &DecisionParameters, _: &mut dyn RngCore| -> Result<f64, ScoreError> {
            Err(ScoreError::EmptyRoster)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let err = Optimizer::new(SearchSpace::hill_climb(), HillClimbing::default(), &scorer)
            .run(DecisionParameters::default(), &mut rng, &mut MemorySink::default())
            .unwrap_err();
        assert!(matches!(err, OptimizerError::Score(ScoreError::EmptyRoster)));
    }
}
