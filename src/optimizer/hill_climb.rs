use super::{AcceptanceRule, IterationOutcome, OptimizerState};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Step-size adaptation for [`HillClimbing`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbConfig {
    pub initial_step: f64,
    /// Multiplier applied to a dimension's step after an accepted move.
    pub shrink: f64,
    pub min_step: f64,
    /// Multiplier applied after a rejected move.
    pub grow: f64,
    pub max_step: f64,
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self { initial_step: 0.05, shrink: 0.9, min_step: 0.005, grow: 1.05, max_step: 0.2 }
    }
}

impl HillClimbConfig {
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    pub fn with_step_limits(mut self, min_step: f64, max_step: f64) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }
}

/// Greedy acceptance: a candidate replaces the current point only when it
/// scores strictly higher.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HillClimbing {
    config: HillClimbConfig,
}

impl HillClimbing {
    pub fn new(config: HillClimbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HillClimbConfig {
        &self.config
    }
}

impl AcceptanceRule for HillClimbing {
    fn initial_step(&self) -> f64 {
        self.config.initial_step
    }

    fn accept(&self, state: &OptimizerState, candidate_score: f64, _rng: &mut dyn RngCore) -> bool {
        candidate_score > state.current_score
    }

    fn update(&self, state: &mut OptimizerState, slot: usize, accepted: bool) {
        let c = &self.config;
        let step = &mut state.step_sizes[slot];
        let scaled = if accepted { *step * c.shrink } else { *step * c.grow };
        *step = scaled.max(c.min_step).min(c.max_step);
    }

    fn outcome(&self, _state: &OptimizerState, accepted: bool) -> IterationOutcome {
        IterationOutcome::Accepted(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::DecisionParameters;
    use crate::arena::ScoreError;
    use crate::optimizer::{Bounds, MemorySink, Optimizer, Param, SearchSpace, Start};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state(score: f64) -> OptimizerState {
        let p = DecisionParameters::default();
        OptimizerState {
            current_params: p,
            current_score: score,
            best_params: p,
            best_score: score,
            step_sizes: vec![0.05],
            temperature: None,
            iteration: 0,
        }
    }

    #[test]
    fn accepts_only_strict_improvements() {
        let rule = HillClimbing::default();
        let s = state(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(rule.accept(&s, 0.51, &mut rng));
        assert!(!rule.accept(&s, 0.5, &mut rng));
        assert!(!rule.accept(&s, 0.49, &mut rng));
    }

    #[test]
    fn step_shrinks_on_accept_and_grows_on_reject_within_limits() {
        let rule = HillClimbing::default();
        let mut s = state(0.5);
        rule.update(&mut s, 0, true);
        assert!((s.step_sizes[0] - 0.045).abs() < 1e-12);
        rule.update(&mut s, 0, false);
        assert!((s.step_sizes[0] - 0.04725).abs() < 1e-12);

        for _ in 0..200 {
            rule.update(&mut s, 0, true);
        }
        assert_eq!(s.step_sizes[0], 0.005);
        for _ in 0..200 {
            rule.update(&mut s, 0, false);
        }
        assert_eq!(s.step_sizes[0], 0.2);
    }

    #[test]
    fn step_stays_within_limits_for_any_multiplier() {
        let config = HillClimbConfig { grow: -1.0, shrink: 3.0, ..HillClimbConfig::default() };
        let rule = HillClimbing::new(config);
        let mut s = state(0.5);
        rule.update(&mut s, 0, false);
        assert_eq!(s.step_sizes[0], 0.005);
        s.step_sizes[0] = 0.1;
        rule.update(&mut s, 0, true);
        assert_eq!(s.step_sizes[0], 0.2);
    }

    #[test]
    fn negative_grow_never_leaves_an_empty_perturbation_range() {
        let scorer =
            |_: &DecisionParameters, _: &mut dyn RngCore| -> Result<f64, ScoreError> { Ok(0.5) };
        let config = HillClimbConfig { grow: -1.0, ..HillClimbConfig::default() };
        let outcome = Optimizer::new(SearchSpace::hill_climb(), HillClimbing::new(config), &scorer)
            .with_iterations(200)
            .run(
                DecisionParameters::default(),
                &mut ChaCha8Rng::seed_from_u64(5),
                &mut MemorySink::default(),
            )
            .unwrap();
        assert_eq!(outcome.iterations_run, 200);
    }

    #[test]
    fn climbs_a_monotone_score_to_the_boundary() {
        let scorer = |p: &DecisionParameters, _: &mut dyn RngCore| -> Result<f64, ScoreError> {
            Ok(p.bluff_probability)
        };
        let bounds = Bounds::new(0.001, 0.999);
        let space = SearchSpace::single(Param::BluffProbability, bounds, Start::Value(0.9));
        let mut sink = MemorySink::default();
        let outcome = Optimizer::new(space, HillClimbing::default(), &scorer)
            .with_iterations(2000)
            .run(DecisionParameters::default(), &mut ChaCha8Rng::seed_from_u64(11), &mut sink)
            .unwrap();

        assert!(outcome.best_score >= 0.99, "best {}", outcome.best_score);
        assert_eq!(outcome.iterations_run, 2000);
        let mut best = f64::MIN;
        for r in &sink.records {
            assert!(r.score >= best, "score regressed at {}", r.iteration);
            best = r.score;
        }
    }
}
