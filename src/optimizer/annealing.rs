use super::{
    AcceptanceRule, Bounds, IterationOutcome, OptimizerError, OptimizerState, Param, SearchSpace,
    Start,
};
use crate::agents::DecisionParameters;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Geometric decay applied after every iteration.
    pub cooling_rate: f64,
    pub step: f64,
    /// Multiply the step by the current temperature so moves narrow as the
    /// search cools.
    pub scale_step_by_temperature: bool,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            cooling_rate: 0.97,
            step: 0.03,
            scale_step_by_temperature: false,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_step(mut self, step: f64, scale_by_temperature: bool) -> Self {
        self.step = step;
        self.scale_step_by_temperature = scale_by_temperature;
        self
    }
}

/// Metropolis acceptance with geometric cooling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatedAnnealing {
    config: AnnealingConfig,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Accept when `delta >= 0`, otherwise with probability
    /// `exp(delta / temperature)`. A zero temperature never accepts a loss.
    ///
    /// ```
    /// use poker_tuner::optimizer::SimulatedAnnealing;
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// assert!(SimulatedAnnealing::accepts(0.0, 0.5, &mut rng));
    /// assert!(!SimulatedAnnealing::accepts(-0.1, 0.0, &mut rng));
    /// ```
    pub fn accepts<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
        if delta >= 0.0 {
            return true;
        }
        if temperature <= 0.0 {
            return false;
        }
        rng.random::<f64>() < (delta / temperature).exp()
    }

    fn temperature(&self, state: &OptimizerState) -> f64 {
        state.temperature.unwrap_or(self.config.initial_temperature)
    }
}

impl AcceptanceRule for SimulatedAnnealing {
    fn initial_step(&self) -> f64 {
        self.config.step
    }

    fn initial_temperature(&self) -> Option<f64> {
        Some(self.config.initial_temperature)
    }

    fn step_size(&self, state: &OptimizerState, slot: usize) -> f64 {
        let step = state.step_sizes[slot];
        if self.config.scale_step_by_temperature {
            step * self.temperature(state)
        } else {
            step
        }
    }

    fn accept(&self, state: &OptimizerState, candidate_score: f64, rng: &mut dyn RngCore) -> bool {
        Self::accepts(candidate_score - state.current_score, self.temperature(state), rng)
    }

    fn update(&self, state: &mut OptimizerState, _slot: usize, _accepted: bool) {
        state.temperature = Some(self.temperature(state) * self.config.cooling_rate);
    }

    fn outcome(&self, state: &OptimizerState, accepted: bool) -> IterationOutcome {
        IterationOutcome::Annealed { accepted, temperature: self.temperature(state) }
    }
}

/// Single-scalar annealing runs with their tuned bounds and fixed context.
/// Config files and the command line share one spelling, e.g.
/// `aggression-threshold-2` or `bluff-probability`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnnealingPreset {
    /// Street index 0..=3.
    AggressionThreshold(usize),
    BluffProbability,
    CallThresholdMargin,
    RaiseStackFraction,
}

/// Everything needed to launch one preset.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingPlan {
    pub space: SearchSpace,
    pub config: AnnealingConfig,
    /// Values of the dimensions the run leaves alone.
    pub base: DecisionParameters,
    pub iterations: u32,
}

const AGGRESSION_BOUNDS: [(f64, f64); 4] = [(0.6, 0.8), (0.6, 0.7), (0.5, 0.7), (0.5, 0.6)];

impl AnnealingPreset {
    pub const ALL: [AnnealingPreset; 7] = [
        AnnealingPreset::AggressionThreshold(0),
        AnnealingPreset::AggressionThreshold(1),
        AnnealingPreset::AggressionThreshold(2),
        AnnealingPreset::AggressionThreshold(3),
        AnnealingPreset::BluffProbability,
        AnnealingPreset::CallThresholdMargin,
        AnnealingPreset::RaiseStackFraction,
    ];

    pub fn plan(self) -> Result<AnnealingPlan, OptimizerError> {
        let tuned = [0.71, 0.61, 0.57, 0.55];
        let defaults = DecisionParameters::default();
        let plan = match self {
            AnnealingPreset::AggressionThreshold(i) => {
                let (min, max) = *AGGRESSION_BOUNDS
                    .get(i)
                    .ok_or(OptimizerError::UnknownParam(Param::AggressionThreshold(i)))?;
                AnnealingPlan {
                    space: SearchSpace::single(
                        Param::AggressionThreshold(i),
                        Bounds::new(min, max),
                        Start::Lower,
                    ),
                    config: AnnealingConfig::default(),
                    base: defaults
                        .with_aggression_thresholds([0.5; 4])
                        .with_call_threshold_margin(0.02)
                        .with_bluff_probability(0.1),
                    iterations: 100,
                }
            }
            AnnealingPreset::BluffProbability => AnnealingPlan {
                space: SearchSpace::single(
                    Param::BluffProbability,
                    Bounds::new(0.02, 0.06),
                    Start::Value(0.05),
                ),
                config: AnnealingConfig::default().with_cooling_rate(0.95).with_step(0.02, true),
                base: defaults.with_aggression_thresholds(tuned).with_call_threshold_margin(0.045),
                iterations: 50,
            },
            AnnealingPreset::CallThresholdMargin => AnnealingPlan {
                space: SearchSpace::single(
                    Param::CallThresholdMargin,
                    Bounds::new(0.03, 0.05),
                    Start::Lower,
                ),
                config: AnnealingConfig::default().with_step(0.01, true),
                base: defaults.with_aggression_thresholds(tuned).with_bluff_probability(0.1),
                iterations: 50,
            },
            AnnealingPreset::RaiseStackFraction => AnnealingPlan {
                space: SearchSpace::single(
                    Param::RaiseStackFraction,
                    Bounds::new(0.05, 0.6),
                    Start::Lower,
                ),
                config: AnnealingConfig::default().with_step(0.05, false),
                base: defaults
                    .with_aggression_thresholds([0.72, 0.64, 0.57, 0.56])
                    .with_call_threshold_margin(0.08)
                    .with_bluff_probability(0.09),
                iterations: 50,
            },
        };
        Ok(plan)
    }
}

impl fmt::Display for AnnealingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnealingPreset::AggressionThreshold(i) => write!(f, "aggression-threshold-{i}"),
            AnnealingPreset::BluffProbability => f.write_str("bluff-probability"),
            AnnealingPreset::CallThresholdMargin => f.write_str("call-threshold-margin"),
            AnnealingPreset::RaiseStackFraction => f.write_str("raise-stack-fraction"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown annealing preset: '{0}'")]
pub struct PresetParseError(String);

impl FromStr for AnnealingPreset {
    type Err = PresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnealingPreset::ALL
            .into_iter()
            .find(|p| p.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| PresetParseError(s.to_string()))
    }
}

impl TryFrom<String> for AnnealingPreset {
    type Error = PresetParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AnnealingPreset> for String {
    fn from(p: AnnealingPreset) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ScoreError;
    use crate::optimizer::{MemorySink, Optimizer};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn improvements_and_ties_always_pass() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(SimulatedAnnealing::accepts(0.0, 1e-9, &mut rng));
            assert!(SimulatedAnnealing::accepts(0.2, 0.0, &mut rng));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn worse_moves_pass_at_metropolis_rate(
            delta in -0.5f64..-0.001,
            temperature in 0.05f64..2.0,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let draws = 4000;
            let hits = (0..draws)
                .filter(|_| SimulatedAnnealing::accepts(delta, temperature, &mut rng))
                .count();
            let observed = hits as f64 / draws as f64;
            let expected = (delta / temperature).exp();
            prop_assert!((observed - expected).abs() < 0.05, "{observed} vs {expected}");
        }
    }

    #[test]
    fn temperature_decays_every_iteration() {
        let scorer =
            |_: &DecisionParameters, _: &mut dyn RngCore| -> Result<f64, ScoreError> { Ok(0.5) };
        let plan = AnnealingPreset::BluffProbability.plan().unwrap();
        let mut sink = MemorySink::default();
        Optimizer::new(plan.space, SimulatedAnnealing::new(plan.config), &scorer)
            .with_iterations(10)
            .run(plan.base, &mut ChaCha8Rng::seed_from_u64(6), &mut sink)
            .unwrap();

        assert_eq!(sink.records.len(), 11);
        for (i, r) in sink.records.iter().enumerate() {
            let IterationOutcome::Annealed { accepted, temperature } = r.outcome else {
                panic!("annealing must record temperatures");
            };
            assert!(accepted);
            assert!((temperature - 0.95f64.powi(i as i32)).abs() < 1e-12);
            let bluff = r.params.bluff_probability;
            assert!((0.02..=0.06).contains(&bluff));
        }
        assert_eq!(sink.records[0].params.bluff_probability, 0.05);
        assert_eq!(sink.records[0].params.aggression_thresholds, [0.71, 0.61, 0.57, 0.55]);
    }

    #[test]
    fn scaled_step_narrows_with_temperature() {
        let rule = SimulatedAnnealing::new(AnnealingConfig::default().with_step(0.02, true));
        let p = DecisionParameters::default();
        let mut state = OptimizerState {
            current_params: p,
            current_score: 0.0,
            best_params: p,
            best_score: 0.0,
            step_sizes: vec![0.02],
            temperature: Some(0.5),
            iteration: 3,
        };
        assert!((rule.step_size(&state, 0) - 0.01).abs() < 1e-12);
        state.temperature = Some(1.0);
        assert!((rule.step_size(&state, 0) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn presets_start_where_expected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for (i, lower) in [0.6, 0.6, 0.5, 0.5].into_iter().enumerate() {
            let plan = AnnealingPreset::AggressionThreshold(i).plan().unwrap();
            let start = plan.space.initial(plan.base, &mut rng).unwrap();
            assert_eq!(start.aggression_thresholds[i], lower);
            assert_eq!(plan.iterations, 100);
        }
        let plan = AnnealingPreset::RaiseStackFraction.plan().unwrap();
        assert_eq!(plan.space.initial(plan.base, &mut rng).unwrap().raise_stack_fraction, 0.05);
        assert!(AnnealingPreset::AggressionThreshold(4).plan().is_err());
    }

    #[test]
    fn preset_names_parse_back() {
        for p in AnnealingPreset::ALL {
            assert_eq!(p.to_string().parse::<AnnealingPreset>().unwrap(), p);
        }
        assert!("aggression".parse::<AnnealingPreset>().is_err());
    }

    #[test]
    fn preset_json_uses_command_line_names() {
        let json = serde_json::to_string(&AnnealingPreset::AggressionThreshold(2)).unwrap();
        assert_eq!(json, r#""aggression-threshold-2""#);
        let p: AnnealingPreset = serde_json::from_str(r#""bluff-probability""#).unwrap();
        assert_eq!(p, AnnealingPreset::BluffProbability);
        assert!(serde_json::from_str::<AnnealingPreset>(r#""bluff_probability""#).is_err());
    }
}
