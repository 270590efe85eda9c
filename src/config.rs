//! Run configuration for the `poker-tune` binary.
//!
//! A [`TuningConfig`] is read from JSON. Every field is optional and falls
//! back to the constants the tuner was originally calibrated with:
//!
//! ```
//! use poker_tuner::config::{Method, TuningConfig};
//!
//! let cfg = TuningConfig::from_json_str(r#"{ "method": "anneal", "seed": 7 }"#).unwrap();
//! assert_eq!(cfg.method, Method::Anneal);
//! assert_eq!(cfg.games_per_opponent(), 50);
//! assert_eq!(cfg.roster().len(), 3);
//! ```

use crate::agents::{Archetype, DecisionParameters};
use crate::arena::{MatchConfig, RosterScorer};
use crate::equity::{EquityError, EquityEstimator};
use crate::optimizer::{
    AnnealingPreset, CancelToken, HillClimbConfig, HillClimbing, Optimizer, OptimizerError,
    OptimizerOutcome, RecordSink, SearchSpace, SimulatedAnnealing,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Equity(#[from] EquityError),
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum TuneError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    #[default]
    HillClimb,
    Anneal,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::HillClimb => f.write_str("hill-climb"),
            Method::Anneal => f.write_str("anneal"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown method '{0}', expected hill-climb or anneal")]
pub struct MethodParseError(String);

impl FromStr for Method {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hill-climb" | "hc" => Ok(Method::HillClimb),
            "anneal" | "sa" => Ok(Method::Anneal),
            _ => Err(MethodParseError(s.to_string())),
        }
    }
}

/// A whole tuning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub method: Method,
    /// Defaults to 100 for hill climbing and to the preset's count for annealing.
    pub iterations: Option<u32>,
    /// Unseeded runs draw their seed from the OS.
    pub seed: Option<u64>,
    pub games_per_opponent: Option<u32>,
    pub roster: Option<Vec<Archetype>>,
    pub match_config: MatchConfig,
    pub equity_trials: u32,
    pub preset: AnnealingPreset,
    pub hill_climb: HillClimbConfig,
    /// JSON-lines iteration log.
    pub output: Option<PathBuf>,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            method: Method::HillClimb,
            iterations: None,
            seed: None,
            games_per_opponent: None,
            roster: None,
            match_config: MatchConfig::default(),
            equity_trials: EquityEstimator::DEFAULT_TRIALS,
            preset: AnnealingPreset::AggressionThreshold(0),
            hill_climb: HillClimbConfig::default(),
            output: None,
        }
    }
}

impl TuningConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if self.equity_trials == 0 {
            return invalid("equity_trials must be positive");
        }
        if self.games_per_opponent == Some(0) {
            return invalid("games_per_opponent must be positive");
        }
        if self.roster.as_ref().is_some_and(Vec::is_empty) {
            return invalid("roster must not be empty");
        }
        let m = &self.match_config;
        if m.small_blind == 0 || m.initial_stack < m.big_blind() {
            return invalid("initial_stack must cover a positive big blind");
        }
        let hc = &self.hill_climb;
        let ordered = hc.min_step <= hc.initial_step && hc.initial_step <= hc.max_step;
        if !(hc.min_step > 0.0 && ordered) {
            return invalid("hill_climb steps need 0 < min_step <= initial_step <= max_step");
        }
        if !(hc.shrink > 0.0 && hc.shrink <= 1.0) {
            return invalid("hill_climb.shrink must be in (0, 1]");
        }
        if !(hc.grow >= 1.0 && hc.grow.is_finite()) {
            return invalid("hill_climb.grow must be at least 1");
        }
        Ok(())
    }

    /// Opponents the candidate is scored against.
    pub fn roster(&self) -> Vec<Archetype> {
        if let Some(roster) = &self.roster {
            return roster.clone();
        }
        let third = match self.method {
            Method::HillClimb => Archetype::Random,
            Method::Anneal => Archetype::equity_threshold(),
        };
        vec![Archetype::AlwaysCall, Archetype::AlwaysRaise, third]
    }

    pub fn games_per_opponent(&self) -> u32 {
        self.games_per_opponent.unwrap_or(match self.method {
            Method::HillClimb => 20,
            Method::Anneal => 50,
        })
    }

    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        }
    }

    /// Build the scorer and search for this configuration and run it.
    pub fn run(
        &self,
        rng: &mut dyn RngCore,
        sink: &mut dyn RecordSink,
        cancel: CancelToken,
    ) -> Result<OptimizerOutcome, TuneError> {
        self.validate()?;
        let estimator = EquityEstimator::new(self.equity_trials).map_err(ConfigError::from)?;
        let scorer = RosterScorer::new(self.roster(), self.games_per_opponent(), self.match_config)
            .with_estimator(estimator);

        let outcome = match self.method {
            Method::HillClimb => {
                let rule = HillClimbing::new(self.hill_climb);
                Optimizer::new(SearchSpace::hill_climb(), rule, &scorer)
                    .with_iterations(self.iterations.unwrap_or(100))
                    .with_cancel_token(cancel)
                    .run(DecisionParameters::default(), rng, sink)?
            }
            Method::Anneal => {
                let plan = self.preset.plan()?;
                Optimizer::new(plan.space, SimulatedAnnealing::new(plan.config), &scorer)
                    .with_iterations(self.iterations.unwrap_or(plan.iterations))
                    .with_cancel_token(cancel)
                    .run(plan.base, rng, sink)?
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{IterationOutcome, MemorySink};

    #[test]
    fn empty_json_is_the_default() {
        let cfg = TuningConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, TuningConfig::default());
        assert_eq!(cfg.games_per_opponent(), 20);
        let roster = vec![Archetype::AlwaysCall, Archetype::AlwaysRaise, Archetype::Random];
        assert_eq!(cfg.roster(), roster);
    }

    #[test]
    fn nested_fields_parse() {
        let cfg = TuningConfig::from_json_str(
            r#"{
                "method": "anneal",
                "preset": "bluff-probability",
                "roster": [{ "kind": "tight" }, { "kind": "always-call" }],
                "match_config": { "max_rounds": 50 },
                "games_per_opponent": 4
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.preset, AnnealingPreset::BluffProbability);
        assert_eq!(cfg.roster(), vec![Archetype::Tight, Archetype::AlwaysCall]);
        assert_eq!(cfg.match_config.max_rounds, 50);
        assert_eq!(cfg.match_config.small_blind, 20);
        assert_eq!(cfg.games_per_opponent(), 4);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "equity_trials": 0 }"#,
            r#"{ "games_per_opponent": 0 }"#,
            r#"{ "roster": [] }"#,
            r#"{ "match_config": { "small_blind": 0 } }"#,
            r#"{ "hill_climb": { "min_step": 0.5 } }"#,
            r#"{ "hill_climb": { "grow": -1.0 } }"#,
            r#"{ "hill_climb": { "grow": 0.5 } }"#,
            r#"{ "hill_climb": { "shrink": 0.0 } }"#,
            r#"{ "hill_climb": { "shrink": 1.5 } }"#,
        ] {
            assert!(
                matches!(TuningConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json}"
            );
        }
        assert!(matches!(TuningConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn method_parses_aliases() {
        assert_eq!("hc".parse::<Method>().unwrap(), Method::HillClimb);
        assert_eq!("Anneal".parse::<Method>().unwrap(), Method::Anneal);
        assert!("greedy".parse::<Method>().is_err());
    }

    fn tiny(method: Method) -> TuningConfig {
        TuningConfig {
            method,
            iterations: Some(2),
            games_per_opponent: Some(1),
            roster: Some(vec![Archetype::AlwaysCall, Archetype::Tight]),
            match_config: MatchConfig::default().with_max_rounds(5).with_initial_stack(400),
            equity_trials: 10,
            ..TuningConfig::default()
        }
        .with_seed(17)
    }

    #[test]
    fn seeded_runs_repeat() {
        for method in [Method::HillClimb, Method::Anneal] {
            let cfg = tiny(method);
            let run = || {
                let mut sink = MemorySink::default();
                let outcome = cfg.run(&mut cfg.rng(), &mut sink, CancelToken::new()).unwrap();
                (outcome, sink.records)
            };
            let (a, records_a) = run();
            let (b, records_b) = run();
            assert_eq!(a, b);
            assert_eq!(records_a, records_b);
            assert_eq!(records_a.len(), 3);
            assert!((0.0..=1.0).contains(&a.best_score));
            let annealed = matches!(records_a[0].outcome, IterationOutcome::Annealed { .. });
            assert_eq!(annealed, method == Method::Anneal);
        }
    }
}
