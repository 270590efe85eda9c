//! Running matches and turning them into a score.
//!
//! [`TableSimulator`] plays one heads-up match on the crate's own [`Game`].
//! [`RosterScorer`] plays a candidate [`EquityPolicy`] against a fixed roster
//! and averages its win rate, which is what the optimizer maximises.

use crate::agents::{Archetype, DecisionParameters, EquityPolicy, PolicyError, Strategy};
use crate::engine::{MatchOutcome, MatchSimulator};
use crate::equity::EquityEstimator;
use crate::game::{ActionError, Game};
use log::debug;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchError {
    #[error("policy failed: {0}")]
    Policy(#[from] PolicyError),
    #[error("illegal action: {0}")]
    Action(#[from] ActionError),
    #[error("hand {hand} did not finish within {actions} actions")]
    Stalled { hand: u32, actions: u32 },
    #[error("both players are named '{0}'")]
    DuplicateName(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("opponent roster is empty")]
    EmptyRoster,
    #[error("games per opponent must be positive")]
    ZeroGames,
    #[error("match against {opponent} failed: {source}")]
    Match {
        opponent: String,
        #[source]
        source: MatchError,
    },
}

/// Table settings for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub max_rounds: u32,
    pub initial_stack: u64,
    pub small_blind: u64,
    /// Guard against a hand that never terminates.
    pub max_actions_per_hand: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { max_rounds: 1000, initial_stack: 10_000, small_blind: 20, max_actions_per_hand: 500 }
    }
}

impl MatchConfig {
    pub fn big_blind(&self) -> u64 {
        self.small_blind * 2
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_initial_stack(mut self, stack: u64) -> Self {
        self.initial_stack = stack;
        self
    }

    pub fn with_small_blind(mut self, small_blind: u64) -> Self {
        self.small_blind = small_blind;
        self
    }
}

/// Heads-up matches on [`Game`]: up to `max_rounds` hands, stopping early
/// once a player is broke. The winner is whoever holds more chips at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSimulator {
    config: MatchConfig,
}

impl TableSimulator {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
}

impl MatchSimulator for TableSimulator {
    fn play(
        &self,
        hero: (&str, &dyn Strategy),
        villain: (&str, &dyn Strategy),
        rng: &mut dyn RngCore,
    ) -> Result<MatchOutcome, MatchError> {
        let (game, hands) = self.run_table(hero, villain, rng)?;
        let stacks = game.players();
        let outcome = MatchOutcome::from_stacks(
            (hero.0, stacks[0].stack()),
            (villain.0, stacks[1].stack()),
        );
        debug!(
            "{} vs {}: {hands} hands, stacks {}/{} -> {outcome:?}",
            hero.0,
            villain.0,
            stacks[0].stack(),
            stacks[1].stack()
        );
        Ok(outcome)
    }
}

impl TableSimulator {
    /// Play hands until the round limit or a bust. Returns the table and the
    /// number of hands played.
    fn run_table(
        &self,
        hero: (&str, &dyn Strategy),
        villain: (&str, &dyn Strategy),
        rng: &mut dyn RngCore,
    ) -> Result<(Game, u32), MatchError> {
        if hero.0 == villain.0 {
            return Err(MatchError::DuplicateName(hero.0.to_string()));
        }
        let cfg = &self.config;
        let mut game = Game::with_names(
            vec![hero.0.to_string(), villain.0.to_string()],
            cfg.initial_stack,
            cfg.small_blind,
            cfg.big_blind(),
        );

        let mut hands = 0u32;
        while hands < cfg.max_rounds && game.funded_players() == 2 {
            game.new_hand(&mut *rng)?;
            let mut actions = 0u32;
            while let Some(view) = game.decision_view() {
                actions += 1;
                if actions > cfg.max_actions_per_hand {
                    return Err(MatchError::Stalled { hand: hands, actions: actions - 1 });
                }
                let strategy = if view.player == hero.0 { hero.1 } else { villain.1 };
                let action = strategy.decide(&view, rng)?;
                game.apply(action)?;
            }
            hands += 1;
        }
        Ok((game, hands))
    }
}

/// Scores a parameter set. Higher is better.
pub trait Scorer: Sync {
    fn score(&self, params: &DecisionParameters, rng: &mut dyn RngCore) -> Result<f64, ScoreError>;
}

impl<F> Scorer for F
where
    F: Fn(&DecisionParameters, &mut dyn RngCore) -> Result<f64, ScoreError> + Sync,
{
    fn score(&self, params: &DecisionParameters, rng: &mut dyn RngCore) -> Result<f64, ScoreError> {
        self(params, rng)
    }
}

/// Average win rate of an [`EquityPolicy`] over a roster of opponents.
///
/// One base seed is drawn per call; match `g` against opponent `k` then runs
/// on its own ChaCha stream, so results are independent of evaluation order.
#[derive(Debug, Clone)]
pub struct RosterScorer<M = TableSimulator> {
    roster: Vec<Archetype>,
    games_per_opponent: u32,
    estimator: EquityEstimator,
    simulator: M,
}

impl RosterScorer<TableSimulator> {
    pub fn new(roster: Vec<Archetype>, games_per_opponent: u32, config: MatchConfig) -> Self {
        Self::with_simulator(roster, games_per_opponent, TableSimulator::new(config))
    }
}

impl<M: MatchSimulator> RosterScorer<M> {
    pub fn with_simulator(roster: Vec<Archetype>, games_per_opponent: u32, simulator: M) -> Self {
        Self { roster, games_per_opponent, estimator: EquityEstimator::default(), simulator }
    }

    pub fn with_estimator(mut self, estimator: EquityEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn roster(&self) -> &[Archetype] {
        &self.roster
    }

    /// Wins over games against one opponent; draws count as non-wins.
    fn win_rate(
        &self,
        policy: &EquityPolicy,
        slot: usize,
        opponent: &Archetype,
        base_seed: u64,
    ) -> Result<f64, ScoreError> {
        let games = u64::from(self.games_per_opponent);
        let mut wins = 0u32;
        for g in 0..games {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
            rng.set_stream(slot as u64 * games + g);
            let outcome = self
                .simulator
                .play(("hero", policy), (opponent.name(), opponent), &mut rng)
                .map_err(|source| ScoreError::Match { opponent: opponent.to_string(), source })?;
            if outcome.is_win_for("hero") {
                wins += 1;
            }
        }
        let rate = f64::from(wins) / games as f64;
        debug!("vs {opponent}: {wins}/{games} = {rate:.3}");
        Ok(rate)
    }

    #[cfg(not(feature = "parallel"))]
    fn win_rates(&self, policy: &EquityPolicy, base_seed: u64) -> Result<Vec<f64>, ScoreError> {
        self.roster
            .iter()
            .enumerate()
            .map(|(k, opp)| self.win_rate(policy, k, opp, base_seed))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn win_rates(&self, policy: &EquityPolicy, base_seed: u64) -> Result<Vec<f64>, ScoreError> {
        use rayon::prelude::*;

        self.roster
            .par_iter()
            .enumerate()
            .map(|(k, opp)| self.win_rate(policy, k, opp, base_seed))
            .collect()
    }
}

impl<M: MatchSimulator> Scorer for RosterScorer<M> {
    fn score(&self, params: &DecisionParameters, rng: &mut dyn RngCore) -> Result<f64, ScoreError> {
        if self.roster.is_empty() {
            return Err(ScoreError::EmptyRoster);
        }
        if self.games_per_opponent == 0 {
            return Err(ScoreError::ZeroGames);
        }
        let policy = EquityPolicy::new(*params).with_estimator(self.estimator);
        let base_seed: u64 = rng.random();
        // Every match finishes before the rates are combined.
        let rates = self.win_rates(&policy, base_seed)?;
        let score = rates.iter().sum::<f64>() / rates.len() as f64;
        debug!("scored {params:?}: {score:.4}");
        Ok(score)
    }
}
