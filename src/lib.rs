//! poker-tuner: equity estimation and offline tuning of an equity-driven policy
//!
//! Pieces, bottom up:
//! - `cards`, `deck`, `hand`: card model, sampling without replacement, deal validation
//! - `evaluator`: 7-card hand category (0 = high card .. 9 = royal flush)
//! - `equity`: Monte Carlo win probability against random opponent holdings
//! - `agents`: the [`agents::EquityPolicy`] and a closed set of fixed opponents
//! - `game`, `arena`: a no-limit table engine and win-rate scoring over matches
//! - `optimizer`: hill climbing and simulated annealing over the policy's parameters
//!
//! ## Quick start: category of a Hold'em hand
//! ```
//! use poker_tuner::evaluator::{evaluate_holdem, HandCategory};
//! use poker_tuner::hand::{Board, HoleCards};
//!
//! let hole: HoleCards = "As Ah".parse().unwrap();
//! let board: Board = "Kc Qd Jh 3s 2c".parse().unwrap();
//! assert_eq!(evaluate_holdem(&hole, &board).unwrap(), HandCategory::OnePair);
//! ```
//!
//! ## Equity
//! ```
//! use poker_tuner::equity::EquityEstimator;
//! use poker_tuner::hand::{Board, HoleCards};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let hole: HoleCards = "As Ah".parse().unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let equity = EquityEstimator::new(200)
//!     .unwrap()
//!     .estimate(&hole, &Board::default(), 2, &mut rng)
//!     .unwrap();
//! assert!((0.0..=1.0).contains(&equity));
//! ```
//!
//! ## Tuning
//! Run the optimizer from the command line with:
//! ```sh
//! cargo run --release --bin poker-tune -- --method anneal --preset bluff-probability --seed 7
//! ```

pub mod agents;
pub mod arena;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod equity;
pub mod evaluator;
pub mod game;
pub mod hand;
pub mod optimizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
