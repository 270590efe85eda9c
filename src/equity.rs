//! Monte Carlo equity: the share of random run-outs a hand wins against
//! a number of unknown opponent hands, with ties split evenly.

use crate::cards::Card;
use crate::deck::{Deck, DeckError};
use crate::evaluator::{evaluate, HandCategory};
use crate::hand::{validate_deal, Board, HandError, HoleCards};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EquityError {
    #[error("trial count must be positive")]
    ZeroTrials,
    #[error("invalid player count: {0}")]
    InvalidPlayerCount(usize),
    #[error(transparent)]
    Hand(#[from] HandError),
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// Estimates equity by sampling `trials` independent completions of the
/// board and the opponents' hole cards.
///
/// ```
/// use poker_tuner::equity::EquityEstimator;
/// use poker_tuner::hand::{Board, HoleCards};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let estimator = EquityEstimator::new(200).unwrap();
/// let hole: HoleCards = "As Ad".parse().unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let equity = estimator.estimate(&hole, &Board::default(), 2, &mut rng).unwrap();
/// assert!((0.0..=1.0).contains(&equity));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquityEstimator {
    trials: u32,
}

impl Default for EquityEstimator {
    fn default() -> Self {
        Self { trials: Self::DEFAULT_TRIALS }
    }
}

impl EquityEstimator {
    pub const DEFAULT_TRIALS: u32 = 100;

    pub fn new(trials: u32) -> Result<Self, EquityError> {
        if trials == 0 {
            return Err(EquityError::ZeroTrials);
        }
        Ok(Self { trials })
    }

    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Equity of `hole` given the known `board` (0 to 5 cards) when `players`
    /// hands, including this one, contest the pot.
    ///
    /// One base seed is drawn from `rng`; trial `i` then runs on its own
    /// ChaCha stream `i`, so the estimate is the same whether trials run
    /// serially or under the `parallel` feature.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        hole: &HoleCards,
        board: &Board,
        players: usize,
        rng: &mut R,
    ) -> Result<f64, EquityError> {
        if players == 0 {
            return Err(EquityError::InvalidPlayerCount(players));
        }
        validate_deal(hole, board)?;

        let mut known = hole.as_array().to_vec();
        known.extend_from_slice(board.as_slice());
        let deck = Deck::without(&known);

        let opponents = players - 1;
        let missing = 5 - board.len();
        let needed = opponents * 2 + missing;
        if needed > deck.len() {
            return Err(DeckError::InsufficientDeck { needed, remaining: deck.len() }.into());
        }

        let rollout = Rollout { deck: &deck, hole, board: board.as_slice(), opponents, missing };
        let base_seed: u64 = rng.random();
        let total = rollout.run_all(base_seed, self.trials)?;
        Ok((total / f64::from(self.trials)).clamp(0.0, 1.0))
    }
}

/// Everything one trial needs; shared read-only between trials.
struct Rollout<'a> {
    deck: &'a Deck,
    hole: &'a HoleCards,
    board: &'a [Card],
    opponents: usize,
    missing: usize,
}

impl Rollout<'_> {
    #[cfg(not(feature = "parallel"))]
    fn run_all(&self, base_seed: u64, trials: u32) -> Result<f64, EquityError> {
        let mut buf = Vec::with_capacity(self.needed());
        let mut total = 0.0;
        for i in 0..trials {
            total += self.trial(base_seed, i, &mut buf)?;
        }
        Ok(total)
    }

    #[cfg(feature = "parallel")]
    fn run_all(&self, base_seed: u64, trials: u32) -> Result<f64, EquityError> {
        use rayon::prelude::*;

        // Collected in trial order so the float sum matches the serial path.
        let credits: Vec<f64> = (0..trials)
            .into_par_iter()
            .map_init(
                || Vec::with_capacity(self.needed()),
                |buf, i| self.trial(base_seed, i, buf),
            )
            .collect::<Result<_, _>>()?;
        Ok(credits.iter().sum())
    }

    fn needed(&self) -> usize {
        self.opponents * 2 + self.missing
    }

    /// Credit for one trial: 1 for an outright win, `1/k` when `k` hands
    /// (this one included) share the best category, 0 otherwise.
    fn trial(&self, base_seed: u64, index: u32, buf: &mut Vec<Card>) -> Result<f64, EquityError> {
        let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
        rng.set_stream(u64::from(index));
        self.deck.sample_into(&mut rng, self.needed(), buf)?;

        let (runout, opponent_cards) = buf.split_at(self.missing);
        let mut full_board = [self.hole.first(); 5];
        for (slot, card) in full_board.iter_mut().zip(self.board.iter().chain(runout)) {
            *slot = *card;
        }

        let own = category_of(self.hole.first(), self.hole.second(), &full_board);
        let mut best = HandCategory::HighCard;
        let mut at_best = 0usize;
        for pair in opponent_cards.chunks_exact(2) {
            let cat = category_of(pair[0], pair[1], &full_board);
            if cat > best || at_best == 0 {
                best = cat;
                at_best = 1;
            } else if cat == best {
                at_best += 1;
            }
        }

        let credit = if at_best == 0 || own > best {
            1.0
        } else if own == best {
            1.0 / (at_best + 1) as f64
        } else {
            0.0
        };
        Ok(credit)
    }
}

fn category_of(a: Card, b: Card, board: &[Card; 5]) -> HandCategory {
    evaluate(&[a, b, board[0], board[1], board[2], board[3], board[4]])
}
