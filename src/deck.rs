use crate::cards::{Card, Rank, Suit};
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("insufficient deck: needed {needed} cards, {remaining} remain")]
    InsufficientDeck { needed: usize, remaining: usize },
}

/// The 52-card universe, optionally minus cards already dealt.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// ```
    /// use poker_tuner::deck::Deck;
    ///
    /// let deck = Deck::standard();
    /// assert_eq!(deck.len(), 52);
    /// ```
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for s in Suit::ALL {
            for r in Rank::ALL {
                cards.push(Card::new(r, s));
            }
        }
        Self { cards }
    }

    /// Every card not present in `known`.
    ///
    /// ```
    /// use poker_tuner::cards::parse_cards;
    /// use poker_tuner::deck::Deck;
    ///
    /// let known = parse_cards("As Ad").unwrap();
    /// let deck = Deck::without(&known);
    /// assert_eq!(deck.len(), 50);
    /// ```
    pub fn without(known: &[Card]) -> Self {
        let mut dealt = [false; 52];
        for c in known {
            dealt[c.index()] = true;
        }
        let mut deck = Self::standard();
        deck.cards.retain(|c| !dealt[c.index()]);
        deck
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// Shuffle using the provided RNG.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Draw one card from the top of the deck.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Draw exactly `n` cards from the top, or fail without removing any.
    pub fn draw_n(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.cards.len() {
            return Err(DeckError::InsufficientDeck { needed: n, remaining: self.cards.len() });
        }
        let at = self.cards.len() - n;
        let mut drawn = self.cards.split_off(at);
        drawn.reverse();
        Ok(drawn)
    }

    /// Sample `n` distinct cards without replacement into `out`, leaving the deck untouched.
    /// `out` is cleared first so callers can reuse one buffer across trials.
    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        out: &mut Vec<Card>,
    ) -> Result<(), DeckError> {
        if n > self.cards.len() {
            return Err(DeckError::InsufficientDeck { needed: n, remaining: self.cards.len() });
        }
        out.clear();
        out.extend(index::sample(rng, self.cards.len(), n).into_iter().map(|i| self.cards[i]));
        Ok(())
    }
}
