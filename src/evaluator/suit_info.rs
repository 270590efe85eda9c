use crate::cards::{Card, Suit};

/// Flush candidate among up to seven cards: the suit occurring at least
/// five times, with that suit's rank ordinals sorted descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitInfo {
    pub flush_suit: Option<Suit>,
    pub flush_ranks: Vec<u8>,
}

impl SuitInfo {
    pub fn detect(cards: &[Card]) -> Self {
        let mut counts = [0u8; 4];
        for c in cards {
            counts[c.suit().index()] += 1;
        }
        let Some(suit) = Suit::ALL.into_iter().find(|s| counts[s.index()] >= 5) else {
            return SuitInfo { flush_suit: None, flush_ranks: Vec::new() };
        };
        let mut flush_ranks: Vec<u8> =
            cards.iter().filter(|c| c.suit() == suit).map(|c| c.rank().ordinal()).collect();
        flush_ranks.sort_unstable_by(|a, b| b.cmp(a));
        SuitInfo { flush_suit: Some(suit), flush_ranks }
    }

    pub fn is_flush(&self) -> bool {
        self.flush_suit.is_some()
    }
}
