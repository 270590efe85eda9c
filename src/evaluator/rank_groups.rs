use crate::cards::Card;

/// Multiplicity profile of a hand: how many times each rank occurs,
/// sorted descending. `[3, 2, 1, 1]` is a full house over seven cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGroups {
    profile: Vec<u8>,
}

impl RankGroups {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut counts = [0u8; 13];
        for c in cards {
            counts[c.rank().ordinal() as usize] += 1;
        }
        let mut profile: Vec<u8> = counts.into_iter().filter(|&n| n > 0).collect();
        profile.sort_unstable_by(|a, b| b.cmp(a));
        Self { profile }
    }

    /// Size of the largest group.
    pub fn largest(&self) -> u8 {
        self.profile.first().copied().unwrap_or(0)
    }

    /// Size of the second-largest group.
    pub fn second(&self) -> u8 {
        self.profile.get(1).copied().unwrap_or(0)
    }

    pub fn profile(&self) -> &[u8] {
        &self.profile
    }
}
