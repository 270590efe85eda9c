use super::rank_groups::RankGroups;
use super::straight_info::StraightInfo;
use super::suit_info::SuitInfo;
use crate::cards::Card;

/// Pre-computed analysis of a 7-card hand.
/// Built once and shared by all category detectors.
#[derive(Debug, Clone)]
pub struct HandAnalysis {
    pub rank_groups: RankGroups,
    pub suit_info: SuitInfo,
    pub straight_info: StraightInfo,
    /// Straight test restricted to the flush suit's ranks.
    pub straight_flush_info: StraightInfo,
}

impl HandAnalysis {
    pub fn new(cards: &[Card; 7]) -> Self {
        let rank_groups = RankGroups::from_cards(cards);
        let suit_info = SuitInfo::detect(cards);
        let straight_info = StraightInfo::detect(cards.iter().map(|c| c.rank().ordinal()));
        let straight_flush_info = StraightInfo::detect(suit_info.flush_ranks.iter().copied());
        Self { rank_groups, suit_info, straight_info, straight_flush_info }
    }
}
