use super::hand_analysis::HandAnalysis;
use crate::cards::Rank;
use crate::evaluator::HandCategory;

/// Strategy pattern: each detector recognises exactly one category.
pub trait CategoryDetector {
    fn category(&self) -> HandCategory;
    fn detect(&self, analysis: &HandAnalysis) -> bool;
}

// ============================================================================
// Detector Implementations (in priority order: highest to lowest)
// ============================================================================

/// Royal Flush: a straight flush topped by the ace
pub struct RoyalFlushDetector;

impl CategoryDetector for RoyalFlushDetector {
    fn category(&self) -> HandCategory {
        HandCategory::RoyalFlush
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.straight_flush_info.top_rank == Some(Rank::Ace)
    }
}

/// Straight Flush: five consecutive ranks within the flush suit
pub struct StraightFlushDetector;

impl CategoryDetector for StraightFlushDetector {
    fn category(&self) -> HandCategory {
        HandCategory::StraightFlush
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.straight_flush_info.is_straight()
    }
}

pub struct FourOfAKindDetector;

impl CategoryDetector for FourOfAKindDetector {
    fn category(&self) -> HandCategory {
        HandCategory::FourOfAKind
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.rank_groups.largest() == 4
    }
}

/// Full House: trips plus at least a pair; two sets of trips also qualify
pub struct FullHouseDetector;

impl CategoryDetector for FullHouseDetector {
    fn category(&self) -> HandCategory {
        HandCategory::FullHouse
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.rank_groups.largest() == 3 && analysis.rank_groups.second() >= 2
    }
}

pub struct FlushDetector;

impl CategoryDetector for FlushDetector {
    fn category(&self) -> HandCategory {
        HandCategory::Flush
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.suit_info.is_flush()
    }
}

pub struct StraightDetector;

impl CategoryDetector for StraightDetector {
    fn category(&self) -> HandCategory {
        HandCategory::Straight
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.straight_info.is_straight()
    }
}

pub struct ThreeOfAKindDetector;

impl CategoryDetector for ThreeOfAKindDetector {
    fn category(&self) -> HandCategory {
        HandCategory::ThreeOfAKind
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.rank_groups.largest() == 3
    }
}

pub struct TwoPairDetector;

impl CategoryDetector for TwoPairDetector {
    fn category(&self) -> HandCategory {
        HandCategory::TwoPair
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.rank_groups.largest() == 2 && analysis.rank_groups.second() == 2
    }
}

pub struct OnePairDetector;

impl CategoryDetector for OnePairDetector {
    fn category(&self) -> HandCategory {
        HandCategory::OnePair
    }

    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.rank_groups.largest() == 2
    }
}

/// High Card: fallback, always matches
pub struct HighCardDetector;

impl CategoryDetector for HighCardDetector {
    fn category(&self) -> HandCategory {
        HandCategory::HighCard
    }

    fn detect(&self, _analysis: &HandAnalysis) -> bool {
        true
    }
}

// ============================================================================
// Static detector list (in priority order)
// ============================================================================

pub const DETECTORS: [&dyn CategoryDetector; 10] = [
    &RoyalFlushDetector,
    &StraightFlushDetector,
    &FourOfAKindDetector,
    &FullHouseDetector,
    &FlushDetector,
    &StraightDetector,
    &ThreeOfAKindDetector,
    &TwoPairDetector,
    &OnePairDetector,
    &HighCardDetector,
];
