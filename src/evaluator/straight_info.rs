use crate::cards::Rank;

/// Whether a set of rank ordinals contains five consecutive values, with the
/// ace also counting as ordinal -1 so A-2-3-4-5 (the wheel) qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StraightInfo {
    /// Highest rank of the best run, `Five` for the wheel.
    pub top_rank: Option<Rank>,
}

impl StraightInfo {
    pub fn detect<I>(ordinals: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        // Bit k+1 marks ordinal k; bit 0 is the low ace.
        let mut bits: u16 = 0;
        for o in ordinals {
            bits |= 1 << (o + 1);
            if o == Rank::Ace.ordinal() {
                bits |= 1;
            }
        }
        for top in (4..=13u8).rev() {
            let run = 0b1_1111u16 << (top - 4);
            if bits & run == run {
                return StraightInfo { top_rank: Rank::from_ordinal(top - 1) };
            }
        }
        StraightInfo { top_rank: None }
    }

    pub fn is_straight(&self) -> bool {
        self.top_rank.is_some()
    }
}
