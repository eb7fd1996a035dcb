use std::ops::*;

///
/// The guarantees a producer makes about the order and completeness of the pixel blocks it delivers
///
/// Filters use these to decide whether they can use algorithms that depend on the order that pixels arrive in.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct DeliveryHints(u32);

impl DeliveryHints {
    /// No guarantees are made
    pub const NONE: DeliveryHints                   = DeliveryHints(0);

    /// Pixels may arrive in any order
    pub const RANDOM_ORDER: DeliveryHints           = DeliveryHints(1);

    /// Pixels arrive from top to bottom, left to right
    pub const TOP_DOWN_LEFT_RIGHT: DeliveryHints    = DeliveryHints(2);

    /// Every block consists of one or more complete scanlines
    pub const COMPLETE_SCANLINES: DeliveryHints     = DeliveryHints(4);

    /// Every pixel is delivered exactly once per frame
    pub const SINGLE_PASS: DeliveryHints            = DeliveryHints(8);

    /// The image has exactly one frame
    pub const SINGLE_FRAME: DeliveryHints           = DeliveryHints(16);

    ///
    /// Creates a set of hints from their bit representation (unknown bits are discarded)
    ///
    #[inline]
    pub const fn from_bits(bits: u32) -> DeliveryHints {
        DeliveryHints(bits & 0x1f)
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    ///
    /// True if every hint in `hints` is also in this set
    ///
    #[inline]
    pub const fn contains(&self, hints: DeliveryHints) -> bool {
        (self.0 & hints.0) == hints.0
    }

    #[inline]
    pub const fn union(&self, hints: DeliveryHints) -> DeliveryHints {
        DeliveryHints(self.0 | hints.0)
    }

    ///
    /// The hints in this set that are not in `hints`
    ///
    #[inline]
    pub const fn difference(&self, hints: DeliveryHints) -> DeliveryHints {
        DeliveryHints(self.0 & !hints.0)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DeliveryHints {
    type Output = DeliveryHints;

    #[inline]
    fn bitor(self, rhs: DeliveryHints) -> DeliveryHints { self.union(rhs) }
}

impl BitOrAssign for DeliveryHints {
    #[inline]
    fn bitor_assign(&mut self, rhs: DeliveryHints) { self.0 |= rhs.0; }
}

impl BitAnd for DeliveryHints {
    type Output = DeliveryHints;

    #[inline]
    fn bitand(self, rhs: DeliveryHints) -> DeliveryHints { DeliveryHints(self.0 & rhs.0) }
}

///
/// The status sent by a producer when it stops sending pixels for a frame or image
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompletionStatus {
    /// Production failed: any partial state should be thrown away
    Error,

    /// Production was cancelled: any partial state should be thrown away
    Aborted,

    /// A frame is complete, more frames may follow
    FrameDone,

    /// The image is complete and no further pixels will be sent
    ImageDone,
}

impl CompletionStatus {
    ///
    /// True for the statuses that indicate that production stopped without finishing
    ///
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, CompletionStatus::Error | CompletionStatus::Aborted)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn contains_requires_all_bits() {
        let hints = DeliveryHints::TOP_DOWN_LEFT_RIGHT | DeliveryHints::SINGLE_PASS;

        assert!(hints.contains(DeliveryHints::TOP_DOWN_LEFT_RIGHT));
        assert!(!hints.contains(DeliveryHints::TOP_DOWN_LEFT_RIGHT | DeliveryHints::COMPLETE_SCANLINES));
        assert!(hints.contains(DeliveryHints::NONE));
    }

    #[test]
    fn unknown_bits_are_dropped() {
        assert!(DeliveryHints::from_bits(0xff).bits() == 0x1f);
    }
}
