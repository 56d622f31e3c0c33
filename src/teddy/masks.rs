//! Nibble lookup tables shared by every Teddy kernel
//!
//! Table layout is the one the shuffles consume: 32 bytes per table, the low
//! 16 bytes indexed by the nibble for buckets 0..8 and the high 16 bytes for
//! buckets 8..16. Slim Teddy has 8 buckets and mirrors the low half into the
//! high half.

pub(crate) const MAX_MASKS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Masks {
    pub(crate) lo: [[u8; 32]; MAX_MASKS],
    pub(crate) hi: [[u8; 32]; MAX_MASKS],
    pub(crate) count: usize,
    fat: bool,
}

impl Masks {
    /// Fingerprint the first `count` bytes of every pattern into its bucket's bit.
    pub(crate) fn build(
        patterns: &[Vec<u8>],
        buckets: &[Vec<usize>],
        count: usize,
        fat: bool,
    ) -> Self {
        let mut masks = Self {
            lo: [[0; 32]; MAX_MASKS],
            hi: [[0; 32]; MAX_MASKS],
            count: count.min(MAX_MASKS),
            fat,
        };
        for (bucket, ids) in buckets.iter().enumerate() {
            for pattern in ids.iter().filter_map(|&id| patterns.get(id)) {
                for (k, &byte) in pattern.iter().take(masks.count).enumerate() {
                    masks.add(k, byte, bucket);
                }
            }
        }
        masks
    }

    #[allow(
        clippy::indexing_slicing,
        reason = "k < MAX_MASKS and nibble + 16 < 32"
    )]
    fn add(&mut self, k: usize, byte: u8, bucket: usize) {
        let lo_nibble = usize::from(byte & 0x0f);
        let hi_nibble = usize::from(byte >> 4);
        if self.fat {
            let half = if bucket < 8 { 0 } else { 16 };
            let bit = 1u8 << (bucket % 8);
            self.lo[k][lo_nibble + half] |= bit;
            self.hi[k][hi_nibble + half] |= bit;
        } else {
            let bit = 1u8 << bucket;
            for half in [0, 16] {
                self.lo[k][lo_nibble + half] |= bit;
                self.hi[k][hi_nibble + half] |= bit;
            }
        }
    }

    /// Candidate bucket bits for a match starting at `pos`.
    ///
    /// Scalar twin of the shuffle kernels. Zero when any fingerprinted byte is
    /// past the end of `haystack`.
    #[allow(clippy::indexing_slicing, reason = "k < MAX_MASKS and nibble + 16 < 32")]
    pub(crate) fn candidates(&self, haystack: &[u8], pos: usize) -> u16 {
        let mut bits = u16::MAX;
        for k in 0..self.count {
            let Some(&byte) = haystack.get(pos + k) else {
                return 0;
            };
            let lo_nibble = usize::from(byte & 0x0f);
            let hi_nibble = usize::from(byte >> 4);
            let low = u16::from(self.lo[k][lo_nibble] & self.hi[k][hi_nibble]);
            let high = if self.fat {
                u16::from(self.lo[k][lo_nibble + 16] & self.hi[k][hi_nibble + 16]) << 8
            } else {
                0
            };
            bits &= low | high;
            if bits == 0 {
                return 0;
            }
        }
        bits
    }
}
