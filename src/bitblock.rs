//! `BitBlock`: a 1×n GF(2) row vector. A thin, single-row specialization of
//! [`BitMatrix`] — see SPEC_FULL.md §3.

use crate::bitmatrix::BitMatrix;
use crate::error::CoreError;
use crate::prng::PrngStream;

#[derive(Clone, Debug)]
pub struct BitBlock(BitMatrix);

impl BitBlock {
    pub fn new(n_cols: usize) -> Result<Self, CoreError> {
        Ok(Self(BitMatrix::new(1, n_cols)?))
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.0.n_cols()
    }

    #[inline]
    pub fn n_limbs(&self) -> usize {
        self.0.n_limbs()
    }

    #[inline]
    pub fn high_bitmask(&self) -> u64 {
        self.0.high_bitmask()
    }

    #[inline]
    pub fn alignment_tag(&self) -> usize {
        self.0.alignment_tag()
    }

    #[inline]
    pub fn limbs(&self) -> &[u64] {
        self.0.row(0)
    }

    #[inline]
    pub fn limbs_mut(&mut self) -> &mut [u64] {
        self.0.row_mut(0)
    }

    pub fn copy_from(&mut self, src: &BitBlock) -> Result<(), CoreError> {
        self.0.copy_from(&src.0)
    }

    pub fn randomize(&mut self, rng: &mut impl PrngStream) {
        self.0.randomize(rng);
    }

    pub(crate) fn as_matrix(&self) -> &BitMatrix {
        &self.0
    }

    pub(crate) fn as_matrix_mut(&mut self) -> &mut BitMatrix {
        &mut self.0
    }
}

impl PartialEq for BitBlock {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_is_zero_and_masked() {
        let b = BitBlock::new(60).unwrap();
        assert_eq!(b.n_limbs(), 1);
        assert_eq!(b.high_bitmask(), 0x0FFF_FFFF_FFFF_FFFF);
        assert_eq!(b.limbs()[0], 0);
    }

    #[test]
    fn copy_from_matches_source() {
        let mut a = BitBlock::new(128).unwrap();
        a.limbs_mut()[0] = 0x1234;
        a.limbs_mut()[1] = 0x5678;
        let mut b = BitBlock::new(128).unwrap();
        b.copy_from(&a).unwrap();
        assert_eq!(b, a);
    }
}
