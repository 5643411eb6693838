//! 3-of-3 additive secret sharing over GF(2) (SPEC_FULL.md §5).
//!
//! A [`ShareTriple`] holds one share per simulated party. Linear operations (XOR, AND
//! with a public constant, shift, multiply by a public matrix on either side, add a
//! public constant, copy) can be applied independently to each share — that's what
//! this module lifts. The one non-linear operation, AND of two *secret* values, needs
//! the parties to exchange information and lives in [`crate::mpc`] instead.

use crate::bitblock::BitBlock;
use crate::bitmatrix::BitMatrix;
use crate::cpu::KernelPreference;
use crate::error::CoreError;
use crate::gf2;
use crate::prng::PrngStream;

/// Which party's share a public-constant addition lands on. Spelled out as an enum
/// rather than a party index (DESIGN.md, Open Question 3) so a caller can't pass an
/// out-of-range index for a 3-party scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartySlot {
    Party0,
    PartyLast,
}

/// Three additive shares of one secret `BitBlock`: `reconstruct` XORs them back
/// together.
#[derive(Clone, Debug)]
pub struct ShareTriple {
    pub shares: [BitBlock; 3],
}

impl ShareTriple {
    fn new_zeroed(n_cols: usize) -> Result<Self, CoreError> {
        Ok(Self {
            shares: [BitBlock::new(n_cols)?, BitBlock::new(n_cols)?, BitBlock::new(n_cols)?],
        })
    }

    pub fn n_cols(&self) -> usize {
        self.shares[0].n_cols()
    }

    /// Copy `src`'s three shares into `self`, share by share. Mirrors
    /// `BitBlock::copy_from`/`BitMatrix::copy_from`'s in-place contract rather than
    /// allocating a new triple (use `.clone()` for that).
    pub fn copy_from(&mut self, src: &ShareTriple) -> Result<(), CoreError> {
        for i in 0..3 {
            self.shares[i].copy_from(&src.shares[i])?;
        }
        Ok(())
    }

    /// `self ^= other`, share by share.
    pub fn xor_assign(&mut self, other: &ShareTriple, pref: KernelPreference) -> Result<(), CoreError> {
        for i in 0..3 {
            let mut tmp = BitBlock::new(self.n_cols())?;
            gf2::xor(&mut tmp, &self.shares[i], &other.shares[i], pref)?;
            self.shares[i].copy_from(&tmp)?;
        }
        Ok(())
    }

    /// `self *= a_t` (public matrix, right form), share by share: each share of the
    /// product is the same public matrix applied to the corresponding share of the
    /// input, since matrix multiplication over GF(2) is linear. `a_t` is the caller's
    /// matrix in the transpose convention `gf2::mul_v` expects — this is the form the
    /// key schedule uses.
    pub fn mul_v_assign(&mut self, a_t: &BitMatrix, pref: KernelPreference) -> Result<(), CoreError> {
        for i in 0..3 {
            let mut tmp = BitBlock::new(a_t.n_cols())?;
            gf2::mul_v(&mut tmp, &self.shares[i], a_t, pref)?;
            self.shares[i] = tmp;
        }
        Ok(())
    }

    /// `self *= a` (public matrix, left form), share by share: the dual of
    /// `mul_v_assign`, applied identically per-share for the same linearity reason.
    /// `a` is supplied in the transpose convention the LowMC affine/linear layer
    /// already stores its round matrix in, as opposed to `mul_v_assign`'s key-schedule
    /// convention — both reduce to the same `gf2::mul_v` row-selection kernel.
    pub fn left_mul_v_assign(&mut self, a: &BitMatrix, pref: KernelPreference) -> Result<(), CoreError> {
        for i in 0..3 {
            let mut tmp = BitBlock::new(a.n_cols())?;
            gf2::mul_v(&mut tmp, &self.shares[i], a, pref)?;
            self.shares[i] = tmp;
        }
        Ok(())
    }

    /// `self >>= k`, share by share.
    pub fn shr_assign(&mut self, k: usize) -> Result<(), CoreError> {
        for i in 0..3 {
            let mut tmp = BitBlock::new(self.n_cols())?;
            gf2::shr(&mut tmp, &self.shares[i], k)?;
            self.shares[i].copy_from(&tmp)?;
        }
        Ok(())
    }

    /// `self <<= k`, share by share.
    pub fn shl_assign(&mut self, k: usize) -> Result<(), CoreError> {
        for i in 0..3 {
            let mut tmp = BitBlock::new(self.n_cols())?;
            gf2::shl(&mut tmp, &self.shares[i], k)?;
            self.shares[i].copy_from(&tmp)?;
        }
        Ok(())
    }

    /// XOR a *public* constant into exactly one share. Adding it to any single share
    /// changes the reconstructed value by `c`; which share receives it is a protocol
    /// choice, not a correctness requirement, hence the explicit [`PartySlot`].
    pub fn add_const(&mut self, c: &BitBlock, slot: PartySlot, pref: KernelPreference) -> Result<(), CoreError> {
        let idx = match slot {
            PartySlot::Party0 => 0,
            PartySlot::PartyLast => 2,
        };
        let mut tmp = BitBlock::new(self.n_cols())?;
        gf2::xor(&mut tmp, &self.shares[idx], c, pref)?;
        self.shares[idx].copy_from(&tmp)?;
        Ok(())
    }

    /// AND a *public* constant mask into every share. Valid for the same reason
    /// `add_const` is: AND-with-a-public-constant is linear over the additive sharing,
    /// so each share of `self & c` is just that share ANDed with `c`, independently.
    pub fn and_const(&mut self, c: &BitBlock, pref: KernelPreference) -> Result<(), CoreError> {
        for i in 0..3 {
            let mut tmp = BitBlock::new(self.n_cols())?;
            gf2::and(&mut tmp, &self.shares[i], c, pref)?;
            self.shares[i].copy_from(&tmp)?;
        }
        Ok(())
    }
}

/// XOR all three shares back into the plaintext value they represent.
pub fn reconstruct(shares: &ShareTriple, pref: KernelPreference) -> Result<BitBlock, CoreError> {
    let mut acc = BitBlock::new(shares.n_cols())?;
    gf2::xor(&mut acc, &shares.shares[0], &shares.shares[1], pref)?;
    let mut out = BitBlock::new(shares.n_cols())?;
    gf2::xor(&mut out, &acc, &shares.shares[2], pref)?;
    Ok(out)
}

/// Split `v` into three shares: the first two are drawn independently from `rng0` and
/// `rng1`, the third is whatever makes the triple reconstruct to `v`.
pub fn init_share_vector(
    v: &BitBlock,
    rng0: &mut impl PrngStream,
    rng1: &mut impl PrngStream,
) -> Result<ShareTriple, CoreError> {
    let mut triple = ShareTriple::new_zeroed(v.n_cols())?;
    triple.shares[0].randomize(rng0);
    triple.shares[1].randomize(rng1);
    let mut masked = BitBlock::new(v.n_cols())?;
    gf2::xor(&mut masked, v, &triple.shares[0], KernelPreference::AutoDetect)?;
    gf2::xor(&mut triple.shares[2], &masked, &triple.shares[1], KernelPreference::AutoDetect)?;
    Ok(triple)
}

/// Share a value that is already public: all mass on party 0, the other two shares
/// zero. Every party can compute this locally without talking to anyone.
pub fn init_plain_share_vector(v: &BitBlock) -> Result<ShareTriple, CoreError> {
    let mut triple = ShareTriple::new_zeroed(v.n_cols())?;
    triple.shares[0].copy_from(v)?;
    Ok(triple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Aes128CtrPrng;

    #[test]
    fn reconstruct_recovers_original() {
        let mut v = BitBlock::new(128).unwrap();
        v.limbs_mut()[0] = 0xDEAD_BEEF_CAFE_F00D;
        v.limbs_mut()[1] = 0x1122_3344_5566_7788;
        let mut rng0 = Aes128CtrPrng::new([11u8; 16]);
        let mut rng1 = Aes128CtrPrng::new([22u8; 16]);
        let triple = init_share_vector(&v, &mut rng0, &mut rng1).unwrap();
        let back = reconstruct(&triple, KernelPreference::AutoDetect).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn plain_share_reconstructs_to_itself() {
        let mut v = BitBlock::new(64).unwrap();
        v.limbs_mut()[0] = 0xABCD;
        let triple = init_plain_share_vector(&v).unwrap();
        assert_eq!(triple.shares[1].limbs()[0], 0);
        assert_eq!(triple.shares[2].limbs()[0], 0);
        let back = reconstruct(&triple, KernelPreference::AutoDetect).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn add_const_shifts_reconstructed_value_by_constant() {
        let mut v = BitBlock::new(64).unwrap();
        v.limbs_mut()[0] = 0xF0F0;
        let mut rng0 = Aes128CtrPrng::new([1u8; 16]);
        let mut rng1 = Aes128CtrPrng::new([2u8; 16]);
        let mut triple = init_share_vector(&v, &mut rng0, &mut rng1).unwrap();
        let mut c = BitBlock::new(64).unwrap();
        c.limbs_mut()[0] = 0x0F0F;
        triple.add_const(&c, PartySlot::Party0, KernelPreference::AutoDetect).unwrap();
        let back = reconstruct(&triple, KernelPreference::AutoDetect).unwrap();
        assert_eq!(back.limbs()[0], 0xFFFF);
    }

    #[test]
    fn xor_assign_adds_secrets() {
        let mut a = BitBlock::new(64).unwrap();
        a.limbs_mut()[0] = 0x1234;
        let mut b = BitBlock::new(64).unwrap();
        b.limbs_mut()[0] = 0x5678;
        let mut rng0 = Aes128CtrPrng::new([5u8; 16]);
        let mut rng1 = Aes128CtrPrng::new([6u8; 16]);
        let mut ta = init_share_vector(&a, &mut rng0, &mut rng1).unwrap();
        let tb = init_plain_share_vector(&b).unwrap();
        ta.xor_assign(&tb, KernelPreference::AutoDetect).unwrap();
        let back = reconstruct(&ta, KernelPreference::AutoDetect).unwrap();
        assert_eq!(back.limbs()[0], 0x1234 ^ 0x5678);
    }

    #[test]
    fn and_const_masks_reconstructed_value() {
        let mut v = BitBlock::new(64).unwrap();
        v.limbs_mut()[0] = 0xFFFF_0000_FFFF_0000;
        let mut rng0 = Aes128CtrPrng::new([9u8; 16]);
        let mut rng1 = Aes128CtrPrng::new([10u8; 16]);
        let mut triple = init_share_vector(&v, &mut rng0, &mut rng1).unwrap();
        let mut mask = BitBlock::new(64).unwrap();
        mask.limbs_mut()[0] = 0x0000_FFFF_0000_FFFF;
        triple.and_const(&mask, KernelPreference::AutoDetect).unwrap();
        let back = reconstruct(&triple, KernelPreference::AutoDetect).unwrap();
        assert_eq!(back.limbs()[0], 0xFFFF_0000_FFFF_0000 & 0x0000_FFFF_0000_FFFF);
    }

    #[test]
    fn left_mul_v_assign_matches_plaintext_multiply() {
        let n = 64;
        let mut identity = BitMatrix::new(n, n).unwrap();
        for i in 0..n {
            identity.row_mut(i)[0] = 1u64 << i;
        }
        let mut v = BitBlock::new(n).unwrap();
        v.limbs_mut()[0] = 0xDEAD_BEEF_0000_0001;
        let mut triple = init_plain_share_vector(&v).unwrap();
        triple.left_mul_v_assign(&identity, KernelPreference::ForceScalar).unwrap();
        let back = reconstruct(&triple, KernelPreference::AutoDetect).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn copy_from_duplicates_all_three_shares() {
        let mut v = BitBlock::new(64).unwrap();
        v.limbs_mut()[0] = 0xABCD_EF01;
        let src = init_plain_share_vector(&v).unwrap();
        let mut dst = ShareTriple::new_zeroed(64).unwrap();
        dst.copy_from(&src).unwrap();
        for i in 0..3 {
            assert_eq!(dst.shares[i], src.shares[i]);
        }
    }

    #[test]
    fn clone_is_independent_of_source() {
        let v = {
            let mut b = BitBlock::new(64).unwrap();
            b.limbs_mut()[0] = 0x1111_2222;
            b
        };
        let src = init_plain_share_vector(&v).unwrap();
        let mut cloned = src.clone();
        let delta = {
            let mut b = BitBlock::new(64).unwrap();
            b.limbs_mut()[0] = 0xFFFF_FFFF;
            b
        };
        cloned.xor_assign(&init_plain_share_vector(&delta).unwrap(), KernelPreference::AutoDetect).unwrap();
        assert_eq!(reconstruct(&cloned, KernelPreference::AutoDetect).unwrap().limbs()[0], 0x1111_2222 ^ 0xFFFF_FFFF);
        assert_eq!(reconstruct(&src, KernelPreference::AutoDetect).unwrap(), v);
    }
}
