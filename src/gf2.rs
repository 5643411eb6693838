//! Public GF(2) dispatch API: picks a kernel tier per [`crate::cpu`]'s table and
//! forwards to [`crate::kernel`]. Every op here validates shapes first (SPEC_FULL.md
//! invariant checks are call-site responsibilities, not kernel ones) and returns
//! `CoreError` rather than panicking on a caller mistake.

use crate::bitblock::BitBlock;
use crate::bitmatrix::BitMatrix;
use crate::cpu::{self, KernelLevel, KernelPreference};
use crate::error::CoreError;
use crate::kernel::scalar;
#[cfg(target_arch = "x86_64")]
use crate::kernel::{simd128, simd256};

fn check_cols(a: usize, b: usize, context: &'static str) -> Result<(), CoreError> {
    if a != b {
        return Err(CoreError::dimension_mismatch(context, a, b));
    }
    Ok(())
}

/// Re-mask `dst`'s final limb. Only the scalar path needs this: SIMD kernels rely on
/// B1 already holding on their inputs and skip it (SPEC_FULL.md §4.2).
fn mask_last_limb(dst: &mut BitBlock) {
    let mask = dst.high_bitmask();
    let last = dst.limbs_mut().len() - 1;
    dst.limbs_mut()[last] &= mask;
}

/// `dst = a ^ b`, all three blocks the same width.
pub fn xor(dst: &mut BitBlock, a: &BitBlock, b: &BitBlock, pref: KernelPreference) -> Result<(), CoreError> {
    check_cols(dst.n_cols(), a.n_cols(), "gf2::xor dst/a")?;
    check_cols(a.n_cols(), b.n_cols(), "gf2::xor a/b")?;
    match cpu::select_bitwise(pref, a.n_cols()) {
        KernelLevel::Scalar => {
            scalar::xor(dst.limbs_mut(), a.limbs(), b.limbs());
            mask_last_limb(dst);
        }
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd128 => simd128::xor(dst.limbs_mut(), a.limbs(), b.limbs()),
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd256 => simd256::xor(dst.limbs_mut(), a.limbs(), b.limbs()),
        #[cfg(not(target_arch = "x86_64"))]
        _ => unreachable!("cpu::select_bitwise never returns a SIMD tier off x86_64"),
    }
    Ok(())
}

/// `dst = a & b`, all three blocks the same width.
pub fn and(dst: &mut BitBlock, a: &BitBlock, b: &BitBlock, pref: KernelPreference) -> Result<(), CoreError> {
    check_cols(dst.n_cols(), a.n_cols(), "gf2::and dst/a")?;
    check_cols(a.n_cols(), b.n_cols(), "gf2::and a/b")?;
    match cpu::select_bitwise(pref, a.n_cols()) {
        KernelLevel::Scalar => {
            scalar::and(dst.limbs_mut(), a.limbs(), b.limbs());
            mask_last_limb(dst);
        }
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd128 => simd128::and(dst.limbs_mut(), a.limbs(), b.limbs()),
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd256 => simd256::and(dst.limbs_mut(), a.limbs(), b.limbs()),
        #[cfg(not(target_arch = "x86_64"))]
        _ => unreachable!("cpu::select_bitwise never returns a SIMD tier off x86_64"),
    }
    Ok(())
}

/// Logical right shift of the whole row by `k` bits. Scalar-only: the dispatch table
/// in SPEC_FULL.md §4.2 gives shift no SIMD tier, since a cross-limb carry makes a
/// vectorized version no cheaper than the word-at-a-time loop.
pub fn shr(dst: &mut BitBlock, v: &BitBlock, k: usize) -> Result<(), CoreError> {
    check_cols(dst.n_cols(), v.n_cols(), "gf2::shr dst/v")?;
    if k >= 64 {
        return Err(CoreError::ContractViolation("shift amount must be < 64"));
    }
    // No re-masking needed: `v`'s final limb is already masked (invariant B1), and a
    // right shift can only clear bits, never set one beyond `high_bitmask`.
    scalar::shr(dst.limbs_mut(), v.limbs(), k);
    Ok(())
}

/// Logical left shift of the whole row by `k` bits.
pub fn shl(dst: &mut BitBlock, v: &BitBlock, k: usize) -> Result<(), CoreError> {
    check_cols(dst.n_cols(), v.n_cols(), "gf2::shl dst/v")?;
    if k >= 64 {
        return Err(CoreError::ContractViolation("shift amount must be < 64"));
    }
    scalar::shl(dst.limbs_mut(), v.limbs(), k);
    mask_last_limb(dst);
    Ok(())
}

/// `a == b`, bit for bit.
pub fn equal(a: &BitBlock, b: &BitBlock, pref: KernelPreference) -> Result<bool, CoreError> {
    check_cols(a.n_cols(), b.n_cols(), "gf2::equal")?;
    Ok(equal_limbs(a.limbs(), b.limbs(), a.n_cols(), pref))
}

fn equal_limbs(a: &[u64], b: &[u64], n_cols: usize, pref: KernelPreference) -> bool {
    match cpu::select_equal(pref, n_cols) {
        KernelLevel::Scalar => scalar::equal(a, b),
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd128 => simd128::equal(a, b, cpu::features_have_sse41()),
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd256 => simd256::equal(a, b),
        #[cfg(not(target_arch = "x86_64"))]
        _ => unreachable!("cpu::select_equal never returns a SIMD tier off x86_64"),
    }
}

/// Row-wise equality over a whole matrix; backs `BitMatrix`'s `PartialEq`.
pub(crate) fn equal_matrix(a: &BitMatrix, b: &BitMatrix) -> bool {
    if a.n_rows() != b.n_rows() || a.n_cols() != b.n_cols() {
        return false;
    }
    (0..a.n_rows()).all(|r| equal_limbs(a.row(r), b.row(r), a.n_cols(), KernelPreference::AutoDetect))
}

/// `out = v * a_t`, where `a_t` holds one row per bit of `v` (its transpose, per
/// SPEC_FULL.md §4.3): zero `out`, then fold in the rows selected by `v`'s set bits.
pub fn mul_v(out: &mut BitBlock, v: &BitBlock, a_t: &BitMatrix, pref: KernelPreference) -> Result<(), CoreError> {
    check_cols(v.n_cols(), a_t.n_rows(), "gf2::mul_v v/a_t rows")?;
    check_cols(out.n_cols(), a_t.n_cols(), "gf2::mul_v out/a_t cols")?;
    for limb in out.limbs_mut() {
        *limb = 0;
    }
    addmul_v(out, v, a_t, pref)
}

/// `out ^= v * a_t`. The 4-bit nibble-jump kernel described in SPEC_FULL.md §4.3,
/// dispatched to whichever tier can vectorize the per-row XOR.
pub fn addmul_v(out: &mut BitBlock, v: &BitBlock, a_t: &BitMatrix, pref: KernelPreference) -> Result<(), CoreError> {
    check_cols(v.n_cols(), a_t.n_rows(), "gf2::addmul_v v/a_t rows")?;
    check_cols(out.n_cols(), a_t.n_cols(), "gf2::addmul_v out/a_t cols")?;
    match cpu::select_mulv(pref, a_t.n_rows(), a_t.n_cols()) {
        KernelLevel::Scalar => scalar::addmul_v(out.limbs_mut(), v.limbs(), a_t),
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd128 => simd128::addmul_v(out.limbs_mut(), v.limbs(), a_t),
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Simd256 => simd256::addmul_v(out.limbs_mut(), v.limbs(), a_t),
        #[cfg(not(target_arch = "x86_64"))]
        _ => unreachable!("cpu::select_mulv never returns a SIMD tier off x86_64"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_rejects_width_mismatch() {
        let mut dst = BitBlock::new(64).unwrap();
        let a = BitBlock::new(64).unwrap();
        let b = BitBlock::new(128).unwrap();
        assert!(matches!(xor(&mut dst, &a, &b, KernelPreference::AutoDetect), Err(CoreError::DimensionMismatch { .. })));
    }

    #[test]
    fn xor_agrees_with_scalar_reference() {
        let mut a = BitBlock::new(300).unwrap();
        let mut b = BitBlock::new(300).unwrap();
        a.limbs_mut().copy_from_slice(&[1, 2, 3, 4, 5][..a.n_limbs()]);
        b.limbs_mut().copy_from_slice(&[9, 8, 7, 6, 5][..b.n_limbs()]);
        let mut forced_scalar = BitBlock::new(300).unwrap();
        let mut auto = BitBlock::new(300).unwrap();
        xor(&mut forced_scalar, &a, &b, KernelPreference::ForceScalar).unwrap();
        xor(&mut auto, &a, &b, KernelPreference::AutoDetect).unwrap();
        assert_eq!(forced_scalar, auto);
    }

    #[test]
    fn shl_then_shr_round_trips_interior_bits() {
        let mut v = BitBlock::new(128).unwrap();
        v.limbs_mut()[0] = 0x0123_4567_89AB_CDEF;
        v.limbs_mut()[1] = 0x1;
        let mut shifted = BitBlock::new(128).unwrap();
        shl(&mut shifted, &v, 5).unwrap();
        let mut back = BitBlock::new(128).unwrap();
        shr(&mut back, &shifted, 5).unwrap();
        assert_eq!(back.limbs()[0], v.limbs()[0]);
    }

    #[test]
    fn mul_v_with_identity_matrix_is_copy() {
        let n = 64;
        let mut identity = BitMatrix::new(n, n).unwrap();
        for i in 0..n {
            identity.row_mut(i)[0] = 1u64 << i;
        }
        let mut v = BitBlock::new(n).unwrap();
        v.limbs_mut()[0] = 0xDEAD_BEEF_0000_0001;
        let mut out = BitBlock::new(n).unwrap();
        mul_v(&mut out, &v, &identity, KernelPreference::ForceScalar).unwrap();
        assert_eq!(out.limbs()[0], v.limbs()[0]);
    }

    /// SPEC_FULL.md §8 concrete scenario 2.
    #[test]
    fn and_masks_final_limb_of_an_unmasked_operand() {
        let mut a = BitBlock::new(60).unwrap();
        a.limbs_mut()[0] = 0xFFFF_FFFF_FFFF_FFFF; // written directly, bypassing B1
        let mut b = BitBlock::new(60).unwrap();
        b.limbs_mut()[0] = 0x0123_4567_89AB_CDEF;
        let mut out = BitBlock::new(60).unwrap();
        and(&mut out, &a, &b, KernelPreference::ForceScalar).unwrap();
        assert_eq!(out.limbs()[0], 0x0123_4567_89AB_CDEF);
        assert_eq!(out.limbs()[0] & !out.high_bitmask(), 0);
    }

    /// Adversarial case scenario 2 alone can't catch (there, the masked operand's top
    /// bits are already zero, so an unmasked AND can't leak anything). Here only one
    /// operand carries a stray set bit past `high_bitmask`, so an unmasked XOR (or an
    /// AND against an all-ones partner) would copy it straight into the output.
    #[test]
    fn and_xor_never_leak_bits_past_high_bitmask() {
        let mut a = BitBlock::new(60).unwrap();
        a.limbs_mut()[0] = 0xFFFF_FFFF_FFFF_FFFF; // stray bits above high_bitmask set
        let b = BitBlock::new(60).unwrap(); // properly zeroed

        let mut xored = BitBlock::new(60).unwrap();
        xor(&mut xored, &a, &b, KernelPreference::ForceScalar).unwrap();
        assert_eq!(xored.limbs()[0] & !xored.high_bitmask(), 0);

        let mut also_unmasked = BitBlock::new(60).unwrap();
        also_unmasked.limbs_mut()[0] = 0xFFFF_FFFF_FFFF_FFFF; // stray bits set here too
        let mut anded = BitBlock::new(60).unwrap();
        and(&mut anded, &a, &also_unmasked, KernelPreference::ForceScalar).unwrap();
        assert_eq!(anded.limbs()[0] & !anded.high_bitmask(), 0);
    }

    /// SPEC_FULL.md §8 concrete scenario 4.
    #[test]
    fn mul_v_selects_and_xors_rows_named_by_set_bits() {
        let mut a_t = BitMatrix::new(5, 64).unwrap();
        for (i, &row_val) in [1u64, 2, 4, 8, 16].iter().enumerate() {
            a_t.row_mut(i)[0] = row_val;
        }
        let mut v = BitBlock::new(5).unwrap();
        v.limbs_mut()[0] = 0b10110;
        let mut out = BitBlock::new(64).unwrap();
        mul_v(&mut out, &v, &a_t, KernelPreference::ForceScalar).unwrap();
        assert_eq!(out.limbs()[0], 2 ^ 4 ^ 16);
    }
}
