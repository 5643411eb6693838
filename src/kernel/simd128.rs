//! SSE2 / SSE4.1 kernels (128-bit lanes, 2 limbs per vector).
//!
//! Each primitive is a `#[target_feature]`-gated unsafe worker behind a safe public
//! wrapper, with a scalar tail for any limbs left over once the vectorized prefix is
//! exhausted. Preconditions (dispatch already checked `n_cols mod 64 == 0` etc., per
//! SPEC_FULL.md §4.2) mean every call here processes a whole number of 2-limb blocks;
//! the tail handling below exists only for `equal`, whose precondition is looser (no
//! alignment-to-128 requirement).

use std::arch::x86_64::*;

use crate::bitmatrix::BitMatrix;

/// # Safety
/// Caller must have verified SSE2 is available (checked once by `cpu::features()`
/// before this kernel is ever selected).
#[target_feature(enable = "sse2")]
unsafe fn xor_inner(dst: &mut [u64], a: &[u64], b: &[u64]) {
    let n = dst.len();
    let blocks = n / 2;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 2;
            let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let r = _mm_xor_si128(va, vb);
            _mm_storeu_si128(dst.as_mut_ptr().add(i) as *mut __m128i, r);
        }
        for i in blocks * 2..n {
            dst[i] = a[i] ^ b[i];
        }
    }
}

pub fn xor(dst: &mut [u64], a: &[u64], b: &[u64]) {
    // SAFETY: dispatch only routes here after `cpu::features().sse2` is true.
    unsafe { xor_inner(dst, a, b) }
}

#[target_feature(enable = "sse2")]
unsafe fn and_inner(dst: &mut [u64], a: &[u64], b: &[u64]) {
    let n = dst.len();
    let blocks = n / 2;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 2;
            let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let r = _mm_and_si128(va, vb);
            _mm_storeu_si128(dst.as_mut_ptr().add(i) as *mut __m128i, r);
        }
        for i in blocks * 2..n {
            dst[i] = a[i] & b[i];
        }
    }
}

pub fn and(dst: &mut [u64], a: &[u64], b: &[u64]) {
    // SAFETY: see `xor`.
    unsafe { and_inner(dst, a, b) }
}

#[target_feature(enable = "sse2")]
unsafe fn equal_sse2_inner(a: &[u64], b: &[u64]) -> bool {
    let n = a.len();
    let blocks = n / 2;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 2;
            let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let cmp = _mm_cmpeq_epi8(va, vb);
            if _mm_movemask_epi8(cmp) != 0xFFFF {
                return false;
            }
        }
    }
    a[blocks * 2..] == b[blocks * 2..]
}

#[target_feature(enable = "sse4.1")]
unsafe fn equal_sse41_inner(a: &[u64], b: &[u64]) -> bool {
    let n = a.len();
    let blocks = n / 2;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 2;
            let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let x = _mm_xor_si128(va, vb);
            // _mm_testz_si128(x, x) is nonzero iff x is all-zero, i.e. va == vb.
            if _mm_testz_si128(x, x) == 0 {
                return false;
            }
        }
    }
    a[blocks * 2..] == b[blocks * 2..]
}

/// `have_sse41` selects between the PTEST-based compare (SSE4.1) and the
/// cmpeq+movemask compare (plain SSE2), per SPEC_FULL.md §4.2's "richer 128-bit
/// equality instruction" note.
pub fn equal(a: &[u64], b: &[u64], have_sse41: bool) -> bool {
    // SAFETY: caller (the `equal` dispatcher in `kernel::mod`) only sets
    // `have_sse41` after confirming the feature, and only calls this function at all
    // after confirming sse2.
    unsafe {
        if have_sse41 {
            equal_sse41_inner(a, b)
        } else {
            equal_sse2_inner(a, b)
        }
    }
}

#[target_feature(enable = "sse2")]
unsafe fn xor_row_inner(c: &mut [u64], row: &[u64]) {
    let n = c.len();
    let blocks = n / 2;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 2;
            let vc = _mm_loadu_si128(c.as_ptr().add(i) as *const __m128i);
            let vr = _mm_loadu_si128(row.as_ptr().add(i) as *const __m128i);
            let r = _mm_xor_si128(vc, vr);
            _mm_storeu_si128(c.as_mut_ptr().add(i) as *mut __m128i, r);
        }
        for i in blocks * 2..n {
            c[i] ^= row[i];
        }
    }
}

#[inline]
fn xor_row(c: &mut [u64], row: &[u64]) {
    // SAFETY: only reached once dispatch has confirmed sse2.
    unsafe { xor_row_inner(c, row) }
}

/// Same nibble-jump control flow as `scalar::addmul_v`, with the per-row XOR
/// vectorized over 128-bit lanes.
pub fn addmul_v(c: &mut [u64], v: &[u64], a_t: &BitMatrix) {
    for (limb_i, &vlimb) in v.iter().enumerate() {
        let base = limb_i * 64;
        let mut remaining = vlimb;
        let mut offset = 0usize;
        while remaining != 0 {
            let nibble = remaining & 0xF;
            let r0 = base + offset;
            match nibble {
                0 => {}
                1 => xor_row(c, a_t.row(r0)),
                2 => xor_row(c, a_t.row(r0 + 1)),
                3 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 1));
                }
                4 => xor_row(c, a_t.row(r0 + 2)),
                5 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 2));
                }
                6 => {
                    xor_row(c, a_t.row(r0 + 1));
                    xor_row(c, a_t.row(r0 + 2));
                }
                7 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 1));
                    xor_row(c, a_t.row(r0 + 2));
                }
                8 => xor_row(c, a_t.row(r0 + 3)),
                9 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 3));
                }
                10 => {
                    xor_row(c, a_t.row(r0 + 1));
                    xor_row(c, a_t.row(r0 + 3));
                }
                11 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 1));
                    xor_row(c, a_t.row(r0 + 3));
                }
                12 => {
                    xor_row(c, a_t.row(r0 + 2));
                    xor_row(c, a_t.row(r0 + 3));
                }
                13 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 2));
                    xor_row(c, a_t.row(r0 + 3));
                }
                14 => {
                    xor_row(c, a_t.row(r0 + 1));
                    xor_row(c, a_t.row(r0 + 2));
                    xor_row(c, a_t.row(r0 + 3));
                }
                15 => {
                    xor_row(c, a_t.row(r0));
                    xor_row(c, a_t.row(r0 + 1));
                    xor_row(c, a_t.row(r0 + 2));
                    xor_row(c, a_t.row(r0 + 3));
                }
                _ => unreachable!("nibble is 4 bits"),
            }
            remaining >>= 4;
            offset += 4;
        }
    }
}
