//! AVX2 kernels (256-bit lanes, 4 limbs per vector).
//!
//! Same shape as `simd128`, one tier wider. Only reached once `cpu::select_*` has
//! confirmed both AVX2 availability and the stricter structural preconditions
//! (`n_cols >= 256`, `n_cols mod 256 == 0` for `mul_v`) from SPEC_FULL.md §4.2.

use std::arch::x86_64::*;

use crate::bitmatrix::BitMatrix;

#[target_feature(enable = "avx2")]
unsafe fn xor_inner(dst: &mut [u64], a: &[u64], b: &[u64]) {
    let n = dst.len();
    let blocks = n / 4;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 4;
            let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
            let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
            let r = _mm256_xor_si256(va, vb);
            _mm256_storeu_si256(dst.as_mut_ptr().add(i) as *mut __m256i, r);
        }
        for i in blocks * 4..n {
            dst[i] = a[i] ^ b[i];
        }
    }
}

pub fn xor(dst: &mut [u64], a: &[u64], b: &[u64]) {
    // SAFETY: dispatch only routes here after `cpu::features().avx2` is true.
    unsafe { xor_inner(dst, a, b) }
}

#[target_feature(enable = "avx2")]
unsafe fn and_inner(dst: &mut [u64], a: &[u64], b: &[u64]) {
    let n = dst.len();
    let blocks = n / 4;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 4;
            let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
            let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
            let r = _mm256_and_si256(va, vb);
            _mm256_storeu_si256(dst.as_mut_ptr().add(i) as *mut __m256i, r);
        }
        for i in blocks * 4..n {
            dst[i] = a[i] & b[i];
        }
    }
}

pub fn and(dst: &mut [u64], a: &[u64], b: &[u64]) {
    // SAFETY: see `xor`.
    unsafe { and_inner(dst, a, b) }
}

#[target_feature(enable = "avx2")]
unsafe fn equal_inner(a: &[u64], b: &[u64]) -> bool {
    let n = a.len();
    let blocks = n / 4;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 4;
            let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
            let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
            let x = _mm256_xor_si256(va, vb);
            // _mm256_testz_si256(x, x) is nonzero iff x is all-zero.
            if _mm256_testz_si256(x, x) == 0 {
                return false;
            }
        }
    }
    a[blocks * 4..] == b[blocks * 4..]
}

pub fn equal(a: &[u64], b: &[u64]) -> bool {
    // SAFETY: dispatch only routes here after `cpu::features().avx2` is true.
    unsafe { equal_inner(a, b) }
}

#[target_feature(enable = "avx2")]
unsafe fn xor_row_inner(c: &mut [u64], row: &[u64]) {
    let n = c.len();
    let blocks = n / 4;
    unsafe {
        for blk in 0..blocks {
            let i = blk * 4;
            let vc = _mm256_loadu_si256(c.as_ptr().add(i) as *const __m256i);
            let vr = _mm256_loadu_si256(row.as_ptr().add(i) as *const __m256i);
            let r = _mm256_xor_si256(vc, vr);
            _mm256_storeu_si256(c.as_mut_ptr().add(i) as *mut __m256i, r);
        }
        for i in blocks * 4..n {
            c[i] ^= row[i];
        }
    }
}

#[inline]
fn xor_row(c: &mut [u64], row: &[u64]) {
    // SAFETY: only reached once dispatch has confirmed avx2.
    unsafe { xor_row_inner(c, row) }
}

/// Same nibble-jump control flow as `scalar::addmul_v`, with the per-row XOR
/// vectorized over 256-bit lanes.
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
