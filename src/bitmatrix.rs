//! `BitMatrix`: an m×n GF(2) matrix, one aligned allocation, row-addressable.
//!
//! This is the owner type; [`crate::bitblock::BitBlock`] is a `BitMatrix` with
//! `n_rows == 1`. See SPEC_FULL.md §3/§4.1.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::CoreError;
use crate::prng::PrngStream;

/// Machine word width in bits. Fixed at 64 for every shape this crate allocates.
pub const W: usize = 64;

fn n_limbs(n_cols: usize) -> usize {
    n_cols.div_ceil(W)
}

/// 16 or 32, per SPEC_FULL.md §3: 32 when the row holds at least 256 bits, else 16.
fn alignment_tag(limbs: usize) -> usize {
    if limbs * W >= 256 {
        32
    } else {
        16
    }
}

fn high_bitmask(n_cols: usize) -> u64 {
    let rem = n_cols % W;
    if rem == 0 {
        u64::MAX
    } else {
        (1u64 << rem) - 1
    }
}

/// Row stride in limbs, padded so consecutive rows begin at a multiple of
/// `alignment_tag` bytes, given the buffer's base is itself aligned.
fn row_stride(limbs: usize, alignment: usize) -> usize {
    let alignment_limbs = alignment / 8;
    limbs.div_ceil(alignment_limbs) * alignment_limbs
}

/// An m×n GF(2) matrix backed by a single aligned allocation of `u64` limbs.
///
/// Invariant B1: for every row, limbs beyond `n_limbs` are never written by any public
/// method, and the final limb's bits outside `high_bitmask` are always zero after any
/// primitive returns.
/// Invariant B2: the backing buffer starts at an address that is a multiple of
/// `alignment_tag()`.
pub struct BitMatrix {
    ptr: NonNull<u64>,
    layout: Layout,
    n_rows: usize,
    n_cols: usize,
    n_limbs: usize,
    row_stride: usize,
    high_bitmask: u64,
    alignment_tag: usize,
}

// SAFETY: BitMatrix owns its buffer exclusively; it carries no interior mutability and
// is Send/Sync exactly like a `Vec<u64>` would be.
unsafe impl Send for BitMatrix {}
unsafe impl Sync for BitMatrix {}

impl BitMatrix {
    /// Allocate a new, zero-initialized `n_rows × n_cols` matrix.
    ///
    /// There is no "skip the zero-fill" variant (see DESIGN.md, Open Question 1): every
    /// call site that would want one immediately overwrites the whole buffer anyway.
    pub fn new(n_rows: usize, n_cols: usize) -> Result<Self, CoreError> {
        assert!(n_rows > 0, "BitMatrix must have at least one row");
        let limbs = n_limbs(n_cols);
        let alignment = alignment_tag(limbs);
        let stride = row_stride(limbs, alignment);
        let total_limbs = n_rows
            .checked_mul(stride)
            .expect("row_stride * n_rows overflow");
        let layout = Layout::from_size_align(total_limbs * 8, alignment)
            .expect("layout computed from checked dimensions is always valid");

        // SAFETY: layout has non-zero size (n_rows, n_cols are both > 0 in every
        // accepted call) and a valid power-of-two alignment from `alignment_tag`.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut u64).ok_or(CoreError::AllocationFailure(layout))?;

        Ok(Self {
            ptr,
            layout,
            n_rows,
            n_cols,
            n_limbs: limbs,
            row_stride: stride,
            high_bitmask: high_bitmask(n_cols),
            alignment_tag: alignment,
        })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn n_limbs(&self) -> usize {
        self.n_limbs
    }

    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    #[inline]
    pub fn high_bitmask(&self) -> u64 {
        self.high_bitmask
    }

    #[inline]
    pub fn alignment_tag(&self) -> usize {
        self.alignment_tag
    }

    /// Whole backing buffer, `n_rows * row_stride` limbs, including row padding.
    #[inline]
    fn buffer(&self) -> &[u64] {
        // SAFETY: `ptr` was allocated for exactly `n_rows * row_stride` limbs and is
        // valid for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.n_rows * self.row_stride) }
    }

    #[inline]
    fn buffer_mut(&mut self) -> &mut [u64] {
        // SAFETY: see `buffer`; `&mut self` guarantees exclusive access.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.n_rows * self.row_stride)
        }
    }

    /// The `n_limbs` valid limbs of row `index` (the row's padding, if any, is excluded).
    #[inline]
    pub fn row(&self, index: usize) -> &[u64] {
        debug_assert!(index < self.n_rows);
        let start = index * self.row_stride;
        &self.buffer()[start..start + self.n_limbs]
    }

    #[inline]
    pub fn row_mut(&mut self, index: usize) -> &mut [u64] {
        debug_assert!(index < self.n_rows);
        let stride = self.row_stride;
        let limbs = self.n_limbs;
        let start = index * stride;
        &mut self.buffer_mut()[start..start + limbs]
    }

    /// Copy `src` into `self`, row by row.
    ///
    /// `self.n_cols()` must equal `src.n_cols()` and `self.n_rows()` must be at least
    /// `src.n_rows()`. When the strides agree, a single bulk copy is used; otherwise
    /// each row is copied independently.
    pub fn copy_from(&mut self, src: &BitMatrix) -> Result<(), CoreError> {
        if self.n_cols != src.n_cols {
            return Err(CoreError::dimension_mismatch("BitMatrix::copy_from", src.n_cols, self.n_cols));
        }
        if self.n_rows < src.n_rows {
            return Err(CoreError::dimension_mismatch(
                "BitMatrix::copy_from rows",
                format!(">= {}", src.n_rows),
                self.n_rows,
            ));
        }

        if self.row_stride == src.row_stride {
            let len = src.n_rows * src.row_stride;
            self.buffer_mut()[..len].copy_from_slice(&src.buffer()[..len]);
        } else {
            for i in 0..src.n_rows {
                let limbs = self.n_limbs;
                self.row_mut(i).copy_from_slice(&src.row(i)[..limbs]);
            }
        }
        Ok(())
    }

    /// Fill every row with fresh randomness from `rng`, then restore invariant B1 by
    /// masking the final limb of each row.
    pub fn randomize(&mut self, rng: &mut impl PrngStream) {
        let n_limbs = self.n_limbs;
        let mask = self.high_bitmask;
        let mut byte_buf = vec![0u8; n_limbs * 8];
        for r in 0..self.n_rows {
            rng.fill(&mut byte_buf);
            let row = self.row_mut(r);
            for (limb, chunk) in row.iter_mut().zip(byte_buf.chunks_exact(8)) {
                *limb = u64::from_le_bytes(chunk.try_into().expect("chunk is exactly 8 bytes"));
            }
            row[n_limbs - 1] &= mask;
        }
    }
}

impl Clone for BitMatrix {
    fn clone(&self) -> Self {
        let mut out = BitMatrix::new(self.n_rows, self.n_cols)
            .expect("cloning an existing, already-allocated matrix cannot fail to allocate");
        out.copy_from(self).expect("shapes match by construction");
        out
    }
}

impl PartialEq for BitMatrix {
    fn eq(&self, other: &Self) -> bool {
        crate::gf2::equal_matrix(self, other)
    }
}

impl Drop for BitMatrix {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`layout` are exactly what `alloc_zeroed` returned in `new`.
        unsafe {
            alloc::dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

impl std::fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitMatrix")
            .field("n_rows", &self.n_rows)
            .field("n_cols", &self.n_cols)
            .field("alignment_tag", &self.alignment_tag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_matches_size_threshold() {
        let small = BitMatrix::new(1, 128).unwrap(); // 2 limbs -> 16 bytes
        assert_eq!(small.alignment_tag(), 16);
        let big = BitMatrix::new(1, 256).unwrap(); // 4 limbs -> 32 bytes
        assert_eq!(big.alignment_tag(), 32);
    }

    #[test]
    fn high_bitmask_partial_limb() {
        let m = BitMatrix::new(1, 60).unwrap();
        assert_eq!(m.high_bitmask(), 0x0FFF_FFFF_FFFF_FFFF);
        let exact = BitMatrix::new(1, 64).unwrap();
        assert_eq!(exact.high_bitmask(), u64::MAX);
    }

    #[test]
    fn new_matrix_is_zeroed() {
        let m = BitMatrix::new(3, 200).unwrap();
        for r in 0..3 {
            assert!(m.row(r).iter().all(|&limb| limb == 0));
        }
    }

    #[test]
    fn copy_from_rejects_column_mismatch() {
        let mut dst = BitMatrix::new(1, 64).unwrap();
        let src = BitMatrix::new(1, 128).unwrap();
        assert!(matches!(dst.copy_from(&src), Err(CoreError::DimensionMismatch { .. })));
    }

    #[test]
    fn copy_from_round_trips_rows() {
        let mut src = BitMatrix::new(2, 128).unwrap();
        src.row_mut(0)[0] = 0xDEAD_BEEF;
        src.row_mut(1)[1] = 0xCAFE_F00D;
        let mut dst = BitMatrix::new(2, 128).unwrap();
        dst.copy_from(&src).unwrap();
        assert_eq!(dst.row(0)[0], 0xDEAD_BEEF);
        assert_eq!(dst.row(1)[1], 0xCAFE_F00D);
    }
}
