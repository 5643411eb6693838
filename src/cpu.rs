//! Runtime CPU feature detection, memoized once.
//!
//! An enum that can be resolved to a concrete kernel level, backed by
//! `is_x86_feature_detected!`. Feature probing is cached process-wide in a `OnceLock`
//! since the GF(2) primitives are called per-bit, far too often to re-probe each time.

use std::sync::OnceLock;

/// Which instruction-set tier a kernel call ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelLevel {
    Scalar,
    Simd128,
    Simd256,
}

/// Caller-selectable override for kernel dispatch.
///
/// `AutoDetect` is the default and the only variant production code should use; the
/// `Force*` variants exist so tests and benchmarks can directly compare kernels on the
/// same input (see SPEC_FULL.md P6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelPreference {
    #[default]
    AutoDetect,
    ForceScalar,
    ForceSse2,
    ForceAvx2,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CpuFeatures {
    pub sse2: bool,
    pub sse41: bool,
    pub avx2: bool,
}

static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

fn detect() -> CpuFeatures {
    #[cfg(target_arch = "x86_64")]
    {
        let features = CpuFeatures {
            // SSE2 is part of the x86_64 baseline; the runtime probe exists mainly for
            // symmetry with sse41/avx2 so all three sit behind the same accessor.
            sse2: std::is_x86_feature_detected!("sse2"),
            sse41: std::is_x86_feature_detected!("sse4.1"),
            avx2: std::is_x86_feature_detected!("avx2"),
        };
        tracing::debug!(?features, "cpu feature probe complete");
        features
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        let features = CpuFeatures { sse2: false, sse41: false, avx2: false };
        tracing::debug!(?features, "non-x86_64 target, scalar kernels only");
        features
    }
}

pub(crate) fn features() -> CpuFeatures {
    *FEATURES.get_or_init(detect)
}

/// Whether the 128-bit `equal` kernel should use the SSE4.1 PTEST compare instead of
/// the SSE2 cmpeq+movemask one.
pub(crate) fn features_have_sse41() -> bool {
    features().sse41
}

/// Table-driven selection for XOR/AND: see SPEC_FULL.md §4.2.
///
/// `n_cols` is the row's logical bit width; `mod_w` is `n_cols % 64`.
pub(crate) fn select_bitwise(pref: KernelPreference, n_cols: usize) -> KernelLevel {
    let f = features();
    let mod_w_zero = n_cols % 64 == 0;
    let eligible256 = f.avx2 && n_cols >= 256 && mod_w_zero;
    let eligible128 = f.sse2 && mod_w_zero;
    resolve(pref, eligible256, eligible128)
}

/// Table-driven selection for `mul_v`/`addmul_v`.
pub(crate) fn select_mulv(pref: KernelPreference, n_rows: usize, n_cols: usize) -> KernelLevel {
    let f = features();
    let eligible256 = f.avx2 && n_rows % 64 == 0 && n_cols % 256 == 0;
    let eligible128 = f.sse2 && n_rows % 64 == 0 && n_cols % 128 == 0;
    resolve(pref, eligible256, eligible128)
}

/// Table-driven selection for `equal`.
pub(crate) fn select_equal(pref: KernelPreference, n_cols: usize) -> KernelLevel {
    let f = features();
    let eligible256 = f.avx2 && n_cols >= 256;
    let eligible128 = f.sse41 || f.sse2;
    resolve(pref, eligible256, eligible128)
}

fn resolve(pref: KernelPreference, eligible256: bool, eligible128: bool) -> KernelLevel {
    match pref {
        KernelPreference::AutoDetect => {
            if eligible256 {
                KernelLevel::Simd256
            } else if eligible128 {
                KernelLevel::Simd128
            } else {
                KernelLevel::Scalar
            }
        }
        KernelPreference::ForceAvx2 if eligible256 => KernelLevel::Simd256,
        KernelPreference::ForceSse2 if eligible128 => KernelLevel::Simd128,
        KernelPreference::ForceScalar => KernelLevel::Scalar,
        // Requested level's structural precondition doesn't hold for these dims;
        // fall back rather than silently miscompute.
        KernelPreference::ForceAvx2 | KernelPreference::ForceSse2 => {
            if eligible128 {
                KernelLevel::Simd128
            } else {
                KernelLevel::Scalar
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_scalar_always_scalar() {
        assert_eq!(select_bitwise(KernelPreference::ForceScalar, 256), KernelLevel::Scalar);
        assert_eq!(select_mulv(KernelPreference::ForceScalar, 64, 256), KernelLevel::Scalar);
        assert_eq!(select_equal(KernelPreference::ForceScalar, 256), KernelLevel::Scalar);
    }

    #[test]
    fn bitwise_falls_back_when_misaligned() {
        // n_cols = 100 is not a multiple of 64, so neither SIMD tier's structural
        // precondition holds regardless of what the CPU supports.
        assert_eq!(select_bitwise(KernelPreference::AutoDetect, 100), KernelLevel::Scalar);
    }
}
