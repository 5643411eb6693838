//! Multi-tier GF(2) kernels, dispatched by [`crate::cpu`].
//!
//! One module per instruction-set tier: a safe wrapper around the vectorized worker,
//! with a scalar fallback always present so callers never depend on a specific CPU.

pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub mod simd128;

#[cfg(target_arch = "x86_64")]
pub mod simd256;
