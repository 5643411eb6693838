//! Bit-sliced GF(2) primitives and a replicated-secret-sharing MPC layer for
//! ZKBoo-style zero-knowledge proofs over LowMC circuits.
//!
//! The crate is split into three layers: [`bitblock`]/[`bitmatrix`] own the aligned
//! storage and invariants (B1: trailing bits past a row's width are always zero; B2:
//! row buffers start aligned to 16 or 32 bytes), [`gf2`] dispatches the actual XOR/AND/
//! shift/multiply/equality kernels across scalar, SSE2/SSE4.1 and AVX2 tiers, and
//! [`share`]/[`mpc`] lift those primitives to 3-of-3 additive sharings and the
//! ZKBoo AND gate. None of it performs I/O or spawns threads; see [`cpu`] for the
//! one-shot feature probe that drives dispatch.

pub mod bitblock;
pub mod bitmatrix;
pub mod cpu;
pub mod error;
pub mod gf2;
mod kernel;
pub mod mpc;
pub mod prng;
pub mod share;

pub use bitblock::BitBlock;
pub use bitmatrix::BitMatrix;
pub use cpu::{KernelLevel, KernelPreference};
pub use error::CoreError;
pub use mpc::{View, mpc_and_proof, mpc_and_verify};
pub use prng::{Aes128CtrPrng, CryptoRng, OsEntropy, PrngStream};
pub use share::{PartySlot, ShareTriple, init_plain_share_vector, init_share_vector, reconstruct};
