//! Deterministic and OS-entropy randomness sources.
//!
//! The MPC core needs a reproducible stream keyed by a 128-bit seed per SPEC_FULL.md
//! §5, so the deterministic stream here is built on RustCrypto's `aes`/`ctr`: a fresh
//! AES-128-CTR keystream, counter starting at zero, gives the same "seed in, identical
//! byte stream out" contract with an auditable primitive.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::RngCore;
use rand::rngs::OsRng;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// A keyed, deterministic byte stream: same seed always produces the same bytes.
pub trait PrngStream {
    fn new(seed: [u8; 16]) -> Self;
    fn fill(&mut self, buf: &mut [u8]);
}

/// AES-128 in CTR mode, zero IV, freshly keyed from `seed`. Each instance owns an
/// independent counter, so two `Aes128CtrPrng`s built from the same seed produce
/// identical streams (SPEC_FULL.md's reproducibility requirement for proof replay).
pub struct Aes128CtrPrng {
    cipher: Aes128Ctr,
}

impl PrngStream for Aes128CtrPrng {
    fn new(seed: [u8; 16]) -> Self {
        let iv = [0u8; 16];
        let cipher = Aes128Ctr::new(&seed.into(), &iv.into());
        Self { cipher }
    }

    fn fill(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        self.cipher.apply_keystream(buf);
    }
}

/// Non-deterministic entropy, used only to seed an `Aes128CtrPrng`, never to drive
/// MPC shares directly (those must be replayable from a recorded 128-bit seed).
pub trait CryptoRng {
    fn fill_bytes(&mut self, buf: &mut [u8]);
}

pub struct OsEntropy;

impl CryptoRng for OsEntropy {
    fn fill_bytes(&mut self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

impl OsEntropy {
    /// Draw a fresh 128-bit seed suitable for [`Aes128CtrPrng::new`].
    pub fn random_seed() -> [u8; 16] {
        let mut seed = [0u8; 16];
        OsEntropy.fill_bytes(&mut seed);
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Aes128CtrPrng::new([7u8; 16]);
        let mut b = Aes128CtrPrng::new([7u8; 16]);
        let mut buf_a = [0u8; 64];
        let mut buf_b = [0u8; 64];
        a.fill(&mut buf_a);
        b.fill(&mut buf_b);
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn different_seed_different_stream() {
        let mut a = Aes128CtrPrng::new([1u8; 16]);
        let mut b = Aes128CtrPrng::new([2u8; 16]);
        let mut buf_a = [0u8; 32];
        let mut buf_b = [0u8; 32];
        a.fill(&mut buf_a);
        b.fill(&mut buf_b);
        assert_ne!(buf_a, buf_b);
    }

    #[test]
    fn continuing_a_stream_does_not_repeat() {
        let mut a = Aes128CtrPrng::new([3u8; 16]);
        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        a.fill(&mut first);
        a.fill(&mut second);
        assert_ne!(first, second);
    }
}
