//! Randomness and secure wipe.
//!
//! [`Random::deterministic`] is not random at all: it expands a 32-byte
//! seed into a reproducible sequence, for tests and for deriving several
//! values from one secret.

use saltline_crypto::{Provider, deterministic};
use zeroize::Zeroize;

use crate::{
    error::{CryptoError, Param},
    validation,
};

/// Overwrite `buffer` with zeros in a way the optimizer will not elide.
pub fn memzero(buffer: &mut [u8]) {
    buffer.zeroize();
}

/// Random bytes from the provider's entropy source.
pub struct Random<'p, P: Provider> {
    provider: &'p P,
}

impl<P: Provider> Clone for Random<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Provider> Copy for Random<'_, P> {}

impl<'p, P: Provider> Random<'p, P> {
    /// Randomness capability over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Fill `buffer` with random bytes.
    pub fn fill(&self, buffer: &mut [u8]) {
        self.provider.random_bytes(buffer);
    }

    /// `len` random bytes.
    pub fn bytes(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.fill(&mut out);
        out
    }

    /// Random fixed-size nonce.
    pub fn nonce<const N: usize>(&self) -> [u8; N] {
        let mut nonce = [0u8; N];
        self.fill(&mut nonce);
        nonce
    }

    /// Fill `out` with the sequence determined by `seed`.
    ///
    /// Equal seeds give equal bytes, and a longer output extends a shorter
    /// one.
    pub fn deterministic_into(&self, out: &mut [u8], seed: &[u8]) -> Result<(), CryptoError> {
        validation::check_exact(Param::Seed, seed.len(), deterministic::SEEDBYTES)?;
        validation::check_max_len(Param::Output, out.len(), deterministic::BYTES_MAX)?;

        if !self.provider.random_bytes_deterministic(out, seed).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "random_bytes_deterministic" });
        }
        Ok(())
    }

    /// `len` bytes of the sequence determined by `seed`.
    pub fn deterministic(&self, len: usize, seed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; len];
        self.deterministic_into(&mut out, seed)?;
        Ok(out)
    }

    /// Uniform value in `0..upper_bound`, without modulo bias.
    ///
    /// Returns 0 when `upper_bound < 2`.
    pub fn uniform(&self, upper_bound: u32) -> u32 {
        if upper_bound < 2 {
            return 0;
        }

        // 2^32 mod upper_bound: values below this would bias the result.
        let min = upper_bound.wrapping_neg() % upper_bound;
        loop {
            let mut word = [0u8; 4];
            self.fill(&mut word);
            let value = u32::from_le_bytes(word);
            if value >= min {
                return value % upper_bound;
            }
        }
    }
}
