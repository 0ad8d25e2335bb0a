//! Randomness source abstraction.
//!
//! Decouples primitive logic from the system RNG. Production uses the OS
//! CSPRNG through getrandom; tests substitute fixed or seeded sources so that
//! stream headers and password salts are reproducible.

/// Source of random bytes for key, nonce, header and salt generation.
///
/// # Invariants
///
/// - Production implementations MUST use cryptographically secure entropy
/// - `fill` never fails observably; an implementation that cannot produce
///   randomness must abort rather than return predictable bytes
pub trait Entropy {
    /// Fills the provided buffer with random bytes.
    fn fill(&self, buffer: &mut [u8]);
}

impl<E: Entropy + ?Sized> Entropy for &E {
    fn fill(&self, buffer: &mut [u8]) {
        (**self).fill(buffer);
    }
}

/// OS cryptographic RNG (getrandom).
///
/// # Panics
///
/// Panics if the OS RNG fails. Continuing without functioning randomness
/// would produce predictable stream headers and salts.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    #[allow(clippy::expect_used)]
    fn fill(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - no header or salt can be generated");
    }
}
