//! Seeded, reproducible byte sequences
//!
//! The ChaCha20-IETF keystream under a 32-byte seed, with the fixed nonce
//! `"LibsodiumDRG"` and the block counter starting at zero. The same seed
//! always yields the same bytes, and a longer request extends a shorter one.

use chacha20::{
    ChaCha20, Key, Nonce,
    cipher::{KeyIvInit, StreamCipher},
};

use crate::Status;

/// Seed length.
pub const SEEDBYTES: usize = 32;

/// Longest sequence one seed produces (2^32 ChaCha20 blocks).
pub const BYTES_MAX: u64 = 64 * (1 << 32);

const NONCE: &[u8; 12] = b"LibsodiumDRG";

/// Fill `out` from `seed`.
pub(crate) fn fill(out: &mut [u8], seed: &[u8]) -> Status {
    if seed.len() != SEEDBYTES || out.len() as u64 > BYTES_MAX {
        return Status::FAILURE;
    }

    out.fill(0);
    let mut cipher = ChaCha20::new(Key::from_slice(seed), Nonce::from_slice(NONCE));
    if cipher.try_apply_keystream(out).is_err() {
        out.fill(0);
        return Status::FAILURE;
    }
    Status::SUCCESS
}
