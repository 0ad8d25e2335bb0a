//! Incremental Poly1305 over non-contiguous input.
//!
//! The stream and legacy AEAD constructions authenticate several slices
//! (associated data, padding, ciphertext, length trailers) as one message.
//! Feeding them here avoids assembling a copy of the ciphertext first.

use poly1305::{
    Poly1305,
    universal_hash::{KeyInit, UniversalHash},
};
use zeroize::Zeroize;

const BLOCK: usize = 16;

/// Zero bytes for padding a section to the next block boundary.
pub(crate) const PAD0: [u8; BLOCK] = [0u8; BLOCK];

/// Poly1305 that accepts input in arbitrary pieces.
///
/// Full blocks go straight to the hash; up to 15 trailing bytes wait in
/// `carry` until the next `update` or `finalize`. The result equals
/// `Poly1305::compute_unpadded` over the concatenated input.
pub(crate) struct Authenticator {
    poly: Poly1305,
    carry: [u8; BLOCK],
    filled: usize,
}

impl Authenticator {
    /// `key` is the 32-byte one-time key.
    pub(crate) fn new(key: &[u8]) -> Self {
        Self {
            poly: Poly1305::new(poly1305::Key::from_slice(key)),
            carry: [0u8; BLOCK],
            filled: 0,
        }
    }

    pub(crate) fn update(&mut self, mut data: &[u8]) {
        if self.filled > 0 {
            let take = (BLOCK - self.filled).min(data.len());
            self.carry[self.filled..self.filled + take].copy_from_slice(&data[..take]);
            self.filled += take;
            data = &data[take..];
            if self.filled < BLOCK {
                return;
            }
            self.poly.update_padded(&self.carry);
            self.filled = 0;
        }

        let aligned = data.len() - data.len() % BLOCK;
        if aligned > 0 {
            self.poly.update_padded(&data[..aligned]);
        }

        let rest = &data[aligned..];
        self.carry[..rest.len()].copy_from_slice(rest);
        self.filled = rest.len();
    }

    pub(crate) fn finalize(self) -> poly1305::Tag {
        self.poly.clone().compute_unpadded(&self.carry[..self.filled])
    }
}

impl Drop for Authenticator {
    fn drop(&mut self) {
        self.carry.zeroize();
    }
}
