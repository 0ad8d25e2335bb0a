//! XChaCha20-Poly1305 secret stream
//!
//! A sequence of authenticated chunks under one key. The header carries a
//! random 192-bit nonce; HChaCha20 turns its first 16 bytes into a per-stream
//! subkey and the last 8 bytes seed the running nonce.
//!
//! # Chunk layout
//!
//! ```text
//! ┌──────────┬─────────────────────┬──────────────┐
//! │ tag (1)  │ ciphertext (mlen)   │ Poly1305 (16)│
//! └──────────┴─────────────────────┴──────────────┘
//! ```
//!
//! # Security Properties
//!
//! - Nonce freshness: every chunk folds its MAC into the running nonce and
//!   bumps a 32-bit counter, so no two chunks share an effective nonce
//! - Ordering: a dropped, duplicated or reordered chunk fails authentication
//! - No partial disclosure: the MAC is checked in constant time before any
//!   plaintext is written or any state is touched

use chacha20::{
    ChaCha20, Key, Nonce,
    cipher::{KeyIvInit, StreamCipher, consts::U10, generic_array::GenericArray},
    hchacha,
};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{
    Entropy, Status,
    onetimeauth::{Authenticator, PAD0},
};

/// Secret key length.
pub const KEYBYTES: usize = 32;

/// Stream header length.
pub const HEADERBYTES: usize = 24;

/// Per-chunk overhead: one encrypted tag byte plus a 16-byte MAC.
pub const ABYTES: usize = 1 + MACBYTES;

/// Largest plaintext a single chunk may carry.
pub const MESSAGEBYTES_MAX: u64 = 64 * ((1 << 32) - 2);

/// Ordinary chunk.
pub const TAG_MESSAGE: u8 = 0x00;

/// End of a logical message inside the stream.
pub const TAG_PUSH: u8 = 0x01;

/// Both sides rekey after this chunk.
pub const TAG_REKEY: u8 = 0x02;

/// Last chunk of the stream.
pub const TAG_FINAL: u8 = TAG_PUSH | TAG_REKEY;

const MACBYTES: usize = 16;
const COUNTERBYTES: usize = 4;
const INONCEBYTES: usize = 8;
const BLOCKBYTES: usize = 64;

/// Running state of one secret stream direction.
///
/// Holds the derived subkey and the 12-byte ChaCha20 nonce
/// (`counter(4, LE) || inonce(8)`). The default value is all zeroes and
/// must be initialized with `init_push` or `init_pull` before use.
#[derive(Clone, Default)]
pub struct SecretStreamState {
    k: [u8; KEYBYTES],
    nonce: [u8; COUNTERBYTES + INONCEBYTES],
}

impl SecretStreamState {
    fn counter_reset(&mut self) {
        self.nonce[..COUNTERBYTES].fill(0);
        self.nonce[0] = 1;
    }

    fn counter_is_zero(&self) -> bool {
        self.nonce[..COUNTERBYTES].iter().all(|&b| b == 0)
    }

    fn increment_counter(&mut self) {
        let mut counter = [0u8; COUNTERBYTES];
        counter.copy_from_slice(&self.nonce[..COUNTERBYTES]);
        let next = u32::from_le_bytes(counter).wrapping_add(1);
        self.nonce[..COUNTERBYTES].copy_from_slice(&next.to_le_bytes());
    }

    fn cipher(&self) -> ChaCha20 {
        ChaCha20::new(Key::from_slice(&self.k), Nonce::from_slice(&self.nonce))
    }

    /// Fold the chunk MAC into the running nonce and advance the counter.
    fn advance(&mut self, mac: &[u8], tag: u8) {
        for (n, m) in self.nonce[COUNTERBYTES..].iter_mut().zip(&mac[..INONCEBYTES]) {
            *n ^= m;
        }
        self.increment_counter();
        if tag & TAG_REKEY != 0 || self.counter_is_zero() {
            rekey(self);
        }
    }
}

impl Drop for SecretStreamState {
    fn drop(&mut self) {
        self.k.zeroize();
        self.nonce.zeroize();
    }
}

impl std::fmt::Debug for SecretStreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStreamState").finish_non_exhaustive()
    }
}

/// Fresh header from `entropy`, then derive the push state from it.
pub(crate) fn init_push(
    state: &mut SecretStreamState,
    header: &mut [u8],
    key: &[u8],
    entropy: &impl Entropy,
) -> Status {
    if header.len() != HEADERBYTES || key.len() != KEYBYTES {
        return Status::FAILURE;
    }

    entropy.fill(header);
    derive(state, header, key);
    Status::SUCCESS
}

/// Rebuild the sender's initial state from its header.
pub(crate) fn init_pull(state: &mut SecretStreamState, header: &[u8], key: &[u8]) -> Status {
    if header.len() != HEADERBYTES || key.len() != KEYBYTES {
        return Status::FAILURE;
    }

    derive(state, header, key);
    Status::SUCCESS
}

fn derive(state: &mut SecretStreamState, header: &[u8], key: &[u8]) {
    let subkey = hchacha::<U10>(Key::from_slice(key), GenericArray::from_slice(&header[..16]));
    state.k.copy_from_slice(&subkey);
    state.counter_reset();
    state.nonce[COUNTERBYTES..].copy_from_slice(&header[16..HEADERBYTES]);
}

/// Replace the subkey and inonce with keystream derived from themselves.
pub(crate) fn rekey(state: &mut SecretStreamState) {
    let mut buf = [0u8; KEYBYTES + INONCEBYTES];
    buf[..KEYBYTES].copy_from_slice(&state.k);
    buf[KEYBYTES..].copy_from_slice(&state.nonce[COUNTERBYTES..]);

    state.cipher().apply_keystream(&mut buf);

    state.k.copy_from_slice(&buf[..KEYBYTES]);
    state.nonce[COUNTERBYTES..].copy_from_slice(&buf[KEYBYTES..]);
    state.counter_reset();
    buf.zeroize();
}

/// Encrypt one chunk into `out` (`message.len() + ABYTES` bytes).
pub(crate) fn push(
    state: &mut SecretStreamState,
    out: &mut [u8],
    message: &[u8],
    ad: &[u8],
    tag: u8,
) -> Status {
    if message.len() as u64 > MESSAGEBYTES_MAX || out.len() != message.len() + ABYTES {
        return Status::FAILURE;
    }

    let mut cipher = state.cipher();
    let mut block = [0u8; BLOCKBYTES];
    cipher.apply_keystream(&mut block);
    let poly = Authenticator::new(&block[..32]);

    block.fill(0);
    block[0] = tag;
    cipher.apply_keystream(&mut block);
    out[0] = block[0];

    let (body, mac_out) = out[1..].split_at_mut(message.len());
    body.copy_from_slice(message);
    cipher.apply_keystream(body);

    let mac = authenticate(poly, ad, &block, body);
    mac_out.copy_from_slice(&mac);
    block.zeroize();

    state.advance(&mac, tag);
    Status::SUCCESS
}

/// Verify and decrypt one chunk into `out` (`input.len() - ABYTES` bytes).
///
/// A failure means the chunk did not authenticate (or the buffers were
/// mis-sized). On failure neither `out`, `tag` nor `state` are modified.
pub(crate) fn pull(
    state: &mut SecretStreamState,
    out: &mut [u8],
    tag: &mut u8,
    input: &[u8],
    ad: &[u8],
) -> Status {
    if input.len() < ABYTES {
        return Status::FAILURE;
    }
    let mlen = input.len() - ABYTES;
    if mlen as u64 > MESSAGEBYTES_MAX || out.len() != mlen {
        return Status::FAILURE;
    }

    let mut cipher = state.cipher();
    let mut block = [0u8; BLOCKBYTES];
    cipher.apply_keystream(&mut block);
    let poly = Authenticator::new(&block[..32]);

    block.fill(0);
    block[0] = input[0];
    cipher.apply_keystream(&mut block);
    let recovered_tag = block[0];
    block[0] = input[0];

    let body = &input[1..=mlen];
    let stored_mac = &input[1 + mlen..];
    let mac = authenticate(poly, ad, &block, body);
    block.zeroize();

    if !bool::from(mac.as_slice().ct_eq(stored_mac)) {
        return Status::FAILURE;
    }

    out.copy_from_slice(body);
    cipher.apply_keystream(out);

    state.advance(&mac, recovered_tag);
    *tag = recovered_tag;
    Status::SUCCESS
}

/// `ad || pad16 || block || c || pad(mlen mod 16) || le64(adlen) || le64(64 + mlen)`
fn authenticate(
    mut poly: Authenticator,
    ad: &[u8],
    block: &[u8; BLOCKBYTES],
    ciphertext: &[u8],
) -> poly1305::Tag {
    poly.update(ad);
    poly.update(&PAD0[..(0x10 - ad.len() % 0x10) & 0xf]);
    poly.update(block);
    poly.update(ciphertext);
    poly.update(&PAD0[..ciphertext.len() & 0xf]);
    poly.update(&(ad.len() as u64).to_le_bytes());
    poly.update(&((BLOCKBYTES + ciphertext.len()) as u64).to_le_bytes());
    poly.finalize()
}
