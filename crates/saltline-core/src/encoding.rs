//! Buffer and encoding discipline
//!
//! Output sizes are derived here, by formula, before any native call runs.
//! Hex conversion is purely representational: uppercase on encode,
//! case-insensitive on decode, two characters per byte, no separators.
//!
//! # Padding
//!
//! ISO/IEC 7816-4: a `0x80` marker followed by zeros up to the next multiple
//! of the block size. A message that already fills its last block gains a
//! whole block, so padding always adds at least one byte and hides the
//! exact length inside the block.

use saltline_crypto::{AeadAlgorithm, secretstream};

use crate::{
    error::{Bound, CryptoError, Param},
    validation,
};

/// Uppercase hex, two characters per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Lowercase hex, two characters per byte.
pub fn to_hex_lower(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex of either case. `param` names the input in errors.
pub fn from_hex(param: Param, text: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(text).map_err(|reason| CryptoError::InvalidHex { param, reason })
}

/// Secret stream chunk length for a `plaintext_len`-byte message.
pub fn stream_ciphertext_len(plaintext_len: usize) -> Result<usize, CryptoError> {
    validation::check_max_len(Param::Message, plaintext_len, secretstream::MESSAGEBYTES_MAX)?;
    plaintext_len.checked_add(secretstream::ABYTES).ok_or(CryptoError::InvalidLength {
        param: Param::Message,
        expected: Bound::AtMost(secretstream::MESSAGEBYTES_MAX),
        actual: plaintext_len as u64,
    })
}

/// Plaintext length carried by a `ciphertext_len`-byte stream chunk.
pub fn stream_plaintext_len(ciphertext_len: usize) -> Result<usize, CryptoError> {
    validation::check_min_len(Param::Ciphertext, ciphertext_len, secretstream::ABYTES)?;
    Ok(ciphertext_len - secretstream::ABYTES)
}

/// Combined-mode ciphertext length for a `plaintext_len`-byte message.
pub fn aead_ciphertext_len(
    algorithm: AeadAlgorithm,
    plaintext_len: usize,
) -> Result<usize, CryptoError> {
    plaintext_len.checked_add(algorithm.abytes()).ok_or(CryptoError::InvalidLength {
        param: Param::Message,
        expected: Bound::AtMost((usize::MAX - algorithm.abytes()) as u64),
        actual: plaintext_len as u64,
    })
}

/// Plaintext length carried by a `ciphertext_len`-byte combined ciphertext.
pub fn aead_plaintext_len(
    algorithm: AeadAlgorithm,
    ciphertext_len: usize,
) -> Result<usize, CryptoError> {
    validation::check_min_len(Param::Ciphertext, ciphertext_len, algorithm.abytes())?;
    Ok(ciphertext_len - algorithm.abytes())
}

/// Length of `unpadded_len` bytes after padding to `block_size`.
pub fn padded_len(unpadded_len: usize, block_size: usize) -> Result<usize, CryptoError> {
    validation::check_block_size(block_size)?;
    let fill = block_size - unpadded_len % block_size;
    unpadded_len.checked_add(fill).ok_or(CryptoError::InvalidLength {
        param: Param::Message,
        expected: Bound::AtMost((usize::MAX - block_size) as u64),
        actual: unpadded_len as u64,
    })
}

/// Pad the first `unpadded_len` bytes of `buffer` in place.
///
/// Returns the padded length. `buffer` must have room for it; bytes past
/// the padded length are left alone.
pub fn pad_into(buffer: &mut [u8], unpadded_len: usize, block_size: usize) -> Result<usize, CryptoError> {
    validation::check_max_len(Param::Message, unpadded_len, buffer.len() as u64)?;
    let padded = padded_len(unpadded_len, block_size)?;
    validation::check_min_len(Param::Output, buffer.len(), padded)?;

    buffer[unpadded_len] = 0x80;
    buffer[unpadded_len + 1..padded].fill(0);
    Ok(padded)
}

/// `data` padded to a multiple of `block_size`.
pub fn pad(data: &[u8], block_size: usize) -> Result<Vec<u8>, CryptoError> {
    let mut padded = vec![0u8; padded_len(data.len(), block_size)?];
    padded[..data.len()].copy_from_slice(data);
    pad_into(&mut padded, data.len(), block_size)?;
    Ok(padded)
}

/// Length of the message inside `padded`.
///
/// Only the last `block_size` bytes are inspected, all of them, whatever
/// their content.
pub fn unpadded_len(padded: &[u8], block_size: usize) -> Result<usize, CryptoError> {
    validation::check_block_size(block_size)?;
    validation::check_min_len(Param::Message, padded.len(), block_size)?;

    let tail = &padded[padded.len() - block_size..];
    let mut seen = 0u16;
    let mut found = 0u16;
    let mut pad_bytes = 0usize;
    for (offset, &byte) in tail.iter().rev().enumerate() {
        let zeros_after = (seen.wrapping_sub(1) >> 8) & 1;
        let is_marker = (u16::from(byte ^ 0x80).wrapping_sub(1) >> 8) & 1;
        let hit = zeros_after & is_marker & (found ^ 1);

        pad_bytes |= offset & usize::from(hit).wrapping_neg();
        found |= hit;
        seen |= u16::from(byte);
    }

    if found == 0 {
        return Err(CryptoError::InvalidPadding);
    }
    Ok(padded.len() - 1 - pad_bytes)
}

/// The message inside `padded`.
pub fn unpad(padded: &[u8], block_size: usize) -> Result<&[u8], CryptoError> {
    Ok(&padded[..unpadded_len(padded, block_size)?])
}
