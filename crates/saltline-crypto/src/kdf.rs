//! Subkey derivation from a master key using BLAKE2b
//!
//! `subkey = BLAKE2b(key = master, salt = le64(id) || 0^8,
//! personal = context || 0^8, message = "")`, output length chosen by the
//! caller within `BYTES_MIN..=BYTES_MAX`.

use blake2b_simd::Params as Blake2bParams;

use crate::Status;

/// Master key length.
pub const KEYBYTES: usize = 32;

/// Context length; shorter contexts are not accepted.
pub const CONTEXTBYTES: usize = 8;

/// Smallest subkey length.
pub const BYTES_MIN: usize = 16;

/// Largest subkey length.
pub const BYTES_MAX: usize = 64;

/// Derive the subkey with index `subkey_id` into `subkey`.
pub(crate) fn derive_from_key(
    subkey: &mut [u8],
    subkey_id: u64,
    context: &[u8],
    master_key: &[u8],
) -> Status {
    if subkey.len() < BYTES_MIN
        || subkey.len() > BYTES_MAX
        || context.len() != CONTEXTBYTES
        || master_key.len() != KEYBYTES
    {
        return Status::FAILURE;
    }

    let hash = Blake2bParams::new()
        .hash_length(subkey.len())
        .key(master_key)
        .salt(&subkey_id.to_le_bytes())
        .personal(context)
        .hash(&[]);
    subkey.copy_from_slice(hash.as_bytes());
    Status::SUCCESS
}
