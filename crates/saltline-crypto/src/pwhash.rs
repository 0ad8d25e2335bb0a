//! Argon2id password hashing
//!
//! Two forms share one cost model:
//!
//! - raw derivation: password + 16-byte salt → caller-sized key
//! - string form: a PHC-format ASCII string (`$argon2id$v=19$m=…,t=…,p=1$…`)
//!   written NUL-padded into a `STRBYTES` buffer, carrying its own salt and
//!   parameters so it can be verified later
//!
//! `opslimit` is the Argon2 iteration count. `memlimit` is in bytes and maps
//! to Argon2 memory in KiB. Parallelism is fixed at 1.

use argon2::{
    ARGON2ID_IDENT, Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};

use crate::{Entropy, Status};

/// Salt length for raw derivation and for generated string hashes.
pub const SALTBYTES: usize = 16;

/// Smallest raw output length.
pub const BYTES_MIN: usize = 16;

/// Largest raw output length.
pub const BYTES_MAX: u64 = 0xFFFF_FFFF;

/// Largest accepted password length.
pub const PASSWD_MAX: u64 = 0xFFFF_FFFF;

/// Size of the NUL-padded string buffer.
pub const STRBYTES: usize = 128;

/// Prefix every string produced here starts with.
pub const STRPREFIX: &str = "$argon2id$";

/// Smallest iteration count.
pub const OPSLIMIT_MIN: u64 = 1;

/// Largest iteration count.
pub const OPSLIMIT_MAX: u64 = 0xFFFF_FFFF;

/// Smallest memory limit in bytes.
pub const MEMLIMIT_MIN: u64 = 8192;

/// Largest memory limit in bytes.
pub const MEMLIMIT_MAX: u64 = 4_398_046_510_080;

/// Iterations for online, interactive logins.
pub const OPSLIMIT_INTERACTIVE: u64 = 2;

/// Memory for online, interactive logins (64 MiB).
pub const MEMLIMIT_INTERACTIVE: u64 = 67_108_864;

/// Iterations for a moderate cost.
pub const OPSLIMIT_MODERATE: u64 = 3;

/// Memory for a moderate cost (256 MiB).
pub const MEMLIMIT_MODERATE: u64 = 268_435_456;

/// Iterations for highly sensitive, non-interactive use.
pub const OPSLIMIT_SENSITIVE: u64 = 4;

/// Memory for highly sensitive, non-interactive use (1 GiB).
pub const MEMLIMIT_SENSITIVE: u64 = 1_073_741_824;

/// Argon2 parameters for the given limits, `None` if out of range.
fn params(opslimit: u64, memlimit: u64, output_len: Option<usize>) -> Option<Params> {
    if !(OPSLIMIT_MIN..=OPSLIMIT_MAX).contains(&opslimit)
        || !(MEMLIMIT_MIN..=MEMLIMIT_MAX).contains(&memlimit)
    {
        return None;
    }

    let m_cost = u32::try_from(memlimit / 1024).ok()?;
    let t_cost = u32::try_from(opslimit).ok()?;
    Params::new(m_cost, t_cost, 1, output_len).ok()
}

fn argon2id(params: Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Derive `out.len()` bytes from `passwd` and `salt`.
pub(crate) fn derive(
    out: &mut [u8],
    passwd: &[u8],
    salt: &[u8],
    opslimit: u64,
    memlimit: u64,
) -> Status {
    if out.len() < BYTES_MIN
        || out.len() as u64 > BYTES_MAX
        || passwd.len() as u64 > PASSWD_MAX
        || salt.len() != SALTBYTES
    {
        return Status::FAILURE;
    }
    let Some(params) = params(opslimit, memlimit, Some(out.len())) else {
        return Status::FAILURE;
    };

    Status::from_bool(argon2id(params).hash_password_into(passwd, salt, out).is_ok())
}

/// Hash `passwd` with a fresh salt into a NUL-padded PHC string.
pub(crate) fn hash_str(
    out: &mut [u8],
    passwd: &[u8],
    opslimit: u64,
    memlimit: u64,
    entropy: &impl Entropy,
) -> Status {
    if out.len() != STRBYTES || passwd.len() as u64 > PASSWD_MAX {
        return Status::FAILURE;
    }
    let Some(params) = params(opslimit, memlimit, None) else {
        return Status::FAILURE;
    };

    let mut salt_bytes = [0u8; SALTBYTES];
    entropy.fill(&mut salt_bytes);
    let Ok(salt) = SaltString::encode_b64(&salt_bytes) else {
        return Status::FAILURE;
    };
    let Ok(hash) = argon2id(params).hash_password(passwd, &salt) else {
        return Status::FAILURE;
    };

    let encoded = hash.to_string();
    // Room for at least one terminating NUL.
    if encoded.len() >= STRBYTES {
        return Status::FAILURE;
    }

    out.fill(0);
    out[..encoded.len()].copy_from_slice(encoded.as_bytes());
    Status::SUCCESS
}

/// Check `passwd` against a (possibly NUL-padded) string hash.
pub(crate) fn verify_str(hash_str: &[u8], passwd: &[u8]) -> Status {
    let Some(hash) = parse(hash_str) else {
        return Status::FAILURE;
    };
    if passwd.len() as u64 > PASSWD_MAX {
        return Status::FAILURE;
    }

    let verifier = Argon2::default();
    Status::from_bool(verifier.verify_password(passwd, &hash).is_ok())
}

/// `0` if the string uses exactly these limits, `1` if it should be
/// rehashed, `-1` if it is not a valid Argon2id string.
pub(crate) fn needs_rehash(hash_str: &[u8], opslimit: u64, memlimit: u64) -> Status {
    let Some(hash) = parse(hash_str) else {
        return Status::FAILURE;
    };
    let Ok(current) = Params::try_from(&hash) else {
        return Status::FAILURE;
    };
    let Some(wanted) = params(opslimit, memlimit, None) else {
        return Status::FAILURE;
    };

    let version_current = hash.version.is_none_or(|v| v == u32::from(Version::V0x13));
    let same = version_current
        && current.m_cost() == wanted.m_cost()
        && current.t_cost() == wanted.t_cost()
        && current.p_cost() == wanted.p_cost();
    Status::new(i32::from(!same))
}

/// Text up to the first NUL, parsed as an Argon2id PHC string.
fn parse(hash_str: &[u8]) -> Option<PasswordHash<'_>> {
    let end = hash_str.iter().position(|&b| b == 0).unwrap_or(hash_str.len());
    let text = std::str::from_utf8(&hash_str[..end]).ok()?;
    let hash = PasswordHash::new(text).ok()?;
    (hash.algorithm == ARGON2ID_IDENT).then_some(hash)
}
