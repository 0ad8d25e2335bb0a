//! Validation Engine
//!
//! Pure predicates over measured lengths and numeric parameters. Every
//! operation runs these before touching the provider, so a bad input is
//! always reported as a validation error and never reaches a primitive.
//! The bounds themselves come from the provider's published constants.

use saltline_crypto::{kdf, pwhash};

use crate::error::{Bound, CryptoError, Param};

/// `actual` must equal `expected`.
pub fn check_exact(param: Param, actual: usize, expected: usize) -> Result<(), CryptoError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength {
            param,
            expected: Bound::Exact(expected as u64),
            actual: actual as u64,
        })
    }
}

/// `actual` must lie in `min..=max`.
pub fn check_range(param: Param, actual: usize, min: usize, max: usize) -> Result<(), CryptoError> {
    if (min..=max).contains(&actual) {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength {
            param,
            expected: Bound::Range { min: min as u64, max: max as u64 },
            actual: actual as u64,
        })
    }
}

/// `actual` must be at least `min`.
pub fn check_min_len(param: Param, actual: usize, min: usize) -> Result<(), CryptoError> {
    if actual >= min {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength {
            param,
            expected: Bound::AtLeast(min as u64),
            actual: actual as u64,
        })
    }
}

/// `actual` must not exceed `max`.
pub fn check_max_len(param: Param, actual: usize, max: u64) -> Result<(), CryptoError> {
    if actual as u64 <= max {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength { param, expected: Bound::AtMost(max), actual: actual as u64 })
    }
}

/// An absent key always passes; a present one must be `min..=max` bytes.
pub fn check_optional_key(key: Option<&[u8]>, min: usize, max: usize) -> Result<(), CryptoError> {
    match key {
        None => Ok(()),
        Some(key) => check_range(Param::Key, key.len(), min, max),
    }
}

/// KDF contexts are exactly `CONTEXTBYTES` long.
pub fn check_context(context: &[u8]) -> Result<(), CryptoError> {
    check_exact(Param::Context, context.len(), kdf::CONTEXTBYTES)
}

/// Padding blocks are at least one byte.
pub fn check_block_size(block_size: usize) -> Result<(), CryptoError> {
    if block_size == 0 {
        return Err(CryptoError::OutOfRange {
            param: Param::BlockSize,
            expected: Bound::AtLeast(1),
            actual: 0,
        });
    }
    Ok(())
}

/// Password-hash cost parameters must lie within the published limits.
pub fn check_pwhash_limits(opslimit: u64, memlimit: u64) -> Result<(), CryptoError> {
    check_value(Param::OpsLimit, opslimit, pwhash::OPSLIMIT_MIN, pwhash::OPSLIMIT_MAX)?;
    check_value(Param::MemLimit, memlimit, pwhash::MEMLIMIT_MIN, pwhash::MEMLIMIT_MAX)
}

fn check_value(param: Param, actual: u64, min: u64, max: u64) -> Result<(), CryptoError> {
    if (min..=max).contains(&actual) {
        Ok(())
    } else {
        Err(CryptoError::OutOfRange { param, expected: Bound::Range { min, max }, actual })
    }
}
