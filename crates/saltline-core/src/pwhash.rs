//! Password hashing
//!
//! Raw key derivation from a password and salt, and self-describing PHC
//! hash strings for password storage. Cost parameters are checked against
//! the provider's published limits before any work is done.
//!
//! The provider writes hash strings NUL-padded into a fixed `STRBYTES`
//! buffer. The convenience surface cuts the text at the first NUL and
//! nowhere else: PHC strings are ASCII and never contain NUL, so anything
//! after it is padding.

use saltline_crypto::{Provider, pwhash};
use zeroize::Zeroizing;

use crate::{
    encoding,
    error::{CryptoError, Param},
    validation,
};

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Number of passes over memory
    pub opslimit: u64,
    /// Memory in bytes
    pub memlimit: u64,
}

impl Limits {
    /// Smallest accepted cost. Only suitable for tests.
    pub const MIN: Self = Self { opslimit: pwhash::OPSLIMIT_MIN, memlimit: pwhash::MEMLIMIT_MIN };

    /// Interactive logins.
    pub const INTERACTIVE: Self =
        Self { opslimit: pwhash::OPSLIMIT_INTERACTIVE, memlimit: pwhash::MEMLIMIT_INTERACTIVE };

    /// Moderately sensitive data.
    pub const MODERATE: Self =
        Self { opslimit: pwhash::OPSLIMIT_MODERATE, memlimit: pwhash::MEMLIMIT_MODERATE };

    /// Highly sensitive, non-interactive use.
    pub const SENSITIVE: Self =
        Self { opslimit: pwhash::OPSLIMIT_SENSITIVE, memlimit: pwhash::MEMLIMIT_SENSITIVE };

    fn validate(self) -> Result<(), CryptoError> {
        validation::check_pwhash_limits(self.opslimit, self.memlimit)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::INTERACTIVE
    }
}

fn check_password(passwd: &[u8]) -> Result<(), CryptoError> {
    validation::check_max_len(Param::Password, passwd.len(), pwhash::PASSWD_MAX)
}

/// Text of a NUL-padded hash string, up to the first NUL.
fn until_nul(buffer: &[u8]) -> &[u8] {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    &buffer[..end]
}

/// Password hashing capability.
pub struct PwHash<'p, P: Provider> {
    provider: &'p P,
}

impl<P: Provider> Clone for PwHash<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Provider> Copy for PwHash<'_, P> {}

impl<'p, P: Provider> PwHash<'p, P> {
    /// Password hashing capability over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    // Native surface

    /// Derive `out.len()` bytes from `passwd` and a `SALTBYTES` salt.
    pub fn hash_into(
        &self,
        out: &mut [u8],
        passwd: &[u8],
        salt: &[u8],
        limits: Limits,
    ) -> Result<(), CryptoError> {
        validation::check_min_len(Param::Output, out.len(), pwhash::BYTES_MIN)?;
        validation::check_max_len(Param::Output, out.len(), pwhash::BYTES_MAX)?;
        check_password(passwd)?;
        validation::check_exact(Param::Salt, salt.len(), pwhash::SALTBYTES)?;
        limits.validate()?;

        if !self.provider.pwhash(out, passwd, salt, limits.opslimit, limits.memlimit).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "pwhash" });
        }
        Ok(())
    }

    /// Write a NUL-padded hash string into `out` (`STRBYTES` bytes).
    pub fn hash_str_into(&self, out: &mut [u8], passwd: &[u8], limits: Limits) -> Result<(), CryptoError> {
        validation::check_exact(Param::Output, out.len(), pwhash::STRBYTES)?;
        check_password(passwd)?;
        limits.validate()?;

        if !self.provider.pwhash_str(out, passwd, limits.opslimit, limits.memlimit).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "pwhash_str" });
        }
        Ok(())
    }

    /// Check `passwd` against a stored hash string, NUL padding allowed.
    ///
    /// `Ok(false)` covers both a wrong password and an unparseable string.
    pub fn verify_str(&self, hash_str: &[u8], passwd: &[u8]) -> Result<bool, CryptoError> {
        validation::check_max_len(Param::HashString, hash_str.len(), pwhash::STRBYTES as u64)?;
        check_password(passwd)?;

        Ok(self.provider.pwhash_str_verify(hash_str, passwd).is_success())
    }

    /// True when `hash_str` was produced with different limits or version.
    pub fn needs_rehash(&self, hash_str: &[u8], limits: Limits) -> Result<bool, CryptoError> {
        validation::check_max_len(Param::HashString, hash_str.len(), pwhash::STRBYTES as u64)?;
        limits.validate()?;

        match self.provider.pwhash_str_needs_rehash(hash_str, limits.opslimit, limits.memlimit).code() {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(CryptoError::PrimitiveFailure { operation: "pwhash_str_needs_rehash" }),
        }
    }

    // Convenience surface

    /// Derive a `len`-byte key from `passwd` and `salt`.
    pub fn hash(
        &self,
        len: usize,
        passwd: &[u8],
        salt: &[u8],
        limits: Limits,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        validation::check_min_len(Param::Output, len, pwhash::BYTES_MIN)?;
        validation::check_max_len(Param::Output, len, pwhash::BYTES_MAX)?;

        let mut out = Zeroizing::new(vec![0u8; len]);
        self.hash_into(&mut out, passwd, salt, limits)?;
        Ok(out)
    }

    /// [`hash`](Self::hash) with a hex salt, returning hex.
    pub fn hash_hex(
        &self,
        len: usize,
        passwd: &[u8],
        salt_hex: &str,
        limits: Limits,
    ) -> Result<String, CryptoError> {
        let salt = encoding::from_hex(Param::Salt, salt_hex)?;
        self.hash(len, passwd, &salt, limits).map(|key| encoding::to_hex(&key))
    }

    /// PHC hash string for storage, without padding.
    pub fn hash_str(&self, passwd: &[u8], limits: Limits) -> Result<String, CryptoError> {
        let mut out = [0u8; pwhash::STRBYTES];
        self.hash_str_into(&mut out, passwd, limits)?;

        String::from_utf8(until_nul(&out).to_vec())
            .map_err(|_| CryptoError::PrimitiveFailure { operation: "pwhash_str" })
    }

    /// Verify `passwd`; a mismatch is [`CryptoError::AuthenticationFailed`].
    pub fn verify(&self, hash_str: &str, passwd: &[u8]) -> Result<(), CryptoError> {
        if self.verify_str(hash_str.as_bytes(), passwd)? {
            Ok(())
        } else {
            Err(CryptoError::AuthenticationFailed)
        }
    }

    /// Fresh random salt.
    pub fn salt(&self) -> Vec<u8> {
        let mut salt = vec![0u8; pwhash::SALTBYTES];
        self.provider.random_bytes(&mut salt);
        salt
    }
}
