//! One-shot AEAD dispatch
//!
//! Selects the algorithm's published key, nonce and tag sizes, validates
//! against them and hands exact buffers to the provider. Every decryption
//! failure is reported as [`CryptoError::AuthenticationFailed`], whatever its
//! cause, and leaves the output buffer zeroed.

use saltline_crypto::{AeadAlgorithm, Provider};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    encoding,
    error::{CryptoError, Param},
    validation,
};

/// Ciphertext and authentication tag produced in detached mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    /// Ciphertext, same length as the plaintext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub mac: Vec<u8>,
}

fn check_key_and_nonce(algorithm: AeadAlgorithm, nonce: &[u8], key: &[u8]) -> Result<(), CryptoError> {
    validation::check_exact(Param::Key, key.len(), algorithm.key_bytes())?;
    validation::check_exact(Param::Nonce, nonce.len(), algorithm.nonce_bytes())
}

/// AEAD capability.
pub struct Aead<'p, P: Provider> {
    provider: &'p P,
}

impl<P: Provider> Clone for Aead<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Provider> Copy for Aead<'_, P> {}

impl<'p, P: Provider> Aead<'p, P> {
    /// AEAD capability over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    // Native surface

    /// Encrypt `message` into `out`, which holds ciphertext followed by tag.
    pub fn encrypt_into(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        message: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        check_key_and_nonce(algorithm, nonce, key)?;
        let expected = encoding::aead_ciphertext_len(algorithm, message.len())?;
        validation::check_exact(Param::Output, out.len(), expected)?;

        let ad = ad.unwrap_or_default();
        if !self.provider.aead_encrypt(algorithm, out, message, ad, nonce, key).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "aead_encrypt" });
        }
        Ok(())
    }

    /// Verify and decrypt a combined ciphertext into `out`.
    pub fn decrypt_into(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        ciphertext: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        check_key_and_nonce(algorithm, nonce, key)?;
        let expected = encoding::aead_plaintext_len(algorithm, ciphertext.len())?;
        validation::check_exact(Param::Output, out.len(), expected)?;

        let ad = ad.unwrap_or_default();
        if !self.provider.aead_decrypt(algorithm, out, ciphertext, ad, nonce, key).is_success() {
            out.zeroize();
            return Err(CryptoError::AuthenticationFailed);
        }
        Ok(())
    }

    /// Encrypt `message` into `out` and write the tag into `mac`.
    #[allow(clippy::too_many_arguments)]
    pub fn encrypt_detached_into(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        mac: &mut [u8],
        message: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        check_key_and_nonce(algorithm, nonce, key)?;
        validation::check_exact(Param::Output, out.len(), message.len())?;
        validation::check_exact(Param::Mac, mac.len(), algorithm.abytes())?;

        let ad = ad.unwrap_or_default();
        if !self
            .provider
            .aead_encrypt_detached(algorithm, out, mac, message, ad, nonce, key)
            .is_success()
        {
            return Err(CryptoError::PrimitiveFailure { operation: "aead_encrypt_detached" });
        }
        Ok(())
    }

    /// Verify `mac` over `ciphertext` and decrypt into `out`.
    #[allow(clippy::too_many_arguments)]
    pub fn decrypt_detached_into(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        ciphertext: &[u8],
        mac: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        check_key_and_nonce(algorithm, nonce, key)?;
        validation::check_exact(Param::Mac, mac.len(), algorithm.abytes())?;
        validation::check_exact(Param::Output, out.len(), ciphertext.len())?;

        let ad = ad.unwrap_or_default();
        if !self
            .provider
            .aead_decrypt_detached(algorithm, out, ciphertext, mac, ad, nonce, key)
            .is_success()
        {
            out.zeroize();
            return Err(CryptoError::AuthenticationFailed);
        }
        Ok(())
    }

    // Convenience surface

    /// Encrypt and return ciphertext followed by tag.
    pub fn encrypt(
        &self,
        algorithm: AeadAlgorithm,
        message: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; encoding::aead_ciphertext_len(algorithm, message.len())?];
        self.encrypt_into(algorithm, &mut out, message, ad, nonce, key)?;
        Ok(out)
    }

    /// Verify and decrypt a combined ciphertext.
    pub fn decrypt(
        &self,
        algorithm: AeadAlgorithm,
        ciphertext: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; encoding::aead_plaintext_len(algorithm, ciphertext.len())?];
        self.decrypt_into(algorithm, &mut out, ciphertext, ad, nonce, key)?;
        Ok(out)
    }

    /// Encrypt with the tag returned separately.
    pub fn encrypt_detached(
        &self,
        algorithm: AeadAlgorithm,
        message: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Detached, CryptoError> {
        let mut ciphertext = vec![0u8; message.len()];
        let mut mac = vec![0u8; algorithm.abytes()];
        self.encrypt_detached_into(algorithm, &mut ciphertext, &mut mac, message, ad, nonce, key)?;
        Ok(Detached { ciphertext, mac })
    }

    /// Verify and decrypt a detached ciphertext.
    pub fn decrypt_detached(
        &self,
        algorithm: AeadAlgorithm,
        ciphertext: &[u8],
        mac: &[u8],
        ad: Option<&[u8]>,
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; ciphertext.len()];
        self.decrypt_detached_into(algorithm, &mut out, ciphertext, mac, ad, nonce, key)?;
        Ok(out)
    }

    /// [`encrypt`](Self::encrypt) with hex nonce and key, returning hex.
    pub fn encrypt_hex(
        &self,
        algorithm: AeadAlgorithm,
        message: &[u8],
        ad: Option<&[u8]>,
        nonce_hex: &str,
        key_hex: &str,
    ) -> Result<String, CryptoError> {
        let nonce = encoding::from_hex(Param::Nonce, nonce_hex)?;
        let key = Zeroizing::new(encoding::from_hex(Param::Key, key_hex)?);
        self.encrypt(algorithm, message, ad, &nonce, &key).map(|sealed| encoding::to_hex(&sealed))
    }

    /// [`decrypt`](Self::decrypt) with hex ciphertext, nonce and key.
    pub fn decrypt_hex(
        &self,
        algorithm: AeadAlgorithm,
        ciphertext_hex: &str,
        ad: Option<&[u8]>,
        nonce_hex: &str,
        key_hex: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = encoding::from_hex(Param::Ciphertext, ciphertext_hex)?;
        let nonce = encoding::from_hex(Param::Nonce, nonce_hex)?;
        let key = Zeroizing::new(encoding::from_hex(Param::Key, key_hex)?);
        self.decrypt(algorithm, &ciphertext, ad, &nonce, &key)
    }

    /// Fresh random key for `algorithm`.
    pub fn keygen(&self, algorithm: AeadAlgorithm) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; algorithm.key_bytes()]);
        self.provider.random_bytes(&mut key);
        key
    }

    /// Fresh random nonce for `algorithm`.
    ///
    /// Random nonces are only safe for algorithms with a nonce large enough
    /// to make collisions negligible; prefer a counter for the 8-byte form.
    pub fn nonce(&self, algorithm: AeadAlgorithm) -> Vec<u8> {
        let mut nonce = vec![0u8; algorithm.nonce_bytes()];
        self.provider.random_bytes(&mut nonce);
        nonce
    }
}
