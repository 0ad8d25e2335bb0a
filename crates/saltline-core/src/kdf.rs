//! Subkey derivation from a master key.
//!
//! Subkeys are addressed by a 64-bit id within an 8-byte context. The same
//! (master key, context, id, length) always yields the same subkey.

use saltline_crypto::{Provider, kdf};
use zeroize::Zeroizing;

use crate::{
    encoding,
    error::{CryptoError, Param},
    validation,
};

/// Key derivation capability.
pub struct Kdf<'p, P: Provider> {
    provider: &'p P,
}

impl<P: Provider> Clone for Kdf<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Provider> Copy for Kdf<'_, P> {}

impl<'p, P: Provider> Kdf<'p, P> {
    /// Key derivation capability over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Derive subkey `subkey_id` into `subkey`; its length selects the output size.
    pub fn derive_into(
        &self,
        subkey: &mut [u8],
        subkey_id: u64,
        context: &[u8],
        master_key: &[u8],
    ) -> Result<(), CryptoError> {
        validation::check_range(Param::Subkey, subkey.len(), kdf::BYTES_MIN, kdf::BYTES_MAX)?;
        validation::check_context(context)?;
        validation::check_exact(Param::MasterKey, master_key.len(), kdf::KEYBYTES)?;

        if !self.provider.kdf_derive_from_key(subkey, subkey_id, context, master_key).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "kdf_derive_from_key" });
        }
        Ok(())
    }

    /// Derive a `len`-byte subkey.
    pub fn derive(
        &self,
        len: usize,
        subkey_id: u64,
        context: &[u8],
        master_key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        validation::check_range(Param::Subkey, len, kdf::BYTES_MIN, kdf::BYTES_MAX)?;
        let mut subkey = Zeroizing::new(vec![0u8; len]);
        self.derive_into(&mut subkey, subkey_id, context, master_key)?;
        Ok(subkey)
    }

    /// [`derive`](Self::derive) returning uppercase hex.
    pub fn derive_hex(
        &self,
        len: usize,
        subkey_id: u64,
        context: &[u8],
        master_key: &[u8],
    ) -> Result<String, CryptoError> {
        self.derive(len, subkey_id, context, master_key).map(|subkey| encoding::to_hex(&subkey))
    }

    /// Fresh random master key.
    pub fn keygen(&self) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; kdf::KEYBYTES]);
        self.provider.random_bytes(&mut key);
        key
    }
}
