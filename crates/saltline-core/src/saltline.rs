//! Facade composing every capability over one provider.

use saltline_crypto::{Provider, RustCryptoProvider};

use crate::{
    aead::Aead, digest::Hashing, kdf::Kdf, pwhash::PwHash, random::Random, stream::SecretStream,
};

/// Entry point: owns a provider and hands out capability views onto it.
///
/// Holds no mutable state of its own. Sessions are created by the caller and
/// passed in, so one `Saltline` can serve any number of independent digests
/// and streams.
///
/// ```
/// use saltline_core::{Saltline, Tag};
///
/// # fn main() -> Result<(), saltline_core::CryptoError> {
/// let saltline = Saltline::new();
/// let key = saltline.secret_stream().keygen();
///
/// let (mut tx, header) = saltline.secret_stream().pusher(&key)?;
/// let chunk = tx.push(b"hello", None, Tag::Final)?;
///
/// let mut rx = saltline.secret_stream().puller(&key, header.as_bytes())?;
/// let (plaintext, tag) = rx.pull(&chunk, None)?;
/// assert_eq!(plaintext, b"hello");
/// assert_eq!(tag, Tag::Final);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Saltline<P: Provider = RustCryptoProvider> {
    provider: P,
}

impl Saltline {
    /// Facade over the RustCrypto provider with OS entropy.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Provider> Saltline<P> {
    /// Facade over `provider`.
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Incremental and one-shot hashing and MACs.
    pub fn hashing(&self) -> Hashing<'_, P> {
        Hashing::new(&self.provider)
    }

    /// Chunked authenticated encryption.
    pub fn secret_stream(&self) -> SecretStream<'_, P> {
        SecretStream::new(&self.provider)
    }

    /// One-shot AEAD.
    pub fn aead(&self) -> Aead<'_, P> {
        Aead::new(&self.provider)
    }

    /// Subkey derivation.
    pub fn kdf(&self) -> Kdf<'_, P> {
        Kdf::new(&self.provider)
    }

    /// Password hashing.
    pub fn pwhash(&self) -> PwHash<'_, P> {
        PwHash::new(&self.provider)
    }

    /// Random bytes.
    pub fn random(&self) -> Random<'_, P> {
        Random::new(&self.provider)
    }
}
