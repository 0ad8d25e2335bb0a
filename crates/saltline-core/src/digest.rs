//! Incremental hash/MAC sessions
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐ init ┌─────────────┐ update ┌─────────┐ finalize ┌───────────┐
//! │ Uninitialized │─────>│ Initialized │───────>│ Updated │─────────>│ Finalized │
//! └───────────────┘      └─────────────┘        └─────────┘          └───────────┘
//!                               │                  ↺ update               ↑
//!                               └─────────────────────────────────────────┘
//!                                             finalize
//! ```
//!
//! `update` and `finalize` outside `Initialized`/`Updated` fail with
//! [`CryptoError::InvalidState`]. `init` may be called in any phase and
//! starts a fresh computation.
//!
//! The native surface ([`Hashing::init`], [`Hashing::update`],
//! [`Hashing::finalize`], [`Hashing::digest`], [`Hashing::verify`]) works on
//! caller buffers. The convenience surface ([`Hashing::start`],
//! [`Hashing::hash`], [`Hashing::mac`] and their hex forms) sizes and
//! allocates, then calls the native surface.
//!
//! [`Hashing::shorthash_into`] is a separate keyed 64-bit function
//! (SipHash-2-4) for hash tables and other short inputs. It has no session.

use saltline_crypto::{DigestAlgorithm, Provider, digest::generichash, shorthash};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    encoding,
    error::{Bound, CryptoError, Param},
    validation,
};

/// Lifecycle phase of a [`DigestSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestPhase {
    /// Created, `init` not yet called
    Uninitialized,
    /// `init` succeeded, no data absorbed yet
    Initialized,
    /// At least one `update` succeeded
    Updated,
    /// `finalize` succeeded; terminal until re-initialized
    Finalized,
}

impl DigestPhase {
    /// Lowercase name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Updated => "updated",
            Self::Finalized => "finalized",
        }
    }

    fn accepts_data(self) -> bool {
        matches!(self, Self::Initialized | Self::Updated)
    }
}

/// Caller-owned state of one hash or MAC computation.
///
/// Not shared across computations: parallel digests need independent
/// sessions.
pub struct DigestSession<P: Provider> {
    state: P::DigestState,
    phase: DigestPhase,
    algorithm: Option<DigestAlgorithm>,
    out_len: usize,
}

impl<P: Provider> DigestSession<P> {
    /// Fresh, uninitialized session.
    pub fn new() -> Self {
        Self {
            state: P::DigestState::default(),
            phase: DigestPhase::Uninitialized,
            algorithm: None,
            out_len: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DigestPhase {
        self.phase
    }

    /// Algorithm chosen at `init`.
    pub fn algorithm(&self) -> Option<DigestAlgorithm> {
        self.algorithm
    }

    /// Output length declared at `init`; zero before.
    pub fn output_len(&self) -> usize {
        self.out_len
    }

    fn require_data_phase(&self, operation: &'static str) -> Result<(), CryptoError> {
        if self.phase.accepts_data() {
            Ok(())
        } else {
            Err(CryptoError::InvalidState { state: self.phase.name(), operation })
        }
    }
}

impl<P: Provider> Default for DigestSession<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Provider> Clone for DigestSession<P> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            phase: self.phase,
            algorithm: self.algorithm,
            out_len: self.out_len,
        }
    }
}

impl<P: Provider> std::fmt::Debug for DigestSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestSession")
            .field("phase", &self.phase)
            .field("algorithm", &self.algorithm)
            .field("out_len", &self.out_len)
            .finish_non_exhaustive()
    }
}

/// Key and output-length contract for `init`.
fn check_init(
    algorithm: DigestAlgorithm,
    key: Option<&[u8]>,
    out_len: usize,
) -> Result<(), CryptoError> {
    validation::check_range(Param::Output, out_len, algorithm.bytes_min(), algorithm.bytes_max())?;

    match (algorithm.accepts_key(), algorithm.requires_key(), key) {
        (false, _, Some(key)) => validation::check_exact(Param::Key, key.len(), 0),
        (true, true, None) => validation::check_exact(Param::Key, 0, algorithm.key_bytes()),
        (true, false, key) => validation::check_optional_key(
            key,
            generichash::KEYBYTES_MIN,
            generichash::KEYBYTES_MAX,
        ),
        _ => Ok(()),
    }
}

/// SHA-2 takes no key; an empty one is the same as none.
fn effective_key(algorithm: DigestAlgorithm, key: Option<&[u8]>) -> Option<&[u8]> {
    if algorithm.accepts_key() { key } else { key.filter(|key| !key.is_empty()) }
}

/// Key contract for one-shot MACs: HMAC keys are exactly `KEYBYTES`.
fn check_one_shot_key(algorithm: DigestAlgorithm, key: Option<&[u8]>) -> Result<(), CryptoError> {
    match (algorithm.requires_key(), key) {
        (true, Some(key)) => validation::check_exact(Param::Key, key.len(), algorithm.key_bytes()),
        _ => Ok(()),
    }
}

/// Hash and MAC capability.
pub struct Hashing<'p, P: Provider> {
    provider: &'p P,
}

impl<P: Provider> Clone for Hashing<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Provider> Copy for Hashing<'_, P> {}

impl<'p, P: Provider> Hashing<'p, P> {
    /// Hashing capability over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    // Native surface

    /// Start a computation in `session`, discarding anything it held.
    ///
    /// HMAC algorithms require a key of any length; BLAKE2b takes an
    /// optional key of `KEYBYTES_MIN..=KEYBYTES_MAX` bytes; SHA-2 takes none.
    pub fn init(
        &self,
        session: &mut DigestSession<P>,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        out_len: usize,
    ) -> Result<(), CryptoError> {
        check_init(algorithm, key, out_len)?;
        let key = effective_key(algorithm, key);

        let mut state = P::DigestState::default();
        if !self.provider.digest_init(&mut state, algorithm, key, out_len).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "digest_init" });
        }

        session.state = state;
        session.phase = DigestPhase::Initialized;
        session.algorithm = Some(algorithm);
        session.out_len = out_len;

        tracing::trace!(algorithm = algorithm.name(), out_len, keyed = key.is_some(), "digest initialized");
        Ok(())
    }

    /// Absorb `data`. Zero-length input is accepted.
    pub fn update(&self, session: &mut DigestSession<P>, data: &[u8]) -> Result<(), CryptoError> {
        session.require_data_phase("update")?;

        if !self.provider.digest_update(&mut session.state, data).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "digest_update" });
        }

        session.phase = DigestPhase::Updated;
        Ok(())
    }

    /// Write the result into `out`, which must be exactly the declared length.
    pub fn finalize(&self, session: &mut DigestSession<P>, out: &mut [u8]) -> Result<(), CryptoError> {
        session.require_data_phase("finalize")?;
        validation::check_exact(Param::Output, out.len(), session.out_len)?;

        if !self.provider.digest_final(&mut session.state, out).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "digest_final" });
        }

        session.phase = DigestPhase::Finalized;
        tracing::trace!(out_len = session.out_len, "digest finalized");
        Ok(())
    }

    /// One-shot digest of `input` into `out`; `out.len()` is the output length.
    pub fn digest(
        &self,
        algorithm: DigestAlgorithm,
        out: &mut [u8],
        input: &[u8],
        key: Option<&[u8]>,
    ) -> Result<(), CryptoError> {
        check_init(algorithm, key, out.len())?;
        check_one_shot_key(algorithm, key)?;
        let key = effective_key(algorithm, key);

        if !self.provider.digest(algorithm, out, input, key).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "digest" });
        }
        Ok(())
    }

    /// Recompute the MAC of `input` and compare it to `mac` in constant time.
    ///
    /// `Ok(false)` means the MAC did not match.
    pub fn verify(
        &self,
        algorithm: DigestAlgorithm,
        mac: &[u8],
        input: &[u8],
        key: Option<&[u8]>,
    ) -> Result<bool, CryptoError> {
        validation::check_range(Param::Mac, mac.len(), algorithm.bytes_min(), algorithm.bytes_max())?;

        let mut expected = Zeroizing::new(vec![0u8; mac.len()]);
        self.digest(algorithm, &mut expected, input, key)?;
        Ok(bool::from(expected.as_slice().ct_eq(mac)))
    }

    // Convenience surface

    /// Begin an owned incremental computation.
    pub fn start(
        &self,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        out_len: usize,
    ) -> Result<Digester<'p, P>, CryptoError> {
        let mut session = DigestSession::new();
        self.init(&mut session, algorithm, key, out_len)?;
        Ok(Digester { hashing: *self, session })
    }

    /// Unkeyed digest of the algorithm's default length.
    pub fn hash(&self, algorithm: DigestAlgorithm, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; algorithm.bytes()];
        self.digest(algorithm, &mut out, input, None)?;
        Ok(out)
    }

    /// [`hash`](Self::hash) as uppercase hex.
    pub fn hash_hex(&self, algorithm: DigestAlgorithm, input: &[u8]) -> Result<String, CryptoError> {
        self.hash(algorithm, input).map(|digest| encoding::to_hex(&digest))
    }

    /// Keyed digest (MAC) of the algorithm's default length.
    pub fn mac(
        &self,
        algorithm: DigestAlgorithm,
        input: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if !algorithm.accepts_key() {
            return Err(CryptoError::InvalidLength {
                param: Param::Key,
                expected: Bound::Exact(0),
                actual: key.len() as u64,
            });
        }

        let mut out = vec![0u8; algorithm.bytes()];
        self.digest(algorithm, &mut out, input, Some(key))?;
        Ok(out)
    }

    /// [`mac`](Self::mac) as uppercase hex.
    pub fn mac_hex(
        &self,
        algorithm: DigestAlgorithm,
        input: &[u8],
        key: &[u8],
    ) -> Result<String, CryptoError> {
        self.mac(algorithm, input, key).map(|mac| encoding::to_hex(&mac))
    }

    /// Verify a hex MAC; a mismatch is [`CryptoError::AuthenticationFailed`].
    pub fn verify_hex(
        &self,
        algorithm: DigestAlgorithm,
        mac_hex: &str,
        input: &[u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        let mac = encoding::from_hex(Param::Mac, mac_hex)?;
        if self.verify(algorithm, &mac, input, Some(key))? {
            Ok(())
        } else {
            Err(CryptoError::AuthenticationFailed)
        }
    }

    /// Fresh random key of the algorithm's recommended length.
    pub fn keygen(&self, algorithm: DigestAlgorithm) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; algorithm.key_bytes()]);
        self.provider.random_bytes(&mut key);
        key
    }

    /// SipHash-2-4 of `input` under a 16-byte `key` into an 8-byte `out`.
    pub fn shorthash_into(&self, out: &mut [u8], input: &[u8], key: &[u8]) -> Result<(), CryptoError> {
        validation::check_exact(Param::Key, key.len(), shorthash::KEYBYTES)?;
        validation::check_exact(Param::Output, out.len(), shorthash::BYTES)?;

        if !self.provider.shorthash(out, input, key).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "shorthash" });
        }
        Ok(())
    }

    /// [`shorthash_into`](Self::shorthash_into) returning the 8 bytes.
    pub fn shorthash(&self, input: &[u8], key: &[u8]) -> Result<[u8; shorthash::BYTES], CryptoError> {
        let mut out = [0u8; shorthash::BYTES];
        self.shorthash_into(&mut out, input, key)?;
        Ok(out)
    }

    /// [`shorthash`](Self::shorthash) as uppercase hex.
    pub fn shorthash_hex(&self, input: &[u8], key: &[u8]) -> Result<String, CryptoError> {
        self.shorthash(input, key).map(|hash| encoding::to_hex(&hash))
    }

    /// Fresh random shorthash key.
    pub fn shorthash_keygen(&self) -> Zeroizing<[u8; shorthash::KEYBYTES]> {
        let mut key = Zeroizing::new([0u8; shorthash::KEYBYTES]);
        self.provider.random_bytes(&mut key[..]);
        key
    }
}

/// Owned incremental digest, produced by [`Hashing::start`].
pub struct Digester<'p, P: Provider> {
    hashing: Hashing<'p, P>,
    session: DigestSession<P>,
}

impl<P: Provider> Digester<'_, P> {
    /// Absorb `data`; chains.
    pub fn update(&mut self, data: &[u8]) -> Result<&mut Self, CryptoError> {
        self.hashing.update(&mut self.session, data)?;
        Ok(self)
    }

    /// Output length declared at start.
    pub fn output_len(&self) -> usize {
        self.session.output_len()
    }

    /// Finish and return the digest.
    pub fn finalize(mut self) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; self.session.output_len()];
        self.hashing.finalize(&mut self.session, &mut out)?;
        Ok(out)
    }

    /// Finish and return the digest as uppercase hex.
    pub fn finalize_hex(self) -> Result<String, CryptoError> {
        self.finalize().map(|digest| encoding::to_hex(&digest))
    }

    /// Finish and compare against `mac` in constant time.
    pub fn verify(mut self, mac: &[u8]) -> Result<bool, CryptoError> {
        validation::check_exact(Param::Mac, mac.len(), self.session.output_len())?;

        let mut expected = Zeroizing::new(vec![0u8; mac.len()]);
        self.hashing.finalize(&mut self.session, &mut expected)?;
        Ok(bool::from(expected.as_slice().ct_eq(mac)))
    }
}

impl<P: Provider> std::fmt::Debug for Digester<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digester").field("session", &self.session).finish()
    }
}

#[cfg(test)]
mod tests {
    use saltline_crypto::RustCryptoProvider;

    use super::*;
    use crate::{error::ErrorKind, testing::RecordingProvider};

    const SHA256_ABC: &str = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";

    #[test]
    fn session_walks_through_every_phase() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let mut session = DigestSession::new();
        assert_eq!(session.phase(), DigestPhase::Uninitialized);

        hashing.init(&mut session, DigestAlgorithm::Sha256, None, 32).unwrap();
        assert_eq!(session.phase(), DigestPhase::Initialized);

        hashing.update(&mut session, b"abc").unwrap();
        assert_eq!(session.phase(), DigestPhase::Updated);

        let mut out = [0u8; 32];
        hashing.finalize(&mut session, &mut out).unwrap();
        assert_eq!(session.phase(), DigestPhase::Finalized);
        assert_eq!(encoding::to_hex(&out), SHA256_ABC);
    }

    #[test]
    fn finalize_without_update_hashes_empty_input() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);

        let mut session = DigestSession::new();
        hashing.init(&mut session, DigestAlgorithm::GenericHash, None, 32).unwrap();
        let mut out = [0u8; 32];
        hashing.finalize(&mut session, &mut out).unwrap();

        assert_eq!(out.to_vec(), hashing.hash(DigestAlgorithm::GenericHash, b"").unwrap());
    }

    #[test]
    fn use_outside_lifecycle_is_invalid_state() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let mut session = DigestSession::new();
        let mut out = [0u8; 32];

        let error = hashing.update(&mut session, b"x").unwrap_err();
        assert_eq!(error, CryptoError::InvalidState { state: "uninitialized", operation: "update" });

        hashing.init(&mut session, DigestAlgorithm::Sha256, None, 32).unwrap();
        hashing.finalize(&mut session, &mut out).unwrap();

        let error = hashing.update(&mut session, b"x").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidState);
        let error = hashing.finalize(&mut session, &mut out).unwrap_err();
        assert_eq!(error, CryptoError::InvalidState { state: "finalized", operation: "finalize" });
    }

    #[test]
    fn reinit_restarts_a_finalized_session() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let mut session = DigestSession::new();
        let mut out = [0u8; 32];

        hashing.init(&mut session, DigestAlgorithm::Sha256, None, 32).unwrap();
        hashing.finalize(&mut session, &mut out).unwrap();
        hashing.init(&mut session, DigestAlgorithm::Sha256, None, 32).unwrap();
        hashing.update(&mut session, b"abc").unwrap();
        hashing.finalize(&mut session, &mut out).unwrap();

        assert_eq!(encoding::to_hex(&out), SHA256_ABC);
    }

    #[test]
    fn wrong_output_buffer_keeps_session_open() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let mut session = DigestSession::new();
        hashing.init(&mut session, DigestAlgorithm::GenericHash, None, 20).unwrap();

        let mut short = [0u8; 19];
        let error = hashing.finalize(&mut session, &mut short).unwrap_err();
        assert!(matches!(error, CryptoError::InvalidLength { param: Param::Output, .. }));
        assert_eq!(session.phase(), DigestPhase::Initialized);

        let mut exact = [0u8; 20];
        hashing.finalize(&mut session, &mut exact).unwrap();
    }

    #[test]
    fn validation_runs_before_the_provider() {
        let provider = RecordingProvider::new();
        let hashing = Hashing::new(&provider);
        let mut session = DigestSession::new();

        let bad_inits: [(DigestAlgorithm, Option<&[u8]>, usize); 5] = [
            (DigestAlgorithm::GenericHash, None, 15),
            (DigestAlgorithm::GenericHash, None, 65),
            (DigestAlgorithm::GenericHash, Some(&[0u8; 15][..]), 32),
            (DigestAlgorithm::Sha512, Some(&[0u8; 32][..]), 64),
            (DigestAlgorithm::HmacSha256, None, 32),
        ];
        for (algorithm, key, out_len) in bad_inits {
            let error = hashing.init(&mut session, algorithm, key, out_len).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation, "{algorithm:?}");
        }

        assert_eq!(provider.calls(), 0);
        assert_eq!(session.phase(), DigestPhase::Uninitialized);
    }

    #[test]
    fn provider_failure_is_a_primitive_error() {
        let provider = RecordingProvider::failing();
        let hashing = Hashing::new(&provider);
        let mut session = DigestSession::new();

        let error = hashing.init(&mut session, DigestAlgorithm::Sha256, None, 32).unwrap_err();
        assert_eq!(error, CryptoError::PrimitiveFailure { operation: "digest_init" });
        assert!(!error.is_recoverable());
        assert_eq!(session.phase(), DigestPhase::Uninitialized);
    }

    #[test]
    fn digester_chains_updates() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);

        let mut digester = hashing.start(DigestAlgorithm::Sha256, None, 32).unwrap();
        digester.update(b"a").unwrap().update(b"bc").unwrap();
        assert_eq!(digester.finalize_hex().unwrap(), SHA256_ABC);
    }

    #[test]
    fn digester_verify_compares_whole_mac() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let key = [4u8; 32];
        let mac = hashing.mac(DigestAlgorithm::HmacSha512, b"chunked", &key).unwrap();

        let mut digester = hashing.start(DigestAlgorithm::HmacSha512, Some(&key[..]), 64).unwrap();
        digester.update(b"chun").unwrap().update(b"ked").unwrap();
        assert!(digester.verify(&mac).unwrap());

        let mut digester = hashing.start(DigestAlgorithm::HmacSha512, Some(&key[..]), 64).unwrap();
        digester.update(b"chunked!").unwrap();
        assert!(!digester.verify(&mac).unwrap());

        let digester = hashing.start(DigestAlgorithm::HmacSha512, Some(&key[..]), 64).unwrap();
        let error = digester.verify(&mac[..32]).unwrap_err();
        assert!(matches!(error, CryptoError::InvalidLength { param: Param::Mac, .. }));
    }

    #[test]
    fn one_shot_mac_requires_exact_key_length() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);

        assert!(hashing.mac(DigestAlgorithm::HmacSha256, b"data", &[1u8; 32]).is_ok());
        let error = hashing.mac(DigestAlgorithm::HmacSha256, b"data", &[1u8; 31]).unwrap_err();
        assert!(matches!(
            error,
            CryptoError::InvalidLength { param: Param::Key, expected: Bound::Exact(32), actual: 31 }
        ));

        // Incremental HMAC follows the HMAC construction and takes any key length.
        let mut digester = hashing.start(DigestAlgorithm::HmacSha256, Some(b"Jefe".as_slice()), 32).unwrap();
        digester.update(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            digester.finalize_hex().unwrap(),
            "5BDCC146BF60754E6A042426089575C75A003F089D2739839DEC58B964EC3843"
        );
    }

    #[test]
    fn unkeyed_algorithms_refuse_mac() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        assert!(hashing.mac(DigestAlgorithm::Sha256, b"data", &[1u8; 32]).is_err());
    }

    #[test]
    fn verify_distinguishes_mismatch_from_bad_input() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let key = hashing.keygen(DigestAlgorithm::HmacSha512256);
        assert_eq!(key.len(), 32);

        let mac_hex = hashing.mac_hex(DigestAlgorithm::HmacSha512256, b"message", &key).unwrap();
        hashing.verify_hex(DigestAlgorithm::HmacSha512256, &mac_hex, b"message", &key).unwrap();

        let error = hashing
            .verify_hex(DigestAlgorithm::HmacSha512256, &mac_hex, b"massage", &key)
            .unwrap_err();
        assert_eq!(error, CryptoError::AuthenticationFailed);

        let error = hashing
            .verify_hex(DigestAlgorithm::HmacSha512256, "not hex", b"message", &key)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);

        let mac = encoding::from_hex(Param::Mac, &mac_hex).unwrap();
        let error =
            hashing.verify(DigestAlgorithm::HmacSha512256, &mac[..31], b"message", Some(key.as_slice())).unwrap_err();
        assert!(matches!(error, CryptoError::InvalidLength { param: Param::Mac, .. }));
        assert!(!hashing.verify(DigestAlgorithm::HmacSha512256, &mac, b"massage", Some(key.as_slice())).unwrap());
    }

    #[test]
    fn shorthash_matches_siphash_reference() {
        let provider = RustCryptoProvider::new();
        let hashing = Hashing::new(&provider);
        let key: Vec<u8> = (0..16).collect();

        assert_eq!(hashing.shorthash_hex(b"", &key).unwrap(), "310E0EDD47DB6F72");
        let input: Vec<u8> = (0..15).collect();
        assert_eq!(hashing.shorthash(&input, &key).unwrap(), [0xe5, 0x45, 0xbe, 0x49, 0x61, 0xca, 0x29, 0xa1]);

        let fresh = hashing.shorthash_keygen();
        assert_ne!(hashing.shorthash(&input, fresh.as_slice()).unwrap(), hashing.shorthash(&input, &key).unwrap());
    }

    #[test]
    fn shorthash_sizes_are_checked_before_the_provider() {
        let provider = RecordingProvider::new();
        let hashing = Hashing::new(&provider);

        let error = hashing.shorthash(b"x", &[0u8; 15]).unwrap_err();
        assert_eq!(error, CryptoError::InvalidLength { param: Param::Key, expected: Bound::Exact(16), actual: 15 });

        let mut long = [0u8; 9];
        let error = hashing.shorthash_into(&mut long, b"x", &[0u8; 16]).unwrap_err();
        assert!(matches!(error, CryptoError::InvalidLength { param: Param::Output, .. }));
        assert_eq!(provider.calls(), 0);

        hashing.shorthash(b"x", &[0u8; 16]).unwrap();
        assert_eq!(provider.calls(), 1);
    }
}
