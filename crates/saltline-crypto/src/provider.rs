//! The provider boundary and its RustCrypto implementation.

use crate::{
    AeadAlgorithm, DigestAlgorithm, DigestState, Entropy, OsEntropy, SecretStreamState, Status,
    aead, deterministic, digest, kdf, pwhash, secretstream, shorthash,
};

/// Trusted primitive operations, called with exactly-sized buffers.
///
/// Every method writes only into the buffers it is given and reports a
/// [`Status`]. Implementations never panic on caller input and never
/// retry. Buffers whose length differs from the published contract are
/// refused with a failure status.
///
/// # Failure meaning
///
/// A failed [`secretstream_pull`](Self::secretstream_pull),
/// [`aead_decrypt`](Self::aead_decrypt) or
/// [`aead_decrypt_detached`](Self::aead_decrypt_detached) on correctly
/// sized buffers means the input did not authenticate. A failed
/// `secretstream_pull` leaves its state, output and tag untouched; a failed
/// AEAD decryption zeroes its output. Every other failure is generic.
pub trait Provider {
    /// Opaque incremental hash/MAC state.
    type DigestState: Default + Clone;

    /// Opaque secret stream state.
    type StreamState: Default + Clone;

    /// Fill `buffer` with cryptographically secure random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Fill `out` with the reproducible sequence for a 32-byte `seed`.
    fn random_bytes_deterministic(&self, out: &mut [u8], seed: &[u8]) -> Status;

    /// SipHash-2-4 of `input` under a 16-byte `key` into an 8-byte `out`.
    fn shorthash(&self, out: &mut [u8], input: &[u8], key: &[u8]) -> Status;

    /// Start a digest of `out_len` bytes, keyed when `key` is given.
    fn digest_init(
        &self,
        state: &mut Self::DigestState,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        out_len: usize,
    ) -> Status;

    /// Absorb `data` into an initialized digest.
    fn digest_update(&self, state: &mut Self::DigestState, data: &[u8]) -> Status;

    /// Write the digest into `out` and consume the state.
    fn digest_final(&self, state: &mut Self::DigestState, out: &mut [u8]) -> Status;

    /// One-shot digest of `input` into `out`.
    fn digest(
        &self,
        algorithm: DigestAlgorithm,
        out: &mut [u8],
        input: &[u8],
        key: Option<&[u8]>,
    ) -> Status {
        let mut state = Self::DigestState::default();
        let status = self.digest_init(&mut state, algorithm, key, out.len());
        if !status.is_success() {
            return status;
        }
        let status = self.digest_update(&mut state, input);
        if !status.is_success() {
            return status;
        }
        self.digest_final(&mut state, out)
    }

    /// Initialize a push state and write a fresh header.
    fn secretstream_init_push(
        &self,
        state: &mut Self::StreamState,
        header: &mut [u8],
        key: &[u8],
    ) -> Status;

    /// Initialize a pull state from the sender's header.
    fn secretstream_init_pull(
        &self,
        state: &mut Self::StreamState,
        header: &[u8],
        key: &[u8],
    ) -> Status;

    /// Encrypt one chunk; `out` is `message.len() + ABYTES` bytes.
    fn secretstream_push(
        &self,
        state: &mut Self::StreamState,
        out: &mut [u8],
        message: &[u8],
        ad: &[u8],
        tag: u8,
    ) -> Status;

    /// Verify and decrypt one chunk; `out` is `input.len() - ABYTES` bytes.
    fn secretstream_pull(
        &self,
        state: &mut Self::StreamState,
        out: &mut [u8],
        tag: &mut u8,
        input: &[u8],
        ad: &[u8],
    ) -> Status;

    /// Derive a new subkey and nonce from the current state.
    fn secretstream_rekey(&self, state: &mut Self::StreamState);

    /// Combined-mode AEAD encryption.
    fn aead_encrypt(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status;

    /// Combined-mode AEAD decryption.
    fn aead_decrypt(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status;

    /// Detached-mode AEAD encryption.
    #[allow(clippy::too_many_arguments)]
    fn aead_encrypt_detached(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        mac: &mut [u8],
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status;

    /// Detached-mode AEAD decryption.
    #[allow(clippy::too_many_arguments)]
    fn aead_decrypt_detached(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        ciphertext: &[u8],
        mac: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status;

    /// Derive subkey `subkey_id` of `subkey.len()` bytes.
    fn kdf_derive_from_key(
        &self,
        subkey: &mut [u8],
        subkey_id: u64,
        context: &[u8],
        master_key: &[u8],
    ) -> Status;

    /// Raw password-based key derivation.
    fn pwhash(
        &self,
        out: &mut [u8],
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: u64,
    ) -> Status;

    /// Password hash string, NUL-padded into `out`.
    fn pwhash_str(&self, out: &mut [u8], passwd: &[u8], opslimit: u64, memlimit: u64) -> Status;

    /// Verify `passwd` against a password hash string.
    fn pwhash_str_verify(&self, hash_str: &[u8], passwd: &[u8]) -> Status;

    /// `0` when current, `1` when the string should be rehashed with these
    /// limits, `-1` when it is not a valid hash string.
    fn pwhash_str_needs_rehash(&self, hash_str: &[u8], opslimit: u64, memlimit: u64) -> Status;
}

/// [`Provider`] backed by RustCrypto primitives.
#[derive(Debug, Clone, Default)]
pub struct RustCryptoProvider<E: Entropy = OsEntropy> {
    entropy: E,
}

impl RustCryptoProvider {
    /// Provider drawing randomness from the operating system.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Entropy> RustCryptoProvider<E> {
    /// Provider drawing randomness from `entropy`.
    pub fn with_entropy(entropy: E) -> Self {
        Self { entropy }
    }
}

impl<E: Entropy> Provider for RustCryptoProvider<E> {
    type DigestState = DigestState;
    type StreamState = SecretStreamState;

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.entropy.fill(buffer);
    }

    fn random_bytes_deterministic(&self, out: &mut [u8], seed: &[u8]) -> Status {
        deterministic::fill(out, seed)
    }

    fn shorthash(&self, out: &mut [u8], input: &[u8], key: &[u8]) -> Status {
        shorthash::hash(out, input, key)
    }

    fn digest_init(
        &self,
        state: &mut DigestState,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        out_len: usize,
    ) -> Status {
        digest::init(state, algorithm, key, out_len)
    }

    fn digest_update(&self, state: &mut DigestState, data: &[u8]) -> Status {
        digest::update(state, data)
    }

    fn digest_final(&self, state: &mut DigestState, out: &mut [u8]) -> Status {
        digest::finalize(state, out)
    }

    fn secretstream_init_push(
        &self,
        state: &mut SecretStreamState,
        header: &mut [u8],
        key: &[u8],
    ) -> Status {
        secretstream::init_push(state, header, key, &self.entropy)
    }

    fn secretstream_init_pull(
        &self,
        state: &mut SecretStreamState,
        header: &[u8],
        key: &[u8],
    ) -> Status {
        secretstream::init_pull(state, header, key)
    }

    fn secretstream_push(
        &self,
        state: &mut SecretStreamState,
        out: &mut [u8],
        message: &[u8],
        ad: &[u8],
        tag: u8,
    ) -> Status {
        secretstream::push(state, out, message, ad, tag)
    }

    fn secretstream_pull(
        &self,
        state: &mut SecretStreamState,
        out: &mut [u8],
        tag: &mut u8,
        input: &[u8],
        ad: &[u8],
    ) -> Status {
        secretstream::pull(state, out, tag, input, ad)
    }

    fn secretstream_rekey(&self, state: &mut SecretStreamState) {
        secretstream::rekey(state);
    }

    fn aead_encrypt(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status {
        aead::encrypt(algorithm, out, message, ad, nonce, key)
    }

    fn aead_decrypt(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        ciphertext: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status {
        aead::decrypt(algorithm, out, ciphertext, ad, nonce, key)
    }

    fn aead_encrypt_detached(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        mac: &mut [u8],
        message: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status {
        aead::encrypt_detached(algorithm, out, mac, message, ad, nonce, key)
    }

    fn aead_decrypt_detached(
        &self,
        algorithm: AeadAlgorithm,
        out: &mut [u8],
        ciphertext: &[u8],
        mac: &[u8],
        ad: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Status {
        aead::decrypt_detached(algorithm, out, ciphertext, mac, ad, nonce, key)
    }

    fn kdf_derive_from_key(
        &self,
        subkey: &mut [u8],
        subkey_id: u64,
        context: &[u8],
        master_key: &[u8],
    ) -> Status {
        kdf::derive_from_key(subkey, subkey_id, context, master_key)
    }

    fn pwhash(
        &self,
        out: &mut [u8],
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: u64,
    ) -> Status {
        pwhash::derive(out, passwd, salt, opslimit, memlimit)
    }

    fn pwhash_str(&self, out: &mut [u8], passwd: &[u8], opslimit: u64, memlimit: u64) -> Status {
        pwhash::hash_str(out, passwd, opslimit, memlimit, &self.entropy)
    }

    fn pwhash_str_verify(&self, hash_str: &[u8], passwd: &[u8]) -> Status {
        pwhash::verify_str(hash_str, passwd)
    }

    fn pwhash_str_needs_rehash(&self, hash_str: &[u8], opslimit: u64, memlimit: u64) -> Status {
        pwhash::needs_rehash(hash_str, opslimit, memlimit)
    }
}
