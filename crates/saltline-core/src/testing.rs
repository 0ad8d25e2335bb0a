//! Provider double for unit tests.
//!
//! Wraps the real provider, counts every call that crosses the boundary and
//! can be switched to report failure from every fallible operation.

use std::cell::Cell;

use saltline_crypto::{
    AeadAlgorithm, DigestAlgorithm, DigestState, Provider, RustCryptoProvider, SecretStreamState,
    Status,
};

pub(crate) struct RecordingProvider {
    inner: RustCryptoProvider,
    calls: Cell<usize>,
    fail: bool,
}

impl RecordingProvider {
    pub(crate) fn new() -> Self {
        Self { inner: RustCryptoProvider::new(), calls: Cell::new(0), fail: false }
    }

    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    fn record(&self, real: impl FnOnce(&RustCryptoProvider) -> Status) -> Status {
        self.calls.set(self.calls.get() + 1);
        if self.fail { Status::FAILURE } else { real(&self.inner) }
    }
}

impl Provider for RecordingProvider {
    type DigestState = DigestState;
    type StreamState = SecretStreamState;

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.calls.set(self.calls.get() + 1);
        self.inner.random_bytes(buffer);
    }

    fn random_bytes_deterministic(&self, out: &mut [u8], seed: &[u8]) -> Status {
        self.record(|p| p.random_bytes_deterministic(out, seed))
    }

    fn shorthash(&self, out: &mut [u8], input: &[u8], key: &[u8]) -> Status {
        self.record(|p| p.shorthash(out, input, key))
    }

    fn digest_init(
        &self,
        state: &mut DigestState,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        out_len: usize,
    ) -> Status {
        self.record(|p| p.digest_init(state, algorithm, key, out_len))
    }

    fn digest_update(&self, state: &mut DigestState, data: &[u8]) -> Status {
        self.record(|p| p.digest_update(state, data))
    }

    fn digest_final(&self, state: &mut DigestState, out: &mut [u8]) -> Status {
        self.record(|p| p.digest_final(state, out))
    }

    fn secretstream_init_push(
        &self,
        state: &mut SecretStreamState,
        header: &mut [u8],
        key: &[u8],
    ) -> Status {
        self.record(|p| p.secretstream_init_push(state, header, key))
    }

    fn secretstream_init_pull(
        &self,
        state: &mut SecretStreamState,
        header: &[u8],
        key: &[u8],
    ) -> Status {
        self.record(|p| p.secretstream_init_pull(state, header, key))
    }

    fn secretstream_push(
        &self,
        state: &mut SecretStreamState,
        out: &mut [u8],
        message: &[u8],
        ad: &[u8],
        tag: u8,
    ) -> Status {
        self.record(|p| p.secretstream_push(state, out, message, ad, tag))
    }

    fn secretstream_pull(
        &self,
        state: &mut SecretStreamState,
        out: &mut [u8],
        tag: &mut u8,
        input: &[u8],
        ad: &[u8],
    ) -> Status {
        self.record(|p| p.secretstream_pull(state, out, tag, input, ad))
    }

    fn secretstream_rekey(&self, state: &mut SecretStreamState) {
        self.calls.set(self.calls.get() + 1);
        self.inner.secretstream_rekey(state);
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
        self.record(|p| p.aead_encrypt(algorithm, out, message, ad, nonce, key))
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
        self.record(|p| p.aead_decrypt(algorithm, out, ciphertext, ad, nonce, key))
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
        self.record(|p| p.aead_encrypt_detached(algorithm, out, mac, message, ad, nonce, key))
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
        self.record(|p| p.aead_decrypt_detached(algorithm, out, ciphertext, mac, ad, nonce, key))
    }

    fn kdf_derive_from_key(
        &self,
        subkey: &mut [u8],
        subkey_id: u64,
        context: &[u8],
        master_key: &[u8],
    ) -> Status {
        self.record(|p| p.kdf_derive_from_key(subkey, subkey_id, context, master_key))
    }

    fn pwhash(
        &self,
        out: &mut [u8],
        passwd: &[u8],
        salt: &[u8],
        opslimit: u64,
        memlimit: u64,
    ) -> Status {
        self.record(|p| p.pwhash(out, passwd, salt, opslimit, memlimit))
    }

    fn pwhash_str(&self, out: &mut [u8], passwd: &[u8], opslimit: u64, memlimit: u64) -> Status {
        self.record(|p| p.pwhash_str(out, passwd, opslimit, memlimit))
    }

    fn pwhash_str_verify(&self, hash_str: &[u8], passwd: &[u8]) -> Status {
        self.record(|p| p.pwhash_str_verify(hash_str, passwd))
    }

    fn pwhash_str_needs_rehash(&self, hash_str: &[u8], opslimit: u64, memlimit: u64) -> Status {
        self.record(|p| p.pwhash_str_needs_rehash(hash_str, opslimit, memlimit))
    }
}
