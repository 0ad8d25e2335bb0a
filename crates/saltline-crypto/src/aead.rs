//! One-shot AEAD constructions
//!
//! Four algorithms with the same shape: a 32-byte key, a per-algorithm
//! nonce and a 16-byte authenticator. Combined mode appends the
//! authenticator to the ciphertext; detached mode writes it to its own
//! buffer.
//!
//! The IETF, extended-nonce and AES-GCM variants go straight through the
//! RustCrypto `AeadInPlace` implementations. The original 64-bit-nonce
//! ChaCha20-Poly1305 construction has no crate of its own and is assembled
//! here from the ChaCha20 legacy keystream and Poly1305.

use aes_gcm::Aes256Gcm;
use chacha20::{
    ChaCha20Legacy, LegacyNonce,
    cipher::{KeyIvInit, StreamCipher},
};
use chacha20poly1305::{
    ChaCha20Poly1305, XChaCha20Poly1305,
    aead::{AeadInPlace, KeyInit, Nonce, Tag},
};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::Status;

/// Key length shared by every AEAD algorithm.
pub const KEYBYTES: usize = 32;

/// Authenticator length shared by every AEAD algorithm.
pub const ABYTES: usize = 16;

/// AEAD algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadAlgorithm {
    /// ChaCha20-Poly1305 with the original 8-byte nonce.
    ChaCha20Poly1305,
    /// ChaCha20-Poly1305 as specified in RFC 8439 (12-byte nonce).
    ChaCha20Poly1305Ietf,
    /// XChaCha20-Poly1305 (24-byte nonce, safe to generate at random).
    XChaCha20Poly1305Ietf,
    /// AES-256 in Galois/Counter Mode (12-byte nonce).
    Aes256Gcm,
}

impl AeadAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 4] = [
        Self::ChaCha20Poly1305,
        Self::ChaCha20Poly1305Ietf,
        Self::XChaCha20Poly1305Ietf,
        Self::Aes256Gcm,
    ];

    /// Key length.
    pub const fn key_bytes(self) -> usize {
        KEYBYTES
    }

    /// Public nonce length.
    pub const fn nonce_bytes(self) -> usize {
        match self {
            Self::ChaCha20Poly1305 => 8,
            Self::ChaCha20Poly1305Ietf | Self::Aes256Gcm => 12,
            Self::XChaCha20Poly1305Ietf => 24,
        }
    }

    /// Authenticator length appended in combined mode.
    pub const fn abytes(self) -> usize {
        ABYTES
    }

    /// Stable lowercase name, used in logs and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChaCha20Poly1305 => "chacha20poly1305",
            Self::ChaCha20Poly1305Ietf => "chacha20poly1305-ietf",
            Self::XChaCha20Poly1305Ietf => "xchacha20poly1305-ietf",
            Self::Aes256Gcm => "aes256gcm",
        }
    }

    fn accepts(self, key: &[u8], nonce: &[u8]) -> bool {
        key.len() == self.key_bytes() && nonce.len() == self.nonce_bytes()
    }
}

/// `out` = ciphertext || authenticator, `message.len() + ABYTES` bytes.
pub(crate) fn encrypt(
    algorithm: AeadAlgorithm,
    out: &mut [u8],
    message: &[u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    if out.len() != message.len() + ABYTES {
        return Status::FAILURE;
    }

    let (body, mac) = out.split_at_mut(message.len());
    body.copy_from_slice(message);
    seal_in_place(algorithm, body, mac, ad, nonce, key)
}

/// `out` receives `ciphertext.len() - ABYTES` bytes of plaintext.
///
/// On failure `out` is zeroed.
pub(crate) fn decrypt(
    algorithm: AeadAlgorithm,
    out: &mut [u8],
    ciphertext: &[u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    if ciphertext.len() < ABYTES || out.len() != ciphertext.len() - ABYTES {
        out.zeroize();
        return Status::FAILURE;
    }

    let (body, mac) = ciphertext.split_at(out.len());
    out.copy_from_slice(body);
    open_in_place(algorithm, out, mac, ad, nonce, key)
}

/// Ciphertext into `out` (same length as `message`), authenticator into `mac`.
pub(crate) fn encrypt_detached(
    algorithm: AeadAlgorithm,
    out: &mut [u8],
    mac: &mut [u8],
    message: &[u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    if out.len() != message.len() || mac.len() != ABYTES {
        return Status::FAILURE;
    }

    out.copy_from_slice(message);
    seal_in_place(algorithm, out, mac, ad, nonce, key)
}

/// Verify `mac` over `ciphertext` and decrypt into `out`.
///
/// On failure `out` is zeroed.
pub(crate) fn decrypt_detached(
    algorithm: AeadAlgorithm,
    out: &mut [u8],
    ciphertext: &[u8],
    mac: &[u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    if out.len() != ciphertext.len() || mac.len() != ABYTES {
        out.zeroize();
        return Status::FAILURE;
    }

    out.copy_from_slice(ciphertext);
    open_in_place(algorithm, out, mac, ad, nonce, key)
}

fn seal_in_place(
    algorithm: AeadAlgorithm,
    buffer: &mut [u8],
    mac: &mut [u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    if !algorithm.accepts(key, nonce) {
        buffer.zeroize();
        return Status::FAILURE;
    }

    match algorithm {
        AeadAlgorithm::ChaCha20Poly1305 => {
            legacy::seal(buffer, mac, ad, nonce, key);
            Status::SUCCESS
        },
        AeadAlgorithm::ChaCha20Poly1305Ietf => {
            seal_with::<ChaCha20Poly1305>(buffer, mac, ad, nonce, key)
        },
        AeadAlgorithm::XChaCha20Poly1305Ietf => {
            seal_with::<XChaCha20Poly1305>(buffer, mac, ad, nonce, key)
        },
        AeadAlgorithm::Aes256Gcm => seal_with::<Aes256Gcm>(buffer, mac, ad, nonce, key),
    }
}

fn open_in_place(
    algorithm: AeadAlgorithm,
    buffer: &mut [u8],
    mac: &[u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    let status = if algorithm.accepts(key, nonce) {
        match algorithm {
            AeadAlgorithm::ChaCha20Poly1305 => legacy::open(buffer, mac, ad, nonce, key),
            AeadAlgorithm::ChaCha20Poly1305Ietf => {
                open_with::<ChaCha20Poly1305>(buffer, mac, ad, nonce, key)
            },
            AeadAlgorithm::XChaCha20Poly1305Ietf => {
                open_with::<XChaCha20Poly1305>(buffer, mac, ad, nonce, key)
            },
            AeadAlgorithm::Aes256Gcm => open_with::<Aes256Gcm>(buffer, mac, ad, nonce, key),
        }
    } else {
        Status::FAILURE
    };

    if !status.is_success() {
        buffer.zeroize();
    }
    status
}

fn seal_with<A: AeadInPlace + KeyInit>(
    buffer: &mut [u8],
    mac: &mut [u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    let Ok(cipher) = A::new_from_slice(key) else {
        return Status::FAILURE;
    };

    match cipher.encrypt_in_place_detached(Nonce::<A>::from_slice(nonce), ad, buffer) {
        Ok(tag) => {
            mac.copy_from_slice(&tag);
            Status::SUCCESS
        },
        Err(_) => Status::FAILURE,
    }
}

fn open_with<A: AeadInPlace + KeyInit>(
    buffer: &mut [u8],
    mac: &[u8],
    ad: &[u8],
    nonce: &[u8],
    key: &[u8],
) -> Status {
    let Ok(cipher) = A::new_from_slice(key) else {
        return Status::FAILURE;
    };

    let result = cipher.decrypt_in_place_detached(
        Nonce::<A>::from_slice(nonce),
        ad,
        buffer,
        Tag::<A>::from_slice(mac),
    );
    Status::from_bool(result.is_ok())
}

/// ChaCha20-Poly1305 with a 64-bit nonce and 64-bit block counter.
///
/// Poly1305 key from keystream block 0, payload from block 1, MAC over
/// `ad || le64(adlen) || c || le64(clen)` without padding.
mod legacy {
    use super::{ChaCha20Legacy, ConstantTimeEq, KeyIvInit, LegacyNonce, StreamCipher, Zeroize};
    use crate::{Status, onetimeauth::Authenticator};

    fn keystream(nonce: &[u8], key: &[u8]) -> (ChaCha20Legacy, Authenticator) {
        let mut cipher =
            ChaCha20Legacy::new(chacha20::Key::from_slice(key), LegacyNonce::from_slice(nonce));
        let mut block0 = [0u8; 64];
        cipher.apply_keystream(&mut block0);
        let poly = Authenticator::new(&block0[..32]);
        block0.zeroize();
        (cipher, poly)
    }

    /// `ad || le64(adlen) || c || le64(clen)`
    fn authenticate(mut poly: Authenticator, ad: &[u8], ciphertext: &[u8]) -> poly1305::Tag {
        poly.update(ad);
        poly.update(&(ad.len() as u64).to_le_bytes());
        poly.update(ciphertext);
        poly.update(&(ciphertext.len() as u64).to_le_bytes());
        poly.finalize()
    }

    pub(super) fn seal(buffer: &mut [u8], mac: &mut [u8], ad: &[u8], nonce: &[u8], key: &[u8]) {
        let (mut cipher, poly) = keystream(nonce, key);
        cipher.apply_keystream(buffer);
        mac.copy_from_slice(&authenticate(poly, ad, buffer));
    }

    pub(super) fn open(buffer: &mut [u8], mac: &[u8], ad: &[u8], nonce: &[u8], key: &[u8]) -> Status {
        let (mut cipher, poly) = keystream(nonce, key);
        let expected = authenticate(poly, ad, buffer);
        if !bool::from(expected.as_slice().ct_eq(mac)) {
            return Status::FAILURE;
        }

        cipher.apply_keystream(buffer);
        Status::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEYBYTES] = [0x42; KEYBYTES];

    fn nonce_for(algorithm: AeadAlgorithm) -> Vec<u8> {
        vec![0x24; algorithm.nonce_bytes()]
    }

    #[test]
    fn combined_round_trip_for_every_algorithm() {
        for algorithm in AeadAlgorithm::ALL {
            let nonce = nonce_for(algorithm);
            let message = b"attack at dawn";

            let mut sealed = vec![0u8; message.len() + ABYTES];
            assert!(encrypt(algorithm, &mut sealed, message, b"ad", &nonce, &KEY).is_success());
            assert_ne!(&sealed[..message.len()], message, "{algorithm:?} left plaintext in place");

            let mut opened = vec![0u8; message.len()];
            assert!(decrypt(algorithm, &mut opened, &sealed, b"ad", &nonce, &KEY).is_success());
            assert_eq!(opened, message, "{algorithm:?}");
        }
    }

    #[test]
    fn detached_matches_combined() {
        for algorithm in AeadAlgorithm::ALL {
            let nonce = nonce_for(algorithm);
            let message = b"same bytes either way";

            let mut combined = vec![0u8; message.len() + ABYTES];
            assert!(encrypt(algorithm, &mut combined, message, &[], &nonce, &KEY).is_success());

            let mut ciphertext = vec![0u8; message.len()];
            let mut mac = [0u8; ABYTES];
            assert!(
                encrypt_detached(algorithm, &mut ciphertext, &mut mac, message, &[], &nonce, &KEY)
                    .is_success()
            );

            assert_eq!(&combined[..message.len()], ciphertext.as_slice(), "{algorithm:?}");
            assert_eq!(&combined[message.len()..], mac.as_slice(), "{algorithm:?}");

            let mut opened = vec![0u8; message.len()];
            assert!(
                decrypt_detached(algorithm, &mut opened, &ciphertext, &mac, &[], &nonce, &KEY)
                    .is_success()
            );
            assert_eq!(opened, message);
        }
    }

    #[test]
    fn tampering_zeroes_output() {
        for algorithm in AeadAlgorithm::ALL {
            let nonce = nonce_for(algorithm);
            let mut sealed = vec![0u8; 4 + ABYTES];
            assert!(encrypt(algorithm, &mut sealed, b"data", &[], &nonce, &KEY).is_success());
            sealed[0] ^= 0x80;

            let mut opened = [0xffu8; 4];
            assert!(!decrypt(algorithm, &mut opened, &sealed, &[], &nonce, &KEY).is_success());
            assert_eq!(opened, [0u8; 4], "{algorithm:?}");
        }
    }

    #[test]
    fn wrong_associated_data_fails() {
        for algorithm in AeadAlgorithm::ALL {
            let nonce = nonce_for(algorithm);
            let mut sealed = vec![0u8; 3 + ABYTES];
            assert!(encrypt(algorithm, &mut sealed, b"abc", b"one", &nonce, &KEY).is_success());

            let mut opened = [0u8; 3];
            assert!(!decrypt(algorithm, &mut opened, &sealed, b"two", &nonce, &KEY).is_success());
        }
    }

    #[test]
    fn ietf_and_legacy_nonces_do_not_interoperate() {
        let mut legacy = vec![0u8; 5 + ABYTES];
        let mut ietf = vec![0u8; 5 + ABYTES];
        assert!(
            encrypt(AeadAlgorithm::ChaCha20Poly1305, &mut legacy, b"hello", &[], &[0u8; 8], &KEY)
                .is_success()
        );
        assert!(
            encrypt(AeadAlgorithm::ChaCha20Poly1305Ietf, &mut ietf, b"hello", &[], &[0u8; 12], &KEY)
                .is_success()
        );
        assert_eq!(legacy[..5], ietf[..5], "same keystream when counter and nonce are zero");
        assert_ne!(legacy[5..], ietf[5..], "different MAC layout");
    }

    #[test]
    fn mis_sized_parameters_are_refused() {
        let algorithm = AeadAlgorithm::XChaCha20Poly1305Ietf;
        let mut sealed = vec![0u8; 1 + ABYTES];

        assert!(!encrypt(algorithm, &mut sealed, b"x", &[], &[0u8; 23], &KEY).is_success());
        assert!(!encrypt(algorithm, &mut sealed, b"x", &[], &[0u8; 24], &KEY[..31]).is_success());
        assert!(!encrypt(algorithm, &mut sealed[..ABYTES], b"x", &[], &[0u8; 24], &KEY).is_success());

        let mut out = [0u8; 0];
        assert!(!decrypt(algorithm, &mut out, &[0u8; ABYTES - 1], &[], &[0u8; 24], &KEY).is_success());
    }

    #[test]
    fn legacy_construction_matches_libsodium() {
        // crypto_aead_chacha20poly1305_encrypt, key 0x42.., nonce 0x24..
        let nonce = [0x24u8; 8];
        let message: Vec<u8> = (0..33).collect();
        let ad: Vec<u8> = (100..120).collect();
        let cases: [(&[u8], &[u8], &str); 2] = [
            (b"attack at dawn", b"ad", "1faf14082e931c548fb53058861db9043e751bb07de68070a517eb62e447"),
            (
                &message,
                &ad,
                "7eda626a49fd3a32f39c5e32fd7ebc4c010760ce7272be05f87ee86f02b2468d\
                 cd9c217e1fa126015154ed0c24002f92df",
            ),
        ];

        for (message, ad, expected) in cases {
            let mut sealed = vec![0u8; message.len() + ABYTES];
            let algorithm = AeadAlgorithm::ChaCha20Poly1305;
            assert!(encrypt(algorithm, &mut sealed, message, ad, &nonce, &KEY).is_success());
            assert_eq!(hex::encode(&sealed), expected);

            let mut opened = vec![0u8; message.len()];
            assert!(decrypt(algorithm, &mut opened, &sealed, ad, &nonce, &KEY).is_success());
            assert_eq!(opened, message);
        }
    }
}
