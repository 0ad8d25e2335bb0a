//! Hash and MAC primitives behind one opaque incremental state.
//!
//! Six algorithms share the `init → update* → final` transition set:
//! BLAKE2b (optionally keyed, variable output), SHA-256, SHA-512 and the
//! three HMAC-SHA-2 variants. The state is a tagged enum so a single
//! [`DigestState`] type can carry any of them across the provider boundary.

use blake2b_simd::Params as Blake2bParams;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::Status;

/// BLAKE2b generic hash sizes.
pub mod generichash {
    /// Recommended output length.
    pub const BYTES: usize = 32;
    /// Smallest supported output length.
    pub const BYTES_MIN: usize = 16;
    /// Largest supported output length.
    pub const BYTES_MAX: usize = 64;
    /// Recommended key length.
    pub const KEYBYTES: usize = 32;
    /// Smallest accepted key length.
    pub const KEYBYTES_MIN: usize = 16;
    /// Largest accepted key length.
    pub const KEYBYTES_MAX: usize = 64;
}

/// SHA-256 sizes.
pub mod sha256 {
    /// Output length.
    pub const BYTES: usize = 32;
}

/// SHA-512 sizes.
pub mod sha512 {
    /// Output length.
    pub const BYTES: usize = 64;
}

/// HMAC-SHA-256 sizes.
pub mod hmacsha256 {
    /// Output length.
    pub const BYTES: usize = 32;
    /// Key length for one-shot authentication.
    pub const KEYBYTES: usize = 32;
}

/// HMAC-SHA-512 sizes.
pub mod hmacsha512 {
    /// Output length.
    pub const BYTES: usize = 64;
    /// Key length for one-shot authentication.
    pub const KEYBYTES: usize = 32;
}

/// HMAC-SHA-512 truncated to 256 bits.
pub mod hmacsha512256 {
    /// Output length.
    pub const BYTES: usize = 32;
    /// Key length for one-shot authentication.
    pub const KEYBYTES: usize = 32;
}

/// Hash or MAC algorithm carried by a [`DigestState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// BLAKE2b with optional key and variable output length.
    GenericHash,
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
    /// HMAC-SHA-256.
    HmacSha256,
    /// HMAC-SHA-512.
    HmacSha512,
    /// HMAC-SHA-512 truncated to 32 bytes.
    HmacSha512256,
}

impl DigestAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 6] = [
        Self::GenericHash,
        Self::Sha256,
        Self::Sha512,
        Self::HmacSha256,
        Self::HmacSha512,
        Self::HmacSha512256,
    ];

    /// Default output length.
    pub const fn bytes(self) -> usize {
        match self {
            Self::GenericHash => generichash::BYTES,
            Self::Sha256 => sha256::BYTES,
            Self::Sha512 => sha512::BYTES,
            Self::HmacSha256 => hmacsha256::BYTES,
            Self::HmacSha512 => hmacsha512::BYTES,
            Self::HmacSha512256 => hmacsha512256::BYTES,
        }
    }

    /// Smallest output length accepted by `init`.
    pub const fn bytes_min(self) -> usize {
        match self {
            Self::GenericHash => generichash::BYTES_MIN,
            other => other.bytes(),
        }
    }

    /// Largest output length accepted by `init`.
    pub const fn bytes_max(self) -> usize {
        match self {
            Self::GenericHash => generichash::BYTES_MAX,
            other => other.bytes(),
        }
    }

    /// Key length produced by keygen and required by one-shot MACs.
    ///
    /// Zero for the unkeyed SHA-2 hashes.
    pub const fn key_bytes(self) -> usize {
        match self {
            Self::GenericHash => generichash::KEYBYTES,
            Self::Sha256 | Self::Sha512 => 0,
            Self::HmacSha256 => hmacsha256::KEYBYTES,
            Self::HmacSha512 => hmacsha512::KEYBYTES,
            Self::HmacSha512256 => hmacsha512256::KEYBYTES,
        }
    }

    /// True when `init` requires a key.
    pub const fn requires_key(self) -> bool {
        matches!(self, Self::HmacSha256 | Self::HmacSha512 | Self::HmacSha512256)
    }

    /// True when `init` accepts a key at all.
    pub const fn accepts_key(self) -> bool {
        !matches!(self, Self::Sha256 | Self::Sha512)
    }

    /// Stable lowercase name, used in logs and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::GenericHash => "blake2b",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::HmacSha256 => "hmac-sha256",
            Self::HmacSha512 => "hmac-sha512",
            Self::HmacSha512256 => "hmac-sha512256",
        }
    }
}

/// Opaque incremental hash/MAC state.
///
/// The default value is uninitialized: `update` and `final` on it fail.
/// A successful `final` returns the state to uninitialized, so a finalized
/// state cannot be updated or finalized again without a fresh `init`.
#[derive(Clone, Default)]
pub struct DigestState(Option<Inner>);

#[derive(Clone)]
enum Inner {
    GenericHash { state: Box<blake2b_simd::State>, out_len: usize },
    Sha256(Box<Sha256>),
    Sha512(Box<Sha512>),
    HmacSha256(Box<Hmac<Sha256>>),
    HmacSha512(Box<Hmac<Sha512>>),
    HmacSha512256(Box<Hmac<Sha512>>),
}

impl Inner {
    fn algorithm(&self) -> DigestAlgorithm {
        match self {
            Self::GenericHash { .. } => DigestAlgorithm::GenericHash,
            Self::Sha256(_) => DigestAlgorithm::Sha256,
            Self::Sha512(_) => DigestAlgorithm::Sha512,
            Self::HmacSha256(_) => DigestAlgorithm::HmacSha256,
            Self::HmacSha512(_) => DigestAlgorithm::HmacSha512,
            Self::HmacSha512256(_) => DigestAlgorithm::HmacSha512256,
        }
    }

    fn out_len(&self) -> usize {
        match self {
            Self::GenericHash { out_len, .. } => *out_len,
            other => other.algorithm().bytes(),
        }
    }
}

impl DigestState {
    /// Algorithm of an initialized state.
    pub fn algorithm(&self) -> Option<DigestAlgorithm> {
        self.0.as_ref().map(Inner::algorithm)
    }

    /// Output length declared at `init`, if initialized.
    pub fn output_len(&self) -> Option<usize> {
        self.0.as_ref().map(Inner::out_len)
    }

    /// True once `init` has succeeded and `final` has not yet run.
    pub fn is_initialized(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for DigestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestState")
            .field("algorithm", &self.algorithm())
            .field("output_len", &self.output_len())
            .finish_non_exhaustive()
    }
}

/// Start a computation, replacing whatever `state` held.
pub(crate) fn init(
    state: &mut DigestState,
    algorithm: DigestAlgorithm,
    key: Option<&[u8]>,
    out_len: usize,
) -> Status {
    if out_len < algorithm.bytes_min() || out_len > algorithm.bytes_max() {
        return Status::FAILURE;
    }

    let inner = match (algorithm, key) {
        (DigestAlgorithm::GenericHash, key) => {
            let key = key.unwrap_or_default();
            if !key.is_empty()
                && (key.len() < generichash::KEYBYTES_MIN || key.len() > generichash::KEYBYTES_MAX)
            {
                return Status::FAILURE;
            }
            let state = Blake2bParams::new().hash_length(out_len).key(key).to_state();
            Inner::GenericHash { state: Box::new(state), out_len }
        },
        (DigestAlgorithm::Sha256, None) => Inner::Sha256(Box::default()),
        (DigestAlgorithm::Sha512, None) => Inner::Sha512(Box::default()),
        (DigestAlgorithm::HmacSha256, Some(key)) => match Hmac::<Sha256>::new_from_slice(key) {
            Ok(mac) => Inner::HmacSha256(Box::new(mac)),
            Err(_) => return Status::FAILURE,
        },
        (DigestAlgorithm::HmacSha512, Some(key)) => match Hmac::<Sha512>::new_from_slice(key) {
            Ok(mac) => Inner::HmacSha512(Box::new(mac)),
            Err(_) => return Status::FAILURE,
        },
        (DigestAlgorithm::HmacSha512256, Some(key)) => {
            match Hmac::<Sha512>::new_from_slice(key) {
                Ok(mac) => Inner::HmacSha512256(Box::new(mac)),
                Err(_) => return Status::FAILURE,
            }
        },
        _ => return Status::FAILURE,
    };

    state.0 = Some(inner);
    Status::SUCCESS
}

/// Absorb `data`. Fails only on an uninitialized state.
pub(crate) fn update(state: &mut DigestState, data: &[u8]) -> Status {
    let Some(inner) = state.0.as_mut() else {
        return Status::FAILURE;
    };

    match inner {
        Inner::GenericHash { state, .. } => {
            state.update(data);
        },
        Inner::Sha256(hasher) => sha2::Digest::update(hasher.as_mut(), data),
        Inner::Sha512(hasher) => sha2::Digest::update(hasher.as_mut(), data),
        Inner::HmacSha256(mac) => Mac::update(mac.as_mut(), data),
        Inner::HmacSha512(mac) | Inner::HmacSha512256(mac) => Mac::update(mac.as_mut(), data),
    }

    Status::SUCCESS
}

/// Write the result into `out` and consume the state.
///
/// `out` must be exactly the length declared at `init`; on mismatch the
/// state is left untouched.
pub(crate) fn finalize(state: &mut DigestState, out: &mut [u8]) -> Status {
    match state.0.as_ref() {
        Some(inner) if inner.out_len() == out.len() => {},
        _ => return Status::FAILURE,
    }
    let Some(inner) = state.0.take() else {
        return Status::FAILURE;
    };

    match inner {
        Inner::GenericHash { state, .. } => out.copy_from_slice(state.finalize().as_bytes()),
        Inner::Sha256(hasher) => out.copy_from_slice(&sha2::Digest::finalize(*hasher)),
        Inner::Sha512(hasher) => out.copy_from_slice(&sha2::Digest::finalize(*hasher)),
        Inner::HmacSha256(mac) => out.copy_from_slice(&(*mac).finalize().into_bytes()),
        Inner::HmacSha512(mac) => out.copy_from_slice(&(*mac).finalize().into_bytes()),
        Inner::HmacSha512256(mac) => {
            let full = (*mac).finalize().into_bytes();
            out.copy_from_slice(&full[..hmacsha512256::BYTES]);
        },
    }

    Status::SUCCESS
}
