//! Saltline Primitive Provider
//!
//! The trusted layer that performs the actual cryptographic transformations
//! for the Saltline session framework. Every operation works on
//! caller-provided buffers of an exact, published size and reports a
//! [`Status`] instead of panicking or allocating on the caller's behalf.
//!
//! # Boundary
//!
//! ```text
//! saltline-core (validation, sizing, encoding, session phases)
//!        │  exact-length slices
//!        ▼
//! Provider trait ──► RustCryptoProvider
//!        │              │
//!        │              ├─ secretstream  (XChaCha20-Poly1305 chunked stream)
//!        │              ├─ digest        (BLAKE2b, SHA-2, HMAC-SHA-2)
//!        │              ├─ shorthash     (SipHash-2-4)
//!        │              ├─ aead          (ChaCha20-Poly1305 family, AES-256-GCM)
//!        │              ├─ kdf           (BLAKE2b subkey derivation)
//!        │              ├─ pwhash        (Argon2id)
//!        │              └─ deterministic (seeded ChaCha20 keystream)
//!        ▼
//! Status (0 = success, nonzero = failure)
//! ```
//!
//! The sizes of keys, nonces, headers and tags are owned by this crate. The
//! framework above derives all of its buffer arithmetic from these constants
//! rather than repeating them.
//!
//! # Randomness
//!
//! Randomness enters through the [`Entropy`] trait so that tests can drive
//! header and salt generation deterministically. Production code uses
//! [`OsEntropy`].
//!
//! # Failure semantics
//!
//! A nonzero [`Status`] means "the primitive refused or failed". Two
//! operations document a more specific meaning: [`Provider::secretstream_pull`]
//! and the AEAD decrypt family fail only when authentication fails, provided
//! the caller already validated buffer lengths.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod deterministic;
pub mod digest;
mod entropy;
pub mod kdf;
mod onetimeauth;
mod provider;
pub mod pwhash;
pub mod secretstream;
pub mod shorthash;
mod status;

pub use aead::AeadAlgorithm;
pub use digest::{DigestAlgorithm, DigestState};
pub use entropy::{Entropy, OsEntropy};
pub use provider::{Provider, RustCryptoProvider};
pub use secretstream::SecretStreamState;
pub use status::Status;
