//! Saltline Session Framework
//!
//! A safe calling surface over the primitive provider in `saltline-crypto`.
//! This crate does no cryptography of its own. It validates every
//! parameter against the provider's published sizes, derives output buffer
//! sizes, tracks the lifecycle of stateful computations and turns provider
//! status codes into typed errors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Saltline<P>                                                  │
//! │  hashing()  secret_stream()  aead()  kdf()  pwhash() random()│
//! └──────────────────────────────────────────────────────────────┘
//!          │ convenience surface: size, allocate, hex
//!          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ native surface: caller buffers, exact lengths                │
//! │  validation ──► session phase checks ──► Provider call       │
//! └──────────────────────────────────────────────────────────────┘
//!          │ Status
//!          ▼
//!      Result<_, CryptoError>
//! ```
//!
//! Every capability is exposed twice. The native surface takes
//! caller-owned, exactly sized buffers. The convenience surface computes
//! sizes, allocates and optionally hex-encodes, and only ever calls the
//! native surface.
//!
//! # Stateful Sessions
//!
//! - [`DigestSession`]: one hash or MAC computation spread over any number
//!   of updates.
//! - [`StreamSession`]: one direction of a secret stream, a sequence of
//!   tagged, authenticated chunks under one key.
//!
//! Sessions are plain values owned by the caller. They are not shared:
//! parallel work needs independent sessions.
//!
//! # Errors
//!
//! [`CryptoError::kind`] separates caller mistakes (validation), primitive
//! failures, authentication failures and lifecycle misuse. Validation runs
//! before the provider is touched, so a validation error guarantees no
//! primitive ran.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod kdf;
pub mod pwhash;
pub mod random;
mod saltline;
pub mod stream;
#[cfg(test)]
mod testing;
pub mod validation;

pub use aead::{Aead, Detached};
pub use digest::{DigestPhase, DigestSession, Digester, Hashing};
pub use error::{Bound, CryptoError, ErrorKind, Param};
pub use kdf::Kdf;
pub use pwhash::{Limits, PwHash};
pub use random::{Random, memzero};
pub use saltline::Saltline;
pub use saltline_crypto::{AeadAlgorithm, DigestAlgorithm, Provider, RustCryptoProvider};
pub use stream::{Header, PullStream, PushStream, SecretStream, StreamPhase, StreamSession, Tag};
