//! Error taxonomy for the session framework.
//!
//! Callers must branch differently on each kind of failure, so the kinds are
//! kept apart in the type:
//!
//! - validation: the caller's input broke a static size or range contract
//! - primitive: the provider refused for an unspecified reason
//! - authentication: a tag or MAC did not verify
//! - invalid state: a session was used outside its lifecycle
//!
//! Nothing here is logged. Every error is returned from the call that
//! detected it.

use std::fmt;

use thiserror::Error;

/// Which caller-supplied parameter failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// Secret key
    Key,
    /// Public nonce
    Nonce,
    /// Secret stream header
    Header,
    /// Detached authenticator or MAC to verify
    Mac,
    /// Plaintext input
    Message,
    /// Ciphertext input
    Ciphertext,
    /// Caller-provided output buffer
    Output,
    /// Derived subkey
    Subkey,
    /// KDF context
    Context,
    /// KDF master key
    MasterKey,
    /// Password-hash salt
    Salt,
    /// Password
    Password,
    /// Password hash string
    HashString,
    /// Password-hash iteration count
    OpsLimit,
    /// Password-hash memory limit
    MemLimit,
    /// Padding block size
    BlockSize,
    /// Deterministic random seed
    Seed,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Key => "key",
            Self::Nonce => "nonce",
            Self::Header => "header",
            Self::Mac => "mac",
            Self::Message => "message",
            Self::Ciphertext => "ciphertext",
            Self::Output => "output",
            Self::Subkey => "subkey",
            Self::Context => "context",
            Self::MasterKey => "master key",
            Self::Salt => "salt",
            Self::Password => "password",
            Self::HashString => "hash string",
            Self::OpsLimit => "opslimit",
            Self::MemLimit => "memlimit",
            Self::BlockSize => "block size",
            Self::Seed => "seed",
        };
        f.write_str(name)
    }
}

/// Contractual bound a parameter was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Exactly this value
    Exact(u64),
    /// Inclusive range
    Range {
        /// Smallest accepted value
        min: u64,
        /// Largest accepted value
        max: u64,
    },
    /// This value or more
    AtLeast(u64),
    /// This value or less
    AtMost(u64),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Range { min, max } => write!(f, "{min}..={max}"),
            Self::AtLeast(n) => write!(f, ">= {n}"),
            Self::AtMost(n) => write!(f, "<= {n}"),
        }
    }
}

/// Coarse classification of a [`CryptoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input, detected before any primitive ran
    Validation,
    /// The primitive failed for an unspecified reason
    Primitive,
    /// Authentication tag or MAC verification failed
    Authentication,
    /// Session used outside its lifecycle
    InvalidState,
}

/// Errors returned by every framework operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CryptoError {
    /// A buffer length broke its contract
    #[error("invalid {param} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Parameter that failed
        param: Param,
        /// Contractual length
        expected: Bound,
        /// Length supplied
        actual: u64,
    },

    /// A numeric parameter is outside its accepted range
    #[error("{param} out of range: expected {expected}, got {actual}")]
    OutOfRange {
        /// Parameter that failed
        param: Param,
        /// Accepted range
        expected: Bound,
        /// Value supplied
        actual: u64,
    },

    /// Text input is not valid hexadecimal
    #[error("invalid hex for {param}: {reason}")]
    InvalidHex {
        /// Parameter that failed
        param: Param,
        /// Decoder diagnosis
        reason: hex::FromHexError,
    },

    /// The provider reported failure
    #[error("primitive failure in {operation}")]
    PrimitiveFailure {
        /// Provider operation that failed
        operation: &'static str,
    },

    /// Authentication or decryption failed
    ///
    /// Deliberately carries no detail: wrong key, wrong associated data and
    /// tampered ciphertext are indistinguishable.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Padded input carries no valid padding marker in its last block
    #[error("invalid padding")]
    InvalidPadding,

    /// Session used outside its lifecycle
    #[error("invalid state: cannot {operation} in state {state}")]
    InvalidState {
        /// Phase the session was in
        state: &'static str,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// An authenticated chunk carried a tag byte outside the known set
    #[error("unknown stream tag {value:#04x}")]
    UnknownTag {
        /// Raw tag byte
        value: u8,
    },
}

impl CryptoError {
    /// Classification used by callers to decide how to react.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLength { .. }
            | Self::OutOfRange { .. }
            | Self::InvalidHex { .. }
            | Self::InvalidPadding => ErrorKind::Validation,
            Self::PrimitiveFailure { .. } | Self::UnknownTag { .. } => ErrorKind::Primitive,
            Self::AuthenticationFailed => ErrorKind::Authentication,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }

    /// Returns true if the caller can succeed by correcting its input.
    ///
    /// Primitive and authentication failures are never recoverable: retrying
    /// the same input yields the same failure, and an authentication failure
    /// may mean the channel is compromised.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns true for a failed tag or MAC verification.
    pub fn is_authentication_failure(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
