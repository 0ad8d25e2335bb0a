//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use saltline_core::{AeadAlgorithm, DigestAlgorithm, Limits};

use crate::config::Overrides;

/// Saltline file tool
#[derive(Parser, Debug)]
#[command(name = "saltline")]
#[command(about = "Hash, authenticate and encrypt files with Saltline sessions")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "SALTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SALTLINE_LOG")]
    pub log_level: Option<String>,

    /// Plaintext bytes per chunk when reading or encrypting
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Chunks between REKEY markers when encrypting (0 disables)
    #[arg(long, global = true)]
    pub rekey_interval: Option<u64>,

    /// Print hex in lowercase
    #[arg(long, global = true)]
    pub lowercase: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Flags that override configuration file values.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            log_level: self.log_level.clone(),
            chunk_size: self.chunk_size,
            lowercase: self.lowercase,
            rekey_interval: self.rekey_interval,
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a fresh random key as hex
    Keygen {
        /// What the key is for
        #[arg(value_enum)]
        kind: KeyKind,
    },

    /// Hash a file (stdin when no file is given)
    Hash(HashArgs),

    /// Compute or verify a MAC over a file
    Mac(MacArgs),

    /// Encrypt a file as a chunked secret stream
    Encrypt(StreamArgs),

    /// Decrypt a chunked secret stream
    Decrypt(StreamArgs),

    /// One-shot AEAD on a whole file
    #[command(subcommand)]
    Aead(AeadCommand),

    /// Derive a subkey from a master key
    Derive(DeriveArgs),

    /// Password hashing
    #[command(subcommand)]
    Pwhash(PwhashCommand),
}

/// Key types `keygen` can produce.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Secret stream key
    Stream,
    /// AEAD key
    Aead,
    /// KDF master key
    Kdf,
    /// HMAC-SHA-256 key
    Mac,
}

/// Unkeyed hash selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// BLAKE2b, optionally keyed, variable length
    #[value(name = "blake2b")]
    Blake2b,
    /// SHA-256
    #[value(name = "sha256")]
    Sha256,
    /// SHA-512
    #[value(name = "sha512")]
    Sha512,
}

impl From<HashAlgorithm> for DigestAlgorithm {
    fn from(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake2b => Self::GenericHash,
            HashAlgorithm::Sha256 => Self::Sha256,
            HashAlgorithm::Sha512 => Self::Sha512,
        }
    }
}

/// MAC selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacAlgorithm {
    /// HMAC-SHA-256
    #[value(name = "hmac-sha256")]
    HmacSha256,
    /// HMAC-SHA-512
    #[value(name = "hmac-sha512")]
    HmacSha512,
    /// HMAC-SHA-512 truncated to 32 bytes
    #[value(name = "hmac-sha512256")]
    HmacSha512256,
    /// Keyed BLAKE2b
    #[value(name = "blake2b")]
    Blake2b,
}

impl From<MacAlgorithm> for DigestAlgorithm {
    fn from(algorithm: MacAlgorithm) -> Self {
        match algorithm {
            MacAlgorithm::HmacSha256 => Self::HmacSha256,
            MacAlgorithm::HmacSha512 => Self::HmacSha512,
            MacAlgorithm::HmacSha512256 => Self::HmacSha512256,
            MacAlgorithm::Blake2b => Self::GenericHash,
        }
    }
}

/// AEAD selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AeadChoice {
    /// ChaCha20-Poly1305, 8-byte nonce
    #[value(name = "chacha20poly1305")]
    ChaCha20Poly1305,
    /// ChaCha20-Poly1305 IETF, 12-byte nonce
    #[value(name = "chacha20poly1305-ietf")]
    ChaCha20Poly1305Ietf,
    /// XChaCha20-Poly1305 IETF, 24-byte nonce
    #[value(name = "xchacha20poly1305-ietf")]
    XChaCha20Poly1305Ietf,
    /// AES-256-GCM
    #[value(name = "aes256gcm")]
    Aes256Gcm,
}

impl From<AeadChoice> for AeadAlgorithm {
    fn from(choice: AeadChoice) -> Self {
        match choice {
            AeadChoice::ChaCha20Poly1305 => Self::ChaCha20Poly1305,
            AeadChoice::ChaCha20Poly1305Ietf => Self::ChaCha20Poly1305Ietf,
            AeadChoice::XChaCha20Poly1305Ietf => Self::XChaCha20Poly1305Ietf,
            AeadChoice::Aes256Gcm => Self::Aes256Gcm,
        }
    }
}

/// Password hashing cost presets.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Preset {
    /// Smallest accepted cost; tests only
    Min,
    /// Interactive logins
    #[default]
    Interactive,
    /// Moderate
    Moderate,
    /// Sensitive, offline use
    Sensitive,
}

impl From<Preset> for Limits {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Min => Self::MIN,
            Preset::Interactive => Self::INTERACTIVE,
            Preset::Moderate => Self::MODERATE,
            Preset::Sensitive => Self::SENSITIVE,
        }
    }
}

/// Arguments for `hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Algorithm
    #[arg(short, long, value_enum, default_value = "blake2b")]
    pub algorithm: HashAlgorithm,

    /// Output length in bytes (BLAKE2b only)
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Hex key (BLAKE2b only)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Input file
    pub input: Option<PathBuf>,
}

/// Arguments for `mac`.
#[derive(Args, Debug)]
pub struct MacArgs {
    /// Algorithm
    #[arg(short, long, value_enum, default_value = "hmac-sha256")]
    pub algorithm: MacAlgorithm,

    /// Hex key
    #[arg(short, long, env = "SALTLINE_KEY", hide_env_values = true)]
    pub key: String,

    /// Hex MAC to verify instead of printing one
    #[arg(long)]
    pub verify: Option<String>,

    /// Input file
    pub input: Option<PathBuf>,
}

/// Arguments for `encrypt` and `decrypt`.
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Hex stream key
    #[arg(short, long, env = "SALTLINE_KEY", hide_env_values = true)]
    pub key: String,

    /// Input file
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// `aead` subcommands.
#[derive(Subcommand, Debug)]
pub enum AeadCommand {
    /// Encrypt; the output is nonce followed by ciphertext
    Seal(AeadArgs),
    /// Decrypt a file produced by `seal`
    Open(AeadArgs),
}

/// Arguments for `aead seal` and `aead open`.
#[derive(Args, Debug)]
pub struct AeadArgs {
    /// Algorithm
    #[arg(short, long, value_enum, default_value = "xchacha20poly1305-ietf")]
    pub algorithm: AeadChoice,

    /// Hex key
    #[arg(short, long, env = "SALTLINE_KEY", hide_env_values = true)]
    pub key: String,

    /// Hex nonce (seal only; random when omitted)
    #[arg(long)]
    pub nonce: Option<String>,

    /// Associated data
    #[arg(long)]
    pub ad: Option<String>,

    /// Input file
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for `derive`.
#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Hex master key
    #[arg(short, long, env = "SALTLINE_KEY", hide_env_values = true)]
    pub key: String,

    /// Eight-byte context
    #[arg(short, long)]
    pub context: String,

    /// Subkey id
    #[arg(long, default_value = "0")]
    pub id: u64,

    /// Subkey length in bytes
    #[arg(short, long, default_value = "32")]
    pub length: usize,
}

/// `pwhash` subcommands.
#[derive(Subcommand, Debug)]
pub enum PwhashCommand {
    /// Print a self-describing hash string
    ///
    /// The password is taken from `SALTLINE_PASSWORD`, or else from the
    /// first line of stdin.
    Hash {
        /// Cost preset
        #[arg(long, value_enum, default_value = "interactive")]
        preset: Preset,
    },

    /// Check a password against a hash string
    ///
    /// The password is read the same way as for `hash`.
    Verify {
        /// Hash string from `pwhash hash`
        #[arg(long)]
        hash: String,

        /// Preset to compare the stored cost against
        #[arg(long, value_enum, default_value = "interactive")]
        preset: Preset,
    },
}
