//! Saltline command-line front end.
//!
//! Drives the session framework over files: chunked hashing and MACs,
//! chunked secret-stream encryption, one-shot AEAD, key derivation and
//! password hashing.
//!
//! # Components
//!
//! - [`cli`]: clap argument types
//! - [`config`]: TOML configuration and flag overrides
//! - [`format`]: the `SLS1` encrypted file format
//! - [`commands`]: command execution
//!
//! # Encrypted Files
//!
//! ```text
//! plaintext ──> read chunk_size ──> push(AD = prefix) ──> SLS1 file
//!                    │                   │
//!                    └── last chunk ─────┴──> FINAL
//! ```
//!
//! Decryption writes to `<output>.partial` and renames only once the FINAL
//! chunk has authenticated and nothing follows it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;

pub use cli::{Cli, Command};
pub use commands::execute;
pub use config::{Config, Overrides};
pub use format::StreamStats;
