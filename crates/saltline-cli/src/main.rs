//! Saltline command-line binary.
//!
//! # Usage
//!
//! ```bash
//! # Generate a stream key and encrypt a file
//! KEY=$(saltline keygen stream)
//! saltline encrypt --key "$KEY" plain.bin --output plain.sls
//!
//! # Decrypt, with a config file for the chunk size and log level
//! saltline --config saltline.toml decrypt --key "$KEY" plain.sls --output plain.bin
//!
//! # Hash stdin
//! cat plain.bin | saltline hash --algorithm sha256
//!
//! # Password hashing reads SALTLINE_PASSWORD, or else one line of stdin
//! saltline pwhash hash --preset moderate < password.txt
//! ```

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use saltline_cli::{Cli, Config, execute};
use saltline_core::Saltline;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.overrides())?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!(chunk_size = config.chunk_size, rekey_interval = config.rekey_interval, "configuration loaded");

    let saltline = Saltline::new();
    let mut stdout = std::io::stdout().lock();
    execute(&saltline, cli.command, &config, &mut stdout)?;
    stdout.flush()?;

    Ok(())
}
