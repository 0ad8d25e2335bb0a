//! Command execution.
//!
//! Each command reads its inputs, drives one capability through the
//! convenience surface and prints hex to `out`. Files are produced through a
//! `.partial` sibling that is renamed into place only on success, so a failed
//! decryption never leaves unauthenticated plaintext at the output path.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use saltline_core::{
    AeadAlgorithm, CryptoError, DigestAlgorithm, Param, Provider, Saltline, encoding,
};
use zeroize::Zeroizing;

use crate::{
    cli::{AeadArgs, AeadCommand, Command, DeriveArgs, HashArgs, KeyKind, MacArgs, PwhashCommand, StreamArgs},
    config::Config,
    format,
};

/// Environment variable holding the password for `pwhash`.
pub const PASSWORD_ENV: &str = "SALTLINE_PASSWORD";

/// Run `command`, writing its printable result to `out`.
pub fn execute<P: Provider, W: Write>(
    saltline: &Saltline<P>,
    command: Command,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Keygen { kind } => keygen(saltline, kind, config, out),
        Command::Hash(args) => hash(saltline, &args, config, out),
        Command::Mac(args) => mac(saltline, &args, config, out),
        Command::Encrypt(args) => encrypt(saltline, &args, config),
        Command::Decrypt(args) => decrypt(saltline, &args),
        Command::Aead(AeadCommand::Seal(args)) => seal(saltline, &args),
        Command::Aead(AeadCommand::Open(args)) => open(saltline, &args),
        Command::Derive(args) => derive(saltline, &args, config, out),
        Command::Pwhash(command) => {
            let password = read_password(std::env::var(PASSWORD_ENV).ok(), &mut io::stdin().lock())?;
            pwhash(saltline, command, password.as_bytes(), out)
        },
    }
}

fn keygen<P: Provider, W: Write>(
    saltline: &Saltline<P>,
    kind: KeyKind,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let key = match kind {
        KeyKind::Stream => saltline.secret_stream().keygen(),
        KeyKind::Aead => saltline.aead().keygen(AeadAlgorithm::XChaCha20Poly1305Ietf),
        KeyKind::Kdf => saltline.kdf().keygen(),
        KeyKind::Mac => saltline.hashing().keygen(DigestAlgorithm::HmacSha256),
    };
    let text = Zeroizing::new(config.hex(&key));
    writeln!(out, "{}", text.as_str())?;
    Ok(())
}

fn hash<P: Provider, W: Write>(
    saltline: &Saltline<P>,
    args: &HashArgs,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let algorithm = DigestAlgorithm::from(args.algorithm);
    let key = args.key.as_deref().map(|text| parse_key(Param::Key, text)).transpose()?;
    let out_len = args.length.unwrap_or(algorithm.bytes());

    let mut digester = saltline.hashing().start(algorithm, key.as_deref().map(Vec::as_slice), out_len)?;
    let mut reader = open_input(args.input.as_deref())?;
    for_each_chunk(&mut reader, config.chunk_size, |chunk| {
        digester.update(chunk)?;
        Ok(())
    })?;

    writeln!(out, "{}", config.hex(&digester.finalize()?))?;
    Ok(())
}

fn mac<P: Provider, W: Write>(
    saltline: &Saltline<P>,
    args: &MacArgs,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let algorithm = DigestAlgorithm::from(args.algorithm);
    let key = parse_key(Param::Key, &args.key)?;
    let expected = args.verify.as_deref().map(|text| encoding::from_hex(Param::Mac, text)).transpose()?;

    let mut digester = saltline.hashing().start(algorithm, Some(key.as_slice()), algorithm.bytes())?;
    let mut reader = open_input(args.input.as_deref())?;
    for_each_chunk(&mut reader, config.chunk_size, |chunk| {
        digester.update(chunk)?;
        Ok(())
    })?;

    match expected {
        Some(expected) => {
            if !digester.verify(&expected)? {
                return Err(CryptoError::AuthenticationFailed.into());
            }
            writeln!(out, "OK")?;
        },
        None => writeln!(out, "{}", config.hex(&digester.finalize()?))?,
    }
    Ok(())
}

fn encrypt<P: Provider>(saltline: &Saltline<P>, args: &StreamArgs, config: &Config) -> Result<()> {
    let key = parse_key(Param::Key, &args.key)?;
    let mut reader = BufReader::new(open_file(&args.input)?);

    let stats = write_atomically(&args.output, |writer| {
        format::encrypt(
            saltline.secret_stream(),
            &key,
            config.chunk_size,
            config.rekey_interval,
            &mut reader,
            writer,
        )
    })?;

    tracing::info!(chunks = stats.chunks, bytes = stats.plaintext_bytes, rekeys = stats.rekeys, "encrypted");
    Ok(())
}

fn decrypt<P: Provider>(saltline: &Saltline<P>, args: &StreamArgs) -> Result<()> {
    let key = parse_key(Param::Key, &args.key)?;
    let mut reader = BufReader::new(open_file(&args.input)?);

    let stats = write_atomically(&args.output, |writer| {
        format::decrypt(saltline.secret_stream(), &key, &mut reader, writer)
    })?;

    tracing::info!(chunks = stats.chunks, bytes = stats.plaintext_bytes, "decrypted");
    Ok(())
}

fn seal<P: Provider>(saltline: &Saltline<P>, args: &AeadArgs) -> Result<()> {
    let algorithm = AeadAlgorithm::from(args.algorithm);
    let aead = saltline.aead();
    let key = parse_key(Param::Key, &args.key)?;

    let nonce = match &args.nonce {
        Some(text) => encoding::from_hex(Param::Nonce, text)?,
        None => {
            if algorithm == AeadAlgorithm::ChaCha20Poly1305 {
                tracing::warn!(algorithm = algorithm.name(), "random nonce on a short-nonce algorithm");
            }
            aead.nonce(algorithm)
        },
    };

    let message = Zeroizing::new(read_file(&args.input)?);
    let sealed = aead.encrypt(algorithm, &message, ad(args), &nonce, &key)?;

    write_atomically(&args.output, |writer| {
        writer.write_all(&nonce)?;
        writer.write_all(&sealed)?;
        Ok(())
    })
}

fn open<P: Provider>(saltline: &Saltline<P>, args: &AeadArgs) -> Result<()> {
    let algorithm = AeadAlgorithm::from(args.algorithm);
    let key = parse_key(Param::Key, &args.key)?;

    let input = read_file(&args.input)?;
    ensure!(
        input.len() >= algorithm.nonce_bytes(),
        "{} is shorter than a {} nonce",
        args.input.display(),
        algorithm.name()
    );
    let (nonce, ciphertext) = input.split_at(algorithm.nonce_bytes());
    let plaintext = Zeroizing::new(saltline.aead().decrypt(algorithm, ciphertext, ad(args), nonce, &key)?);

    write_atomically(&args.output, |writer| {
        writer.write_all(&plaintext)?;
        Ok(())
    })
}

fn ad(args: &AeadArgs) -> Option<&[u8]> {
    args.ad.as_deref().map(str::as_bytes)
}

fn derive<P: Provider, W: Write>(
    saltline: &Saltline<P>,
    args: &DeriveArgs,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let master_key = parse_key(Param::MasterKey, &args.key)?;
    let subkey = saltline.kdf().derive(args.length, args.id, args.context.as_bytes(), &master_key)?;

    let text = Zeroizing::new(config.hex(&subkey));
    writeln!(out, "{}", text.as_str())?;
    Ok(())
}

/// The password from the environment, or else the first line of `reader`.
fn read_password<R: BufRead>(from_env: Option<String>, reader: &mut R) -> Result<Zeroizing<String>> {
    if let Some(password) = from_env {
        return Ok(Zeroizing::new(password));
    }

    let mut line = Zeroizing::new(String::new());
    let read = reader.read_line(&mut line).context("reading password from stdin")?;
    ensure!(read > 0, "no password: set {PASSWORD_ENV} or write it to stdin");

    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    Ok(line)
}

fn pwhash<P: Provider, W: Write>(
    saltline: &Saltline<P>,
    command: PwhashCommand,
    password: &[u8],
    out: &mut W,
) -> Result<()> {
    let pw = saltline.pwhash();
    match command {
        PwhashCommand::Hash { preset } => {
            writeln!(out, "{}", pw.hash_str(password, preset.into())?)?;
        },
        PwhashCommand::Verify { hash, preset } => {
            pw.verify(&hash, password)?;

            if pw.needs_rehash(hash.as_bytes(), preset.into())? {
                writeln!(out, "OK (rehash recommended)")?;
            } else {
                writeln!(out, "OK")?;
            }
        },
    }
    Ok(())
}

fn parse_key(param: Param, text: &str) -> Result<Zeroizing<Vec<u8>>> {
    Ok(Zeroizing::new(encoding::from_hex(param, text.trim())?))
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(open_file(path)?))),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn for_each_chunk<R: Read>(
    reader: &mut R,
    chunk_size: usize,
    mut f: impl FnMut(&[u8]) -> Result<()>,
) -> Result<()> {
    let mut buffer = Zeroizing::new(vec![0u8; chunk_size]);
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error).context("reading input"),
        };
        f(&buffer[..n])?;
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}

/// Run `write` against `<path>.partial` and rename it over `path` on success.
///
/// On failure the partial file is removed and `path` is left untouched.
fn write_atomically<T>(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<T>) -> Result<T> {
    let partial = partial_path(path);
    let file = File::create(&partial).with_context(|| format!("creating {}", partial.display()))?;
    let mut writer = BufWriter::new(file);

    let result = write(&mut writer).and_then(|value| {
        writer.flush().context("flushing output")?;
        Ok(value)
    });
    drop(writer);

    match result {
        Ok(value) => {
            fs::rename(&partial, path)
                .with_context(|| format!("moving {} into place", partial.display()))?;
            Ok(value)
        },
        Err(error) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                tracing::warn!(path = %partial.display(), error = %cleanup, "could not remove partial output");
            }
            Err(error)
        },
    }
}
