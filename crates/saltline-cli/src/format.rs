//! Encrypted file format
//!
//! ```text
//! ┌────────┬──────────────┬────────────┬─────────────────────────┬─────┬───────────────┐
//! │ "SLS1" │ chunk size   │ header     │ chunk 1                 │ ... │ chunk n       │
//! │ 4      │ u32 BE       │ 24         │ chunk size + 17         │     │ <= size + 17  │
//! └────────┴──────────────┴────────────┴─────────────────────────┴─────┴───────────────┘
//!   └──── prefix, bound to every chunk as associated data ────┘       tag = FINAL
//! ```
//!
//! Every chunk but the last carries exactly `chunk size` plaintext bytes.
//! The last chunk is tagged FINAL and may be shorter, down to empty. A file
//! that ends before FINAL is truncated.
//!
//! Chunks are read in `chunk size + 17` windows, so bytes appended after a
//! short FINAL chunk land in the same window and that chunk fails
//! authentication. After a full-size FINAL chunk any further byte is
//! reported as trailing data.

use std::io::{self, Read, Write};

use anyhow::{Context, Result, bail, ensure};
use saltline_core::{Provider, SecretStream, Tag};
use saltline_crypto::secretstream;
use zeroize::Zeroizing;

use crate::config::check_chunk_size;

/// File magic.
pub const MAGIC: [u8; 4] = *b"SLS1";

/// Magic plus chunk size.
pub const PREFIX_LEN: usize = 8;

/// What a stream operation processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks written or read
    pub chunks: u64,
    /// Plaintext bytes
    pub plaintext_bytes: u64,
    /// Chunks tagged REKEY
    pub rekeys: u64,
}

impl StreamStats {
    fn record(&mut self, len: usize, tag: Tag) {
        self.chunks += 1;
        self.plaintext_bytes += len as u64;
        if tag == Tag::Rekey {
            self.rekeys += 1;
        }
    }
}

fn prefix(chunk_size: usize) -> Result<[u8; PREFIX_LEN]> {
    let size = u32::try_from(chunk_size).context("chunk size does not fit in u32")?;
    let [a, b, c, d] = size.to_be_bytes();
    let [m0, m1, m2, m3] = MAGIC;
    Ok([m0, m1, m2, m3, a, b, c, d])
}

/// Read until `buffer` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {},
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}

/// Encrypt everything `reader` yields into `writer`.
///
/// With a nonzero `rekey_interval`, every `rekey_interval`-th chunk that is
/// not the last is tagged REKEY.
pub fn encrypt<P: Provider, R: Read, W: Write>(
    stream: SecretStream<'_, P>,
    key: &[u8],
    chunk_size: usize,
    rekey_interval: u64,
    reader: &mut R,
    writer: &mut W,
) -> Result<StreamStats> {
    check_chunk_size(chunk_size)?;
    let prefix = prefix(chunk_size)?;

    let (mut tx, header) = stream.pusher(key)?;
    writer.write_all(&prefix).context("writing stream prefix")?;
    writer.write_all(header.as_bytes()).context("writing stream header")?;

    let mut current = Zeroizing::new(vec![0u8; chunk_size]);
    let mut next = Zeroizing::new(vec![0u8; chunk_size]);
    let mut current_len = read_full(reader, &mut current).context("reading plaintext")?;
    let mut stats = StreamStats::default();

    loop {
        let next_len = if current_len == chunk_size {
            read_full(reader, &mut next).context("reading plaintext")?
        } else {
            0
        };

        let tag = if next_len == 0 {
            Tag::Final
        } else if rekey_interval > 0 && (stats.chunks + 1) % rekey_interval == 0 {
            Tag::Rekey
        } else {
            Tag::Message
        };

        let sealed = tx.push(&current[..current_len], Some(&prefix[..]), tag)?;
        writer.write_all(&sealed).context("writing chunk")?;
        stats.record(current_len, tag);

        if tag == Tag::Final {
            break;
        }
        std::mem::swap(&mut current, &mut next);
        current_len = next_len;
    }

    writer.flush().context("flushing output")?;
    tracing::debug!(chunks = stats.chunks, bytes = stats.plaintext_bytes, rekeys = stats.rekeys, "stream encrypted");
    Ok(stats)
}

/// Decrypt a stream from `reader` into `writer`.
///
/// Plaintext is written chunk by chunk as each chunk authenticates. On error
/// the caller must discard whatever was written.
pub fn decrypt<P: Provider, R: Read, W: Write>(
    stream: SecretStream<'_, P>,
    key: &[u8],
    reader: &mut R,
    writer: &mut W,
) -> Result<StreamStats> {
    let mut prefix = [0u8; PREFIX_LEN];
    reader.read_exact(&mut prefix).context("reading stream prefix")?;
    let [m0, m1, m2, m3, a, b, c, d] = prefix;
    ensure!([m0, m1, m2, m3] == MAGIC, "not a saltline stream");

    let chunk_size = u32::from_be_bytes([a, b, c, d]) as usize;
    check_chunk_size(chunk_size).context("corrupt stream prefix")?;

    let mut header = [0u8; secretstream::HEADERBYTES];
    reader.read_exact(&mut header).context("reading stream header")?;
    let mut rx = stream.puller(key, &header)?;

    let mut sealed = vec![0u8; chunk_size + secretstream::ABYTES];
    let mut stats = StreamStats::default();

    loop {
        let len = read_full(reader, &mut sealed).context("reading chunk")?;
        if len == 0 {
            bail!("stream truncated after {} chunks: no final chunk", stats.chunks);
        }

        let (plaintext, tag) = rx
            .pull(&sealed[..len], Some(&prefix[..]))
            .with_context(|| format!("chunk {} failed to decrypt", stats.chunks + 1))?;
        let plaintext = Zeroizing::new(plaintext);
        writer.write_all(&plaintext).context("writing plaintext")?;
        stats.record(plaintext.len(), tag);

        if tag == Tag::Final {
            let mut extra = [0u8; 1];
            ensure!(
                read_full(reader, &mut extra).context("reading past final chunk")? == 0,
                "trailing data after final chunk"
            );
            break;
        }
    }

    writer.flush().context("flushing output")?;
    tracing::debug!(chunks = stats.chunks, bytes = stats.plaintext_bytes, "stream decrypted");
    Ok(stats)
}
