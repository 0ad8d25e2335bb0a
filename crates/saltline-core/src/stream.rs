//! Secret streams: chunked authenticated encryption
//!
//! One key, one header, an ordered sequence of tagged chunks. Each side owns
//! a [`StreamSession`]; the push side produces the header, the pull side
//! rebuilds matching state from it.
//!
//! # Chunk Framing
//!
//! ```text
//! ┌──────────────────┬─────────────────────┬──────────────────┐
//! │ encrypted tag(1) │ ciphertext (mlen)   │ MAC (16)         │
//! └──────────────────┴─────────────────────┴──────────────────┘
//!          └────────── ABYTES overhead = 1 + 16 ──────────┘
//! ```
//!
//! # Session Phases
//!
//! ```text
//!                  init_push ┌─────────┐ push(FINAL) ┌──────────┐
//!              ┌────────────>│ Pushing │────────────>│          │
//! ┌───────────────┐          └─────────┘             │ Finished │
//! │ Uninitialized │                                  │          │
//! └───────────────┘          ┌─────────┐ pull→FINAL  │          │
//!              └────────────>│ Pulling │────────────>│          │
//!                  init_pull └─────────┘             └──────────┘
//! ```
//!
//! # Security Properties
//!
//! - A failed pull releases no plaintext: the output buffer is zeroed and
//!   the session is restored to its exact pre-call state, so the caller may
//!   keep reading after discarding a forged chunk.
//! - Reordered, replayed or truncated chunks fail authentication; the
//!   session never buffers or reorders.
//! - A stream that never yields FINAL is open, not an error. Detecting
//!   truncation at the end of input is the caller's job.

use saltline_crypto::{Provider, secretstream};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    encoding,
    error::{CryptoError, Param},
    validation,
};

/// Role of a chunk in the stream's framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Ordinary chunk
    Message = secretstream::TAG_MESSAGE,
    /// End of a logical message set; no effect on the plaintext
    Push = secretstream::TAG_PUSH,
    /// Both sides rekey after this chunk
    Rekey = secretstream::TAG_REKEY,
    /// Last chunk of the stream
    Final = secretstream::TAG_FINAL,
}

impl Tag {
    /// Every tag, in wire order.
    pub const ALL: [Self; 4] = [Self::Message, Self::Push, Self::Rekey, Self::Final];

    /// Wire byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Push => "push",
            Self::Rekey => "rekey",
            Self::Final => "final",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = CryptoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            secretstream::TAG_MESSAGE => Ok(Self::Message),
            secretstream::TAG_PUSH => Ok(Self::Push),
            secretstream::TAG_REKEY => Ok(Self::Rekey),
            secretstream::TAG_FINAL => Ok(Self::Final),
            value => Err(CryptoError::UnknownTag { value }),
        }
    }
}

/// Lifecycle phase of a [`StreamSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// Created, not yet initialized for either direction
    Uninitialized,
    /// Encrypting
    Pushing,
    /// Decrypting
    Pulling,
    /// A FINAL chunk was pushed or pulled
    Finished,
}

impl StreamPhase {
    /// Lowercase name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Pushing => "pushing",
            Self::Pulling => "pulling",
            Self::Finished => "finished",
        }
    }
}

/// Caller-owned state of one stream direction.
pub struct StreamSession<P: Provider> {
    state: P::StreamState,
    phase: StreamPhase,
    chunks: u64,
}

impl<P: Provider> StreamSession<P> {
    /// Fresh, uninitialized session.
    pub fn new() -> Self {
        Self { state: P::StreamState::default(), phase: StreamPhase::Uninitialized, chunks: 0 }
    }

    /// Current phase.
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Chunks pushed or pulled since initialization.
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// True once a FINAL chunk has passed through.
    pub fn is_finished(&self) -> bool {
        self.phase == StreamPhase::Finished
    }

    fn require(&self, phase: StreamPhase, operation: &'static str) -> Result<(), CryptoError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(CryptoError::InvalidState { state: self.phase.name(), operation })
        }
    }
}

impl<P: Provider> Default for StreamSession<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Provider> std::fmt::Debug for StreamSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("phase", &self.phase)
            .field("chunks", &self.chunks)
            .finish_non_exhaustive()
    }
}

/// Stream header: non-secret, sent once ahead of the chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header([u8; secretstream::HEADERBYTES]);

impl Header {
    /// Header from exactly `HEADERBYTES` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        validation::check_exact(Param::Header, bytes.len(), secretstream::HEADERBYTES)?;
        let mut header = [0u8; secretstream::HEADERBYTES];
        header.copy_from_slice(bytes);
        Ok(Self(header))
    }

    /// Header from hex text.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        Self::from_slice(&encoding::from_hex(Param::Header, text)?)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; secretstream::HEADERBYTES] {
        &self.0
    }

    /// Uppercase hex.
    pub fn to_hex(&self) -> String {
        encoding::to_hex(&self.0)
    }
}

impl AsRef<[u8]> for Header {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Secret stream capability.
pub struct SecretStream<'p, P: Provider> {
    provider: &'p P,
}

impl<P: Provider> Clone for SecretStream<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Provider> Copy for SecretStream<'_, P> {}

impl<'p, P: Provider> SecretStream<'p, P> {
    /// Secret stream capability over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    // Native surface

    /// Start encrypting under `key`, writing the header into `header`.
    pub fn init_push(
        &self,
        session: &mut StreamSession<P>,
        header: &mut [u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        validation::check_exact(Param::Key, key.len(), secretstream::KEYBYTES)?;
        validation::check_exact(Param::Header, header.len(), secretstream::HEADERBYTES)?;

        let mut state = P::StreamState::default();
        if !self.provider.secretstream_init_push(&mut state, header, key).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "secretstream_init_push" });
        }

        *session = StreamSession { state, phase: StreamPhase::Pushing, chunks: 0 };
        tracing::debug!("secret stream push initialized");
        Ok(())
    }

    /// Start decrypting under `key` with the sender's `header`.
    pub fn init_pull(
        &self,
        session: &mut StreamSession<P>,
        header: &[u8],
        key: &[u8],
    ) -> Result<(), CryptoError> {
        validation::check_exact(Param::Key, key.len(), secretstream::KEYBYTES)?;
        validation::check_exact(Param::Header, header.len(), secretstream::HEADERBYTES)?;

        let mut state = P::StreamState::default();
        if !self.provider.secretstream_init_pull(&mut state, header, key).is_success() {
            return Err(CryptoError::PrimitiveFailure { operation: "secretstream_init_pull" });
        }

        *session = StreamSession { state, phase: StreamPhase::Pulling, chunks: 0 };
        tracing::debug!("secret stream pull initialized");
        Ok(())
    }

    /// Encrypt `message` into `out` (`message.len() + ABYTES` bytes).
    pub fn push(
        &self,
        session: &mut StreamSession<P>,
        out: &mut [u8],
        message: &[u8],
        ad: Option<&[u8]>,
        tag: Tag,
    ) -> Result<(), CryptoError> {
        session.require(StreamPhase::Pushing, "push")?;
        let expected = encoding::stream_ciphertext_len(message.len())?;
        validation::check_exact(Param::Output, out.len(), expected)?;

        let ad = ad.unwrap_or_default();
        if !self
            .provider
            .secretstream_push(&mut session.state, out, message, ad, tag.as_byte())
            .is_success()
        {
            return Err(CryptoError::PrimitiveFailure { operation: "secretstream_push" });
        }

        session.chunks += 1;
        tracing::trace!(len = message.len(), tag = tag.name(), chunk = session.chunks, "chunk pushed");
        if tag == Tag::Final {
            session.phase = StreamPhase::Finished;
            tracing::debug!(chunks = session.chunks, "secret stream push finished");
        }
        Ok(())
    }

    /// Verify and decrypt `input` into `out` (`input.len() - ABYTES` bytes).
    ///
    /// On failure `out` is zeroed and `session` is exactly as it was before
    /// the call.
    pub fn pull(
        &self,
        session: &mut StreamSession<P>,
        out: &mut [u8],
        input: &[u8],
        ad: Option<&[u8]>,
    ) -> Result<Tag, CryptoError> {
        session.require(StreamPhase::Pulling, "pull")?;
        let expected = encoding::stream_plaintext_len(input.len())?;
        validation::check_exact(Param::Output, out.len(), expected)?;

        let snapshot = session.state.clone();
        let ad = ad.unwrap_or_default();
        let mut raw_tag = 0u8;

        if !self
            .provider
            .secretstream_pull(&mut session.state, out, &mut raw_tag, input, ad)
            .is_success()
        {
            session.state = snapshot;
            out.zeroize();
            return Err(CryptoError::AuthenticationFailed);
        }

        let tag = match Tag::try_from(raw_tag) {
            Ok(tag) => tag,
            Err(error) => {
                session.state = snapshot;
                out.zeroize();
                return Err(error);
            },
        };

        session.chunks += 1;
        tracing::trace!(len = out.len(), tag = tag.name(), chunk = session.chunks, "chunk pulled");
        if tag == Tag::Final {
            session.phase = StreamPhase::Finished;
            tracing::debug!(chunks = session.chunks, "secret stream pull finished");
        }
        Ok(tag)
    }

    /// Derive a fresh subkey for this side of the stream.
    ///
    /// The peer must rekey at the same chunk boundary. Chunks tagged
    /// [`Tag::Rekey`] rekey both sides implicitly.
    pub fn rekey(&self, session: &mut StreamSession<P>) -> Result<(), CryptoError> {
        match session.phase {
            StreamPhase::Pushing | StreamPhase::Pulling => {
                self.provider.secretstream_rekey(&mut session.state);
                tracing::debug!(phase = session.phase.name(), chunk = session.chunks, "secret stream rekeyed");
                Ok(())
            },
            phase => Err(CryptoError::InvalidState { state: phase.name(), operation: "rekey" }),
        }
    }

    // Convenience surface

    /// Start an owned push stream and return it with its header.
    pub fn pusher(&self, key: &[u8]) -> Result<(PushStream<'p, P>, Header), CryptoError> {
        let mut session = StreamSession::new();
        let mut header = [0u8; secretstream::HEADERBYTES];
        self.init_push(&mut session, &mut header, key)?;
        Ok((PushStream { stream: *self, session }, Header(header)))
    }

    /// Start an owned pull stream from the sender's header.
    pub fn puller(&self, key: &[u8], header: &[u8]) -> Result<PullStream<'p, P>, CryptoError> {
        let mut session = StreamSession::new();
        self.init_pull(&mut session, header, key)?;
        Ok(PullStream { stream: *self, session })
    }

    /// [`puller`](Self::puller) with key and header given as hex.
    pub fn puller_hex(&self, key_hex: &str, header_hex: &str) -> Result<PullStream<'p, P>, CryptoError> {
        let key = Zeroizing::new(encoding::from_hex(Param::Key, key_hex)?);
        let header = encoding::from_hex(Param::Header, header_hex)?;
        self.puller(&key, &header)
    }

    /// Fresh random stream key.
    pub fn keygen(&self) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; secretstream::KEYBYTES]);
        self.provider.random_bytes(&mut key);
        key
    }
}

/// Owned encrypting stream, produced by [`SecretStream::pusher`].
pub struct PushStream<'p, P: Provider> {
    stream: SecretStream<'p, P>,
    session: StreamSession<P>,
}

impl<P: Provider> PushStream<'_, P> {
    /// Encrypt one chunk.
    pub fn push(&mut self, message: &[u8], ad: Option<&[u8]>, tag: Tag) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; encoding::stream_ciphertext_len(message.len())?];
        self.stream.push(&mut self.session, &mut out, message, ad, tag)?;
        Ok(out)
    }

    /// [`push`](Self::push) returning uppercase hex.
    pub fn push_hex(&mut self, message: &[u8], ad: Option<&[u8]>, tag: Tag) -> Result<String, CryptoError> {
        self.push(message, ad, tag).map(|chunk| encoding::to_hex(&chunk))
    }

    /// Rekey this side.
    pub fn rekey(&mut self) -> Result<(), CryptoError> {
        self.stream.rekey(&mut self.session)
    }

    /// True once a FINAL chunk has been pushed.
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Chunks pushed so far.
    pub fn chunks(&self) -> u64 {
        self.session.chunks()
    }
}

impl<P: Provider> std::fmt::Debug for PushStream<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushStream").field("session", &self.session).finish()
    }
}

/// Owned decrypting stream, produced by [`SecretStream::puller`].
pub struct PullStream<'p, P: Provider> {
    stream: SecretStream<'p, P>,
    session: StreamSession<P>,
}

impl<P: Provider> PullStream<'_, P> {
    /// Verify and decrypt one chunk.
    pub fn pull(&mut self, chunk: &[u8], ad: Option<&[u8]>) -> Result<(Vec<u8>, Tag), CryptoError> {
        let mut out = vec![0u8; encoding::stream_plaintext_len(chunk.len())?];
        let tag = self.stream.pull(&mut self.session, &mut out, chunk, ad)?;
        Ok((out, tag))
    }

    /// [`pull`](Self::pull) on a hex chunk.
    pub fn pull_hex(&mut self, chunk_hex: &str, ad: Option<&[u8]>) -> Result<(Vec<u8>, Tag), CryptoError> {
        let chunk = encoding::from_hex(Param::Ciphertext, chunk_hex)?;
        self.pull(&chunk, ad)
    }

    /// Rekey this side.
    pub fn rekey(&mut self) -> Result<(), CryptoError> {
        self.stream.rekey(&mut self.session)
    }

    /// True once a FINAL chunk has been pulled.
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Chunks pulled so far.
    pub fn chunks(&self) -> u64 {
        self.session.chunks()
    }
}

impl<P: Provider> std::fmt::Debug for PullStream<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullStream").field("session", &self.session).finish()
    }
}

#[cfg(test)]
mod tests {
    use saltline_crypto::{RustCryptoProvider, SecretStreamState};

    use super::*;
    use crate::{error::ErrorKind, testing::RecordingProvider};

    const KEY: [u8; 32] = [0u8; 32];

    #[test]
    fn hello_round_trip() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let chunk = tx.push(b"hello", None, Tag::Message).unwrap();
        assert_eq!(chunk.len(), 5 + secretstream::ABYTES);

        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        let (plaintext, tag) = rx.pull(&chunk, None).unwrap();
        assert_eq!(plaintext, b"hello");
        assert_eq!(tag, Tag::Message);
        assert!(!rx.is_finished());
    }

    #[test]
    fn tag_bytes_match_wire_constants() {
        for tag in Tag::ALL {
            assert_eq!(Tag::try_from(tag.as_byte()).unwrap(), tag);
        }
        assert_eq!(Tag::Final.as_byte(), Tag::Push.as_byte() | Tag::Rekey.as_byte());
        assert_eq!(Tag::try_from(4).unwrap_err(), CryptoError::UnknownTag { value: 4 });
    }

    #[test]
    fn final_closes_both_sides() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let first = tx.push(b"one", None, Tag::Push).unwrap();
        let last = tx.push(b"", None, Tag::Final).unwrap();
        assert!(tx.is_finished());

        let error = tx.push(b"late", None, Tag::Message).unwrap_err();
        assert_eq!(error, CryptoError::InvalidState { state: "finished", operation: "push" });
        assert_eq!(tx.rekey().unwrap_err().kind(), ErrorKind::InvalidState);

        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        assert_eq!(rx.pull(&first, None).unwrap().1, Tag::Push);
        assert_eq!(rx.pull(&last, None).unwrap(), (Vec::new(), Tag::Final));
        assert!(rx.is_finished());
        assert_eq!(rx.chunks(), 2);

        let error = rx.pull(&last, None).unwrap_err();
        assert_eq!(error, CryptoError::InvalidState { state: "finished", operation: "pull" });
    }

    #[test]
    fn directions_cannot_be_mixed() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);
        let mut header = [0u8; secretstream::HEADERBYTES];

        let mut push_side = StreamSession::new();
        stream.init_push(&mut push_side, &mut header, &KEY).unwrap();
        let chunk = [0u8; 20];
        let mut out = [0u8; 20];
        let error = stream.pull(&mut push_side, &mut out[..3], &chunk, None).unwrap_err();
        assert_eq!(error, CryptoError::InvalidState { state: "pushing", operation: "pull" });

        let mut pull_side = StreamSession::new();
        stream.init_pull(&mut pull_side, &header, &KEY).unwrap();
        let error = stream.push(&mut pull_side, &mut out, b"abc", None, Tag::Message).unwrap_err();
        assert_eq!(pull_side.phase(), StreamPhase::Pulling);
        assert_eq!(error, CryptoError::InvalidState { state: "pulling", operation: "push" });

        let mut fresh = StreamSession::<RustCryptoProvider>::new();
        assert_eq!(stream.rekey(&mut fresh).unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn failed_pull_restores_session_and_zeroes_output() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);
        let mut header = [0u8; secretstream::HEADERBYTES];

        let mut tx = StreamSession::new();
        stream.init_push(&mut tx, &mut header, &KEY).unwrap();
        let mut chunk = vec![0u8; 5 + secretstream::ABYTES];
        stream.push(&mut tx, &mut chunk, b"hello", None, Tag::Message).unwrap();

        let mut rx = StreamSession::new();
        stream.init_pull(&mut rx, &header, &KEY).unwrap();

        let mut forged = chunk.clone();
        forged[3] ^= 0x01;
        let mut out = [0xaau8; 5];
        let error = stream.pull(&mut rx, &mut out, &forged, None).unwrap_err();
        assert_eq!(error, CryptoError::AuthenticationFailed);
        assert_eq!(out, [0u8; 5]);
        assert_eq!(rx.chunks(), 0);
        assert_eq!(rx.phase(), StreamPhase::Pulling);

        // The genuine chunk still decrypts: the forgery did not advance state.
        assert_eq!(stream.pull(&mut rx, &mut out, &chunk, None).unwrap(), Tag::Message);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn authentic_chunk_with_unknown_tag_restores_session() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);
        let mut header = [0u8; secretstream::HEADERBYTES];

        let mut tx = StreamSession::new();
        stream.init_push(&mut tx, &mut header, &KEY).unwrap();
        let mut genuine = vec![0u8; 5 + secretstream::ABYTES];
        stream.push(&mut tx, &mut genuine, b"hello", None, Tag::Message).unwrap();

        // A sender below the session layer can authenticate any tag byte.
        let mut raw = SecretStreamState::default();
        assert!(provider.secretstream_init_pull(&mut raw, &header, &KEY).is_success());
        let mut odd = vec![0u8; 5 + secretstream::ABYTES];
        assert!(provider.secretstream_push(&mut raw, &mut odd, b"world", &[], 0x04).is_success());

        let mut rx = StreamSession::new();
        stream.init_pull(&mut rx, &header, &KEY).unwrap();

        let mut out = [0xaau8; 5];
        let error = stream.pull(&mut rx, &mut out, &odd, None).unwrap_err();
        assert_eq!(error, CryptoError::UnknownTag { value: 0x04 });
        assert_eq!(out, [0u8; 5]);
        assert_eq!(rx.chunks(), 0);
        assert_eq!(rx.phase(), StreamPhase::Pulling);

        assert_eq!(stream.pull(&mut rx, &mut out, &genuine, None).unwrap(), Tag::Message);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn associated_data_must_match() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let chunk = tx.push(b"payload", Some(b"v1".as_slice()), Tag::Message).unwrap();

        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        assert!(rx.pull(&chunk, None).unwrap_err().is_authentication_failure());
        assert!(rx.pull(&chunk, Some(b"v2".as_slice())).unwrap_err().is_authentication_failure());
        assert_eq!(rx.pull(&chunk, Some(b"v1".as_slice())).unwrap().0, b"payload");
    }

    #[test]
    fn empty_ad_equals_absent_ad() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let chunk = tx.push(b"x", Some(b"".as_slice()), Tag::Message).unwrap();
        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        assert!(rx.pull(&chunk, None).is_ok());
    }

    #[test]
    fn manual_rekey_must_be_mirrored() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let before = tx.push(b"before", None, Tag::Message).unwrap();
        tx.rekey().unwrap();
        let after = tx.push(b"after", None, Tag::Message).unwrap();

        let mut mirrored = stream.puller(&KEY, header.as_bytes()).unwrap();
        mirrored.pull(&before, None).unwrap();
        mirrored.rekey().unwrap();
        assert_eq!(mirrored.pull(&after, None).unwrap().0, b"after");

        let mut lagging = stream.puller(&KEY, header.as_bytes()).unwrap();
        lagging.pull(&before, None).unwrap();
        assert!(lagging.pull(&after, None).unwrap_err().is_authentication_failure());
    }

    #[test]
    fn rekey_tag_rekeys_both_sides() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let marker = tx.push(b"boundary", None, Tag::Rekey).unwrap();
        let next = tx.push(b"next", None, Tag::Final).unwrap();

        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        assert_eq!(rx.pull(&marker, None).unwrap().1, Tag::Rekey);
        assert_eq!(rx.pull(&next, None).unwrap(), (b"next".to_vec(), Tag::Final));
    }

    #[test]
    fn reordered_chunks_are_rejected() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);

        let (mut tx, header) = stream.pusher(&KEY).unwrap();
        let first = tx.push(b"first", None, Tag::Message).unwrap();
        let second = tx.push(b"second", None, Tag::Message).unwrap();

        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        assert!(rx.pull(&second, None).unwrap_err().is_authentication_failure());
        rx.pull(&first, None).unwrap();
        rx.pull(&second, None).unwrap();
        assert!(rx.pull(&second, None).unwrap_err().is_authentication_failure());
    }

    #[test]
    fn key_and_header_lengths_are_exact() {
        let provider = RecordingProvider::new();
        let stream = SecretStream::new(&provider);
        let mut session = StreamSession::new();

        for len in [secretstream::KEYBYTES - 1, secretstream::KEYBYTES + 1] {
            let mut header = [0u8; secretstream::HEADERBYTES];
            let error = stream.init_push(&mut session, &mut header, &vec![0u8; len]).unwrap_err();
            assert!(matches!(error, CryptoError::InvalidLength { param: Param::Key, .. }));
        }
        for len in [secretstream::HEADERBYTES - 1, secretstream::HEADERBYTES + 1] {
            let error = stream.init_pull(&mut session, &vec![0u8; len], &KEY).unwrap_err();
            assert!(matches!(error, CryptoError::InvalidLength { param: Param::Header, .. }));
        }

        assert_eq!(provider.calls(), 0);
        assert_eq!(session.phase(), StreamPhase::Uninitialized);
    }

    #[test]
    fn short_chunk_is_a_validation_error() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);
        let (_, header) = stream.pusher(&KEY).unwrap();

        let mut rx = stream.puller(&KEY, header.as_bytes()).unwrap();
        let error = rx.pull(&[0u8; secretstream::ABYTES - 1], None).unwrap_err();
        assert!(matches!(error, CryptoError::InvalidLength { param: Param::Ciphertext, .. }));
    }

    #[test]
    fn provider_failure_on_init_is_primitive() {
        let provider = RecordingProvider::failing();
        let stream = SecretStream::new(&provider);

        let error = stream.pusher(&KEY).unwrap_err();
        assert_eq!(error, CryptoError::PrimitiveFailure { operation: "secretstream_init_push" });
    }

    #[test]
    fn hex_surface_round_trips() {
        let provider = RustCryptoProvider::new();
        let stream = SecretStream::new(&provider);
        let key = stream.keygen();
        assert_eq!(key.len(), secretstream::KEYBYTES);

        let (mut tx, header) = stream.pusher(&key).unwrap();
        let chunk_hex = tx.push_hex(b"hex", None, Tag::Final).unwrap();
        assert_eq!(chunk_hex, chunk_hex.to_uppercase());

        let header = Header::from_hex(&header.to_hex().to_lowercase()).unwrap();
        let mut rx = stream.puller_hex(&encoding::to_hex(&key), &header.to_hex()).unwrap();
        assert_eq!(rx.pull_hex(&chunk_hex, None).unwrap(), (b"hex".to_vec(), Tag::Final));

        assert!(Header::from_hex("00").is_err());
    }
}
