//! Property-based tests for secret streams
//!
//! Round trips for every tag marker, tamper rejection without plaintext
//! release, and rekey consistency between the two sides.

use proptest::prelude::*;
use saltline_core::{CryptoError, Saltline, StreamPhase, StreamSession, Tag};
use saltline_crypto::secretstream;

fn arbitrary_tag() -> impl Strategy<Value = Tag> {
    prop::sample::select(Tag::ALL.to_vec())
}

fn arbitrary_ad() -> impl Strategy<Value = Option<Vec<u8>>> {
    prop::option::of(prop::collection::vec(any::<u8>(), 0..48))
}

#[test]
fn prop_every_chunk_returns_with_its_tag() {
    let saltline = Saltline::new();
    let stream = saltline.secret_stream();

    proptest!(|(
        key in any::<[u8; 32]>(),
        chunks in prop::collection::vec(
            (prop::collection::vec(any::<u8>(), 0..300), arbitrary_ad(), arbitrary_tag()),
            1..10,
        ),
    )| {
        let (mut tx, header) = stream.pusher(&key).unwrap();
        let mut rx = stream.puller(&key, header.as_bytes()).unwrap();

        for (message, ad, tag) in &chunks {
            if tx.is_finished() {
                break;
            }
            let sealed = tx.push(message, ad.as_deref(), *tag).unwrap();
            prop_assert_eq!(sealed.len(), message.len() + secretstream::ABYTES);

            let (opened, got) = rx.pull(&sealed, ad.as_deref()).unwrap();

            // PROPERTY: pull(push(m, tag)) = (m, tag)
            prop_assert_eq!(&opened, message);
            prop_assert_eq!(got, *tag);
        }

        // PROPERTY: both sides agree on whether the stream has ended
        prop_assert_eq!(tx.is_finished(), rx.is_finished());
    });
}

#[test]
fn prop_any_bit_flip_is_rejected_without_release() {
    let saltline = Saltline::new();
    let stream = saltline.secret_stream();

    proptest!(|(
        message in prop::collection::vec(any::<u8>(), 0..200),
        ad in prop::collection::vec(any::<u8>(), 0..32),
        flip in any::<prop::sample::Index>(),
        bit in 0u8..8,
        flip_ad in any::<bool>(),
    )| {
        let key = [0x11; 32];
        let mut header = [0u8; secretstream::HEADERBYTES];
        let mut tx = StreamSession::new();
        stream.init_push(&mut tx, &mut header, &key).unwrap();

        let mut sealed = vec![0u8; message.len() + secretstream::ABYTES];
        stream.push(&mut tx, &mut sealed, &message, Some(ad.as_slice()), Tag::Message).unwrap();

        let mut ad = ad;
        if flip_ad && !ad.is_empty() {
            let position = flip.index(ad.len());
            ad[position] ^= 1 << bit;
        } else {
            let position = flip.index(sealed.len());
            sealed[position] ^= 1 << bit;
        }

        let mut rx = StreamSession::new();
        stream.init_pull(&mut rx, &header, &key).unwrap();
        let mut out = vec![0xa5; message.len()];
        let result = stream.pull(&mut rx, &mut out, &sealed, Some(ad.as_slice()));

        // PROPERTY: a single flipped bit fails authentication and releases nothing
        prop_assert_eq!(result, Err(CryptoError::AuthenticationFailed));
        prop_assert!(out.iter().all(|&b| b == 0));
        prop_assert_eq!(rx.phase(), StreamPhase::Pulling);
        prop_assert_eq!(rx.chunks(), 0);
    });
}

#[test]
fn prop_rekey_must_happen_at_the_same_point() {
    let saltline = Saltline::new();
    let stream = saltline.secret_stream();

    proptest!(|(
        before in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..4),
        after in prop::collection::vec(any::<u8>(), 0..64),
    )| {
        let key = [0x22; 32];
        let (mut tx, header) = stream.pusher(&key).unwrap();
        let sealed_before: Vec<Vec<u8>> =
            before.iter().map(|m| tx.push(m, None, Tag::Message).unwrap()).collect();
        tx.rekey().unwrap();
        let sealed_after = tx.push(&after, None, Tag::Message).unwrap();

        let mut mirrored = stream.puller(&key, header.as_bytes()).unwrap();
        let mut lagging = stream.puller(&key, header.as_bytes()).unwrap();
        for chunk in &sealed_before {
            mirrored.pull(chunk, None).unwrap();
            lagging.pull(chunk, None).unwrap();
        }
        mirrored.rekey().unwrap();

        // PROPERTY: only a receiver that rekeyed at the matching point decrypts
        prop_assert_eq!(mirrored.pull(&sealed_after, None).unwrap().0, after);
        prop_assert_eq!(lagging.pull(&sealed_after, None), Err(CryptoError::AuthenticationFailed));
    });
}

#[test]
fn prop_wrong_key_never_authenticates() {
    let saltline = Saltline::new();
    let stream = saltline.secret_stream();

    proptest!(|(
        key in any::<[u8; 32]>(),
        other in any::<[u8; 32]>(),
        message in prop::collection::vec(any::<u8>(), 0..64),
    )| {
        prop_assume!(key != other);

        let (mut tx, header) = stream.pusher(&key).unwrap();
        let sealed = tx.push(&message, None, Tag::Final).unwrap();

        let mut rx = stream.puller(&other, header.as_bytes()).unwrap();

        // PROPERTY: a stream opened with another key rejects every chunk
        prop_assert_eq!(rx.pull(&sealed, None), Err(CryptoError::AuthenticationFailed));
        prop_assert!(!rx.is_finished());
    });
}

#[test]
fn large_payload_crosses_block_boundaries() {
    let saltline = Saltline::new();
    let stream = saltline.secret_stream();
    let key = stream.keygen();

    let message: Vec<u8> = (0..10_000u32).map(|i| i as u8).collect();
    let (mut tx, header) = stream.pusher(&key).unwrap();
    let sealed = tx.push(&message, Some(b"large".as_slice()), Tag::Final).unwrap();

    let mut rx = stream.puller(&key, header.as_bytes()).unwrap();
    assert_eq!(rx.pull(&sealed, Some(b"large".as_slice())).unwrap(), (message, Tag::Final));
}
