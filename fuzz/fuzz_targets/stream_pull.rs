//! Fuzz target for secret stream pull on attacker-controlled chunks
//!
//! # Strategy
//!
//! - A genuine stream of 1-4 chunks is pushed with a fixed key
//! - Each chunk is either delivered intact, truncated, bit-flipped, replaced
//!   by arbitrary bytes or dropped
//! - Optional associated data may be changed on the receiving side
//!
//! # Invariants
//!
//! - Pull never panics
//! - A failed pull zeroes the output and leaves the session usable: the
//!   next intact chunk still opens
//! - An intact chunk with matching AD always opens to its original message
//!   and tag, provided every earlier chunk was accepted in order

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use saltline_core::{Saltline, StreamSession, Tag};
use saltline_crypto::secretstream;

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    chunks: Vec<Chunk>,
    ad: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Arbitrary)]
struct Chunk {
    message: Vec<u8>,
    tag: u8,
    delivery: Delivery,
}

#[derive(Debug, Clone, Arbitrary)]
enum Delivery {
    Intact,
    Truncated(u16),
    BitFlip(u16, u8),
    Replaced(Vec<u8>),
    WrongAd,
}

fuzz_target!(|scenario: Scenario| {
    let saltline = Saltline::new();
    let stream = saltline.secret_stream();
    let key = [0x5Cu8; secretstream::KEYBYTES];
    let ad = scenario.ad.as_deref();

    let mut header = [0u8; secretstream::HEADERBYTES];
    let mut tx = StreamSession::new();
    stream.init_push(&mut tx, &mut header, &key).unwrap();

    let mut rx = StreamSession::new();
    stream.init_pull(&mut rx, &header, &key).unwrap();

    for chunk in scenario.chunks.iter().take(4) {
        let message = &chunk.message[..chunk.message.len().min(512)];
        let tag = Tag::ALL[usize::from(chunk.tag) % Tag::ALL.len()];
        if tx.is_finished() {
            break;
        }

        let mut sealed = vec![0u8; message.len() + secretstream::ABYTES];
        stream.push(&mut tx, &mut sealed, message, ad, tag).unwrap();

        let (delivered, delivered_ad): (Vec<u8>, Option<Vec<u8>>) = match &chunk.delivery {
            Delivery::Intact => (sealed.clone(), ad.map(<[u8]>::to_vec)),
            Delivery::Truncated(len) => {
                (sealed[..usize::from(*len) % sealed.len()].to_vec(), ad.map(<[u8]>::to_vec))
            },
            Delivery::BitFlip(index, bit) => {
                let mut flipped = sealed.clone();
                flipped[usize::from(*index) % flipped.len()] ^= 1 << (bit % 8);
                (flipped, ad.map(<[u8]>::to_vec))
            },
            Delivery::Replaced(bytes) => (bytes.clone(), ad.map(<[u8]>::to_vec)),
            Delivery::WrongAd => {
                let mut wrong = ad.map(<[u8]>::to_vec).unwrap_or_default();
                wrong.push(0xFF);
                (sealed.clone(), Some(wrong))
            },
        };

        let mut out = vec![0xAAu8; delivered.len().saturating_sub(secretstream::ABYTES)];
        let result = stream.pull(&mut rx, &mut out, &delivered, delivered_ad.as_deref());
        match result {
            Ok(pulled) => {
                assert_eq!(pulled, tag);
                assert_eq!(out, message);
            },
            Err(_) => {
                assert!(out.iter().all(|&b| b == 0), "output not wiped after failed pull");

                // The genuine chunk still opens after a rejected one.
                let mut retry = vec![0u8; message.len()];
                let pulled = stream.pull(&mut rx, &mut retry, &sealed, ad).unwrap();
                assert_eq!(pulled, tag);
                assert_eq!(retry, message);
            },
        }
    }
});
