//! Fuzz target for incremental digest chunking invariance
//!
//! # Strategy
//!
//! - Arbitrary input split at arbitrary points into 0..n updates
//! - Every algorithm, keyed where it accepts a key
//!
//! # Invariants
//!
//! - The incremental result equals the one-shot result regardless of split
//! - Sessions never panic and always end Finalized

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use saltline_core::{DigestAlgorithm, DigestPhase, DigestSession, Saltline};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    input: Vec<u8>,
    splits: Vec<u16>,
    algorithm: u8,
    key: [u8; 32],
}

fuzz_target!(|scenario: Scenario| {
    let saltline = Saltline::new();
    let hashing = saltline.hashing();
    let algorithm = DigestAlgorithm::ALL[usize::from(scenario.algorithm) % DigestAlgorithm::ALL.len()];
    let key = algorithm.accepts_key().then_some(&scenario.key[..algorithm.key_bytes()]);

    let mut one_shot = vec![0u8; algorithm.bytes()];
    hashing.digest(algorithm, &mut one_shot, &scenario.input, key).unwrap();

    let mut session = DigestSession::new();
    hashing.init(&mut session, algorithm, key, algorithm.bytes()).unwrap();

    let mut rest = scenario.input.as_slice();
    for split in &scenario.splits {
        let at = usize::from(*split).min(rest.len());
        let (piece, tail) = rest.split_at(at);
        hashing.update(&mut session, piece).unwrap();
        rest = tail;
    }
    hashing.update(&mut session, rest).unwrap();

    let mut incremental = vec![0u8; algorithm.bytes()];
    hashing.finalize(&mut session, &mut incremental).unwrap();

    assert_eq!(session.phase(), DigestPhase::Finalized);
    assert_eq!(incremental, one_shot);
});
