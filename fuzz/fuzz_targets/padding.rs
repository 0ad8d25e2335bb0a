//! Fuzz target for ISO/IEC 7816-4 padding
//!
//! # Invariants
//!
//! - Padding then unpadding returns the original bytes for every block size
//! - Unpadding arbitrary input never panics and never reports a length past
//!   the input

#![no_main]

use libfuzzer_sys::fuzz_target;
use saltline_core::{ErrorKind, encoding};

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (block, data) = input;
    let block_size = usize::from(block) + 1;

    let padded = encoding::pad(&data, block_size).unwrap();
    assert_eq!(padded.len() % block_size, 0);
    assert_eq!(encoding::unpad(&padded, block_size).unwrap(), data.as_slice());

    match encoding::unpadded_len(&data, block_size) {
        Ok(len) => assert!(len < data.len()),
        Err(error) => assert_eq!(error.kind(), ErrorKind::Validation),
    }
});
