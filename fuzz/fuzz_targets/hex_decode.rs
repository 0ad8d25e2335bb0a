//! Fuzz target for hex decoding at the convenience surface
//!
//! # Invariants
//!
//! - Decoding never panics
//! - Whatever decodes re-encodes to the same text, ignoring case
//! - Malformed text is always a validation error, never a primitive failure

#![no_main]

use libfuzzer_sys::fuzz_target;
use saltline_core::{ErrorKind, Header, Param, encoding};

fuzz_target!(|text: &str| {
    match encoding::from_hex(Param::Message, text) {
        Ok(bytes) => assert!(encoding::to_hex(&bytes).eq_ignore_ascii_case(text)),
        Err(error) => assert_eq!(error.kind(), ErrorKind::Validation),
    }

    if let Err(error) = Header::from_hex(text) {
        assert_eq!(error.kind(), ErrorKind::Validation);
    }
});
