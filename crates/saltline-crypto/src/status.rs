//! Integer status codes returned across the provider boundary.

/// Result code of a single provider call.
///
/// Mirrors the C convention of the primitives: `0` is success, anything
/// else is failure. A few operations use additional positive codes (see
/// [`crate::Provider::pwhash_str_needs_rehash`]).
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(i32);

impl Status {
    /// The operation completed.
    pub const SUCCESS: Self = Self(0);

    /// The operation failed for an unspecified reason.
    pub const FAILURE: Self = Self(-1);

    /// Wrap a raw status code.
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// `SUCCESS` when `ok` holds, `FAILURE` otherwise.
    pub const fn from_bool(ok: bool) -> Self {
        if ok { Self::SUCCESS } else { Self::FAILURE }
    }

    /// True for a zero status.
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Raw status code.
    pub const fn code(self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert!(Status::SUCCESS.is_success());
        assert!(Status::new(0).is_success());
        assert!(!Status::FAILURE.is_success());
        assert!(!Status::new(1).is_success());
    }

    #[test]
    fn from_bool_maps_to_fixed_codes() {
        assert_eq!(Status::from_bool(true).code(), 0);
        assert_eq!(Status::from_bool(false).code(), -1);
    }
}
