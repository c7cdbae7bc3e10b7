//! Home-ledger account identifier.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A home-ledger account id, e.g. `alice.trestle` or a contract id.
///
/// Account ids are 2–64 characters of lowercase alphanumerics separated by
/// single `.`, `_` or `-` characters. Separators may not lead, trail, or
/// repeat. These rules are checked by [`AccountId::parse`]; values that
/// arrive from trusted chain responses can be wrapped with
/// [`AccountId::new_unchecked`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 64;

    /// Parse and validate an account id string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, BridgeError> {
        let s = raw.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(BridgeError::InvalidAddress(s))
        }
    }

    /// Wrap a string without validation. For values received from the chain
    /// itself, which already enforces the format.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Whether a string satisfies the home ledger's account id rules.
    pub fn is_valid(s: &str) -> bool {
        if s.len() < Self::MIN_LEN || s.len() > Self::MAX_LEN {
            return false;
        }
        let bytes = s.as_bytes();
        let mut prev_separator = true; // rejects a leading separator
        for &b in bytes {
            match b {
                b'a'..=b'z' | b'0'..=b'9' => prev_separator = false,
                b'.' | b'_' | b'-' => {
                    if prev_separator {
                        return false;
                    }
                    prev_separator = true;
                }
                _ => return false,
            }
        }
        !prev_separator // rejects a trailing separator
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
