//! User identifiers
//!
//! A [`UserId`] is the ledger key for a buyer. Construction is the single
//! validation and normalization point: identifiers equal after normalization
//! denote the same user, so `"  Alice@X.com  "` and `"alice@x.com"` map to
//! one ledger entry.

use crate::constants::USER_ID_LENGTH_BYTES_MAX;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Normalized user identifier
///
/// Invariants: non-empty, at most [`USER_ID_LENGTH_BYTES_MAX`] bytes,
/// surrounding whitespace trimmed, lower-cased. Immutable after creation.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Parse and normalize a raw user id
    ///
    /// # Errors
    /// Returns `Error::InvalidUserId` if the id is empty (or whitespace-only)
    /// after trimming, or exceeds the length limit.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidUserId {
                reason: "must not be empty or whitespace-only".into(),
            });
        }

        if trimmed.len() > USER_ID_LENGTH_BYTES_MAX {
            return Err(Error::InvalidUserId {
                reason: format!(
                    "length {} exceeds limit {}",
                    trimmed.len(),
                    USER_ID_LENGTH_BYTES_MAX
                ),
            });
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Get the normalized id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
