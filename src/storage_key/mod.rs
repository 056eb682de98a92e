//! Sortable storage keys.
//!
//! A storage key has the form `<SCORE_TYPE>#<encoded score>` where the encoded
//! score is a fixed-width, zero-padded decimal with three fractional digits.
//! Ascending lexicographic order of keys that share a score type is the rank
//! order for that score type: descending score types store the distance to
//! the configured maximum instead of the score itself.

use rocket::serde::{Deserialize, Serialize};

use crate::score::ScoreType;

mod encode;

pub use encode::*;

/// Number of integer digits in an encoded score.
pub const KEY_INTEGER_DIGITS: usize = 11;
/// Number of fractional digits kept for a score.
pub const KEY_FRACTION_DIGITS: usize = 3;
pub const KEY_SEPARATOR: char = '#';

/// Default upper bound for scores.
pub const DEFAULT_MAX_SCORE: f64 = 999_999_999.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("score must not be negative, got {score}")]
    Negative { score: f64 },
    #[error("score must be a finite number")]
    NotFinite,
    #[error("score {score} exceeds the maximum of {max}")]
    AboveMaximum { score: f64, max: f64 },
    #[error("maximum score {max} cannot be encoded in {} integer digits", KEY_INTEGER_DIGITS)]
    InvalidMaximum { max: f64 },
    #[error("malformed storage key: {key:?}")]
    MalformedKey { key: String },
}

/// A derived key under which a score is persisted inside its game partition.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(crate = "rocket::serde", transparent)]
pub struct StorageKey {
    key: String,
}

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Prefix shared by every key of the given score type.
    pub fn prefix(score_type: ScoreType) -> String {
        format!("{}{}", score_type.as_str(), KEY_SEPARATOR)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Score recovered from a storage key.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DecodedKey {
    pub score_type: ScoreType,
    pub score: f64,
}
