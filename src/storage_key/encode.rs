use super::*;

use crate::score::RankDirection;

/// Thousandths per score unit.
const SCALE: u64 = 1000;

/// Turns `(score type, score)` pairs into [`StorageKey`]s and back.
///
/// Scores must lie within `0..=max_score` and are quantised to thousandths,
/// rounding half away from zero.
///
/// Descending keys depend on the maximum, so keys written under one maximum do
/// not decode to the same score under another.
#[derive(Clone, Copy, Debug)]
pub struct KeyEncoder {
    max_thousandths: u64,
}

impl Default for KeyEncoder {
    fn default() -> Self {
        Self {
            max_thousandths: DEFAULT_MAX_SCORE as u64 * SCALE,
        }
    }
}

impl KeyEncoder {
    pub fn new(max_score: f64) -> Result<Self, EncodingError> {
        let limit = 10u64.pow(KEY_INTEGER_DIGITS as u32) * SCALE;
        if !max_score.is_finite() || max_score <= 0.0 {
            return Err(EncodingError::InvalidMaximum { max: max_score });
        }
        let max_thousandths = (max_score * SCALE as f64).round();
        if max_thousandths < 1.0 || max_thousandths >= limit as f64 {
            return Err(EncodingError::InvalidMaximum { max: max_score });
        }
        Ok(Self {
            max_thousandths: max_thousandths as u64,
        })
    }

    pub fn max_score(&self) -> f64 {
        from_thousandths(self.max_thousandths)
    }

    /// The score as it is represented in a key.
    pub fn quantise(&self, score: f64) -> Result<f64, EncodingError> {
        self.thousandths(score).map(from_thousandths)
    }

    pub fn encode(&self, score_type: ScoreType, score: f64) -> Result<StorageKey, EncodingError> {
        let thousandths = self.thousandths(score)?;
        let encoded = match score_type.direction() {
            RankDirection::Ascending => thousandths,
            RankDirection::Descending => self.max_thousandths - thousandths,
        };

        let key = format!(
            "{}{}{:0int$}.{:0frac$}",
            score_type.as_str(),
            KEY_SEPARATOR,
            encoded / SCALE,
            encoded % SCALE,
            int = KEY_INTEGER_DIGITS,
            frac = KEY_FRACTION_DIGITS,
        );
        Ok(StorageKey { key })
    }

    pub fn decode(&self, key: &str) -> Result<DecodedKey, EncodingError> {
        let malformed = || EncodingError::MalformedKey {
            key: key.to_owned(),
        };

        let (tag, body) = key.split_once(KEY_SEPARATOR).ok_or_else(malformed)?;
        let score_type: ScoreType = tag.parse().map_err(|_| malformed())?;
        let (integer, fraction) = body.split_once('.').ok_or_else(malformed)?;
        let integer = parse_digits(integer, KEY_INTEGER_DIGITS).ok_or_else(malformed)?;
        let fraction = parse_digits(fraction, KEY_FRACTION_DIGITS).ok_or_else(malformed)?;

        let encoded = integer * SCALE + fraction;
        if encoded > self.max_thousandths {
            return Err(malformed());
        }
        let thousandths = match score_type.direction() {
            RankDirection::Ascending => encoded,
            RankDirection::Descending => self.max_thousandths - encoded,
        };

        Ok(DecodedKey {
            score_type,
            score: from_thousandths(thousandths),
        })
    }

    fn thousandths(&self, score: f64) -> Result<u64, EncodingError> {
        if !score.is_finite() {
            return Err(EncodingError::NotFinite);
        }
        if score < 0.0 {
            return Err(EncodingError::Negative { score });
        }
        let max = self.max_score();
        if score > max {
            return Err(EncodingError::AboveMaximum { score, max });
        }
        Ok(((score * SCALE as f64).round() as u64).min(self.max_thousandths))
    }
}

fn from_thousandths(thousandths: u64) -> f64 {
    thousandths as f64 / SCALE as f64
}

/// Parses exactly `width` ASCII digits.
fn parse_digits(digits: &str, width: usize) -> Option<u64> {
    if digits.len() != width || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
