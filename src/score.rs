use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Ranking semantic of a leaderboard: decides whether a higher or a lower
/// raw score ranks better.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(crate = "rocket::serde", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreType {
    HighScore,
    FastestTime,
    LongestTime,
}

/// Direction in which scores of a [`ScoreType`] are ranked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RankDirection {
    /// Lower scores rank first.
    Ascending,
    /// Higher scores rank first.
    Descending,
}

impl ScoreType {
    pub const ALL: [ScoreType; 3] = [Self::HighScore, Self::FastestTime, Self::LongestTime];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighScore => "HIGH_SCORE",
            Self::FastestTime => "FASTEST_TIME",
            Self::LongestTime => "LONGEST_TIME",
        }
    }

    pub fn direction(self) -> RankDirection {
        match self {
            Self::FastestTime => RankDirection::Ascending,
            Self::HighScore | Self::LongestTime => RankDirection::Descending,
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown score type: {value:?}")]
pub struct UnknownScoreTypeError {
    pub value: String,
}

impl FromStr for ScoreType {
    type Err = UnknownScoreTypeError;

    /// Strict parse of the canonical tag, as written to storage.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|score_type| score_type.as_str() == s)
            .ok_or_else(|| UnknownScoreTypeError {
                value: s.to_owned(),
            })
    }
}

/// Classification of the player-facing label.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
#[serde(crate = "rocket::serde", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelType {
    Initials,
    Username,
    TeamName,
    Custom,
}

impl Default for LabelType {
    fn default() -> Self {
        Self::Custom
    }
}

impl LabelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initials => "INITIALS",
            Self::Username => "USERNAME",
            Self::TeamName => "TEAM_NAME",
            Self::Custom => "CUSTOM",
        }
    }

    /// Reads a stored label type. Values written by older versions fall back to `CUSTOM`.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "INITIALS" => Self::Initials,
            "USERNAME" => Self::Username,
            "TEAM_NAME" => Self::TeamName,
            _ => Self::Custom,
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted result. Immutable once persisted.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreRecord {
    pub game_id: String,
    pub label: String,
    pub label_type: LabelType,
    pub score: f64,
    pub score_type: ScoreType,
    pub created_at: DateTime<Utc>,
}

/// A ranked view of a [`ScoreRecord`], computed at read time.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub label: String,
    pub label_type: LabelType,
    pub score: f64,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}
