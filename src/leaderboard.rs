use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::score::{LeaderboardEntry, RankDirection, ScoreRecord, ScoreType};

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid limit {limit}: must be an integer between {} and {}", MIN_LIMIT, MAX_LIMIT)]
pub struct InvalidLimitError {
    pub limit: i64,
}

/// Checks that a requested leaderboard size lies within `MIN_LIMIT..=MAX_LIMIT`.
pub fn check_limit(limit: i64) -> Result<usize, InvalidLimitError> {
    if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        Ok(limit as usize)
    } else {
        Err(InvalidLimitError { limit })
    }
}

/// Ranked, size-bounded list of entries for one game and score type.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Ranks the records of `score_type` and keeps the best `limit` of them.
    ///
    /// Records of other score types are ignored. Ties on score go to the
    /// earlier submission; exact duplicates fall back to label order so the
    /// result never depends on the order of `records`.
    pub fn assemble(
        records: &[ScoreRecord],
        score_type: ScoreType,
        limit: i64,
    ) -> Result<Self, InvalidLimitError> {
        let limit = check_limit(limit)?;
        let mut ranked: Vec<&ScoreRecord> = records
            .iter()
            .filter(|record| record.score_type == score_type)
            .collect();
        let direction = score_type.direction();
        ranked.sort_by(|a, b| compare(direction, a, b));

        let entries = ranked
            .into_iter()
            .take(limit)
            .zip(1..)
            .map(|(record, rank)| LeaderboardEntry {
                rank,
                label: record.label.clone(),
                label_type: record.label_type,
                score: record.score,
                created_at: record.created_at,
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeaderboardEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }
}

fn compare(direction: RankDirection, a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    let by_score = match direction {
        RankDirection::Ascending => a.score.total_cmp(&b.score),
        RankDirection::Descending => b.score.total_cmp(&a.score),
    };
    by_score
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.label.cmp(&b.label))
        .then_with(|| a.label_type.as_str().cmp(b.label_type.as_str()))
}

/// Known score types found for a game, plus how many stored values were not
/// recognised.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ScoreTypeDiscovery {
    pub score_types: BTreeSet<ScoreType>,
    pub discarded: usize,
}

impl ScoreTypeDiscovery {
    pub fn from_stored<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut discovery = Self::default();
        for value in values {
            match value.as_ref().parse::<ScoreType>() {
                Ok(score_type) => {
                    discovery.score_types.insert(score_type);
                }
                Err(_) => discovery.discarded += 1,
            }
        }
        discovery
    }
}
