use chrono::{DateTime, SecondsFormat, Utc};

use crate::score::{LabelType, ScoreRecord, ScoreType};

// Column types allowed by the `Any` driver:
// i32
// i64
// f64
// bool
// String

/// A row of the `scores` table, before its enum and timestamp columns are interpreted.
#[derive(Clone, PartialEq, Debug, sqlx::FromRow)]
pub struct StoredScore {
    pub game_id: String,
    pub sort_key: String,
    pub label: String,
    pub label_type: String,
    pub score: f64,
    pub score_type: String,
    pub created_at: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error(transparent)]
    ScoreType(#[from] crate::score::UnknownScoreTypeError),
    #[error("invalid timestamp {value:?}")]
    Timestamp { value: String },
}

impl StoredScore {
    pub fn new(record: &ScoreRecord, sort_key: String) -> Self {
        Self {
            game_id: record.game_id.clone(),
            sort_key,
            label: record.label.clone(),
            label_type: record.label_type.as_str().to_owned(),
            score: record.score,
            score_type: record.score_type.as_str().to_owned(),
            created_at: format_timestamp(record.created_at),
        }
    }

    pub fn into_record(self) -> Result<ScoreRecord, RowError> {
        let score_type: ScoreType = self.score_type.parse()?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|_| RowError::Timestamp {
                value: self.created_at.clone(),
            })?
            .with_timezone(&Utc);

        Ok(ScoreRecord {
            game_id: self.game_id,
            label: self.label,
            label_type: LabelType::from_stored(&self.label_type),
            score: self.score,
            score_type,
            created_at,
        })
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
