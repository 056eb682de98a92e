use chrono::{DateTime, SubsecRound, Utc};
use rocket::serde::{Deserialize, Serialize};

use crate::database::{RequestResult, ScoreStore, StoredScore};
use crate::leaderboard::{check_limit, Leaderboard, ScoreTypeDiscovery};
use crate::score::{LabelType, LeaderboardEntry, ScoreRecord, ScoreType};
use crate::storage_key::{KeyEncoder, StorageKey};
use crate::submission::{normalize_game_id, ScoreSubmission};

/// Confirmation returned after a score is stored.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SubmissionReceipt {
    pub message: String,
    pub game_id: String,
    pub label: String,
    pub label_type: LabelType,
    pub score: f64,
    pub score_type: ScoreType,
    pub storage_key: StorageKey,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct LeaderboardResponse {
    pub game_id: String,
    pub score_type: ScoreType,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreTypesResponse {
    pub game_id: String,
    pub score_types: Vec<ScoreType>,
}

/// Glue between requests, the key encoder, the assembler, and the store.
pub struct LeaderboardService {
    store: ScoreStore,
    encoder: KeyEncoder,
}

impl LeaderboardService {
    pub fn new(store: ScoreStore, encoder: KeyEncoder) -> Self {
        Self { store, encoder }
    }

    pub async fn submit_score(&self, submission: ScoreSubmission) -> RequestResult<SubmissionReceipt> {
        let submission = submission.validate()?;
        let score = self.encoder.quantise(submission.score)?;
        let storage_key = self.encoder.encode(submission.score_type, score)?;

        // Stored timestamps keep microseconds.
        let record = ScoreRecord {
            game_id: submission.game_id,
            label: submission.label,
            label_type: submission.label_type,
            score,
            score_type: submission.score_type,
            created_at: Utc::now().trunc_subsecs(6),
        };
        self.store.put_score(&record, &storage_key).await?;

        tracing::info!(
            game_id = %record.game_id,
            score_type = %record.score_type,
            storage_key = %storage_key,
            "score submitted"
        );

        Ok(SubmissionReceipt {
            message: "Score submitted successfully".to_owned(),
            game_id: record.game_id,
            label: record.label,
            label_type: record.label_type,
            score: record.score,
            score_type: record.score_type,
            storage_key,
            created_at: record.created_at,
        })
    }

    pub async fn get_leaderboard(
        &self,
        game_id: &str,
        score_type: ScoreType,
        limit: i64,
    ) -> RequestResult<LeaderboardResponse> {
        let game_id = normalize_game_id(game_id)?;
        check_limit(limit)?;

        let rows = self.store.scores_for_game(&game_id, score_type).await?;
        let records = self.decode_rows(rows);
        let leaderboard = Leaderboard::assemble(&records, score_type, limit)?;

        tracing::info!(
            game_id = %game_id,
            score_type = %score_type,
            limit,
            entries = leaderboard.len(),
            "leaderboard served"
        );

        Ok(LeaderboardResponse {
            game_id,
            score_type,
            leaderboard: leaderboard.into_entries(),
        })
    }

    pub async fn score_types(&self, game_id: &str) -> RequestResult<ScoreTypesResponse> {
        let game_id = normalize_game_id(game_id)?;
        let stored = self.store.score_types_for_game(&game_id).await?;
        let discovery = ScoreTypeDiscovery::from_stored(stored);

        if discovery.discarded > 0 {
            tracing::warn!(
                game_id = %game_id,
                discarded = discovery.discarded,
                "skipped unknown score types"
            );
        }

        Ok(ScoreTypesResponse {
            game_id,
            score_types: discovery.score_types.into_iter().collect(),
        })
    }

    /// Interprets stored rows. A row is skipped when its columns do not decode,
    /// or when its sort key does not decode to the row's own score type and score.
    fn decode_rows(&self, rows: Vec<StoredScore>) -> Vec<ScoreRecord> {
        rows.into_iter()
            .filter_map(|row| {
                let sort_key = row.sort_key.clone();
                let decoded = match self.encoder.decode(&sort_key) {
                    Ok(decoded) => decoded,
                    Err(error) => {
                        tracing::warn!(%sort_key, %error, "skipped score row with an invalid sort key");
                        return None;
                    }
                };
                let record = match row.into_record() {
                    Ok(record) => record,
                    Err(error) => {
                        tracing::warn!(%sort_key, %error, "skipped unreadable score row");
                        return None;
                    }
                };
                if decoded.score_type != record.score_type || decoded.score != record.score {
                    tracing::warn!(
                        %sort_key,
                        score = record.score,
                        score_type = %record.score_type,
                        "skipped score row that disagrees with its sort key"
                    );
                    return None;
                }
                Some(record)
            })
            .collect()
    }
}
