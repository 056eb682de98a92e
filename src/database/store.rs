use sqlx::any::AnyPoolOptions;

use super::*;
use crate::score::{ScoreRecord, ScoreType};
use crate::storage_key::StorageKey;

const CREATE_SCORES_TABLE: &str = "CREATE TABLE IF NOT EXISTS scores (
    game_id TEXT NOT NULL,
    sort_key TEXT NOT NULL,
    label TEXT NOT NULL,
    label_type TEXT NOT NULL,
    score DOUBLE PRECISION NOT NULL,
    score_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (game_id, sort_key)
)";

const UPSERT_SCORE: &str = "INSERT INTO scores
    (game_id, sort_key, label, label_type, score, score_type, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (game_id, sort_key) DO UPDATE SET
        label = excluded.label,
        label_type = excluded.label_type,
        score = excluded.score,
        score_type = excluded.score_type,
        created_at = excluded.created_at";

const SELECT_COLUMNS: &str =
    "SELECT game_id, sort_key, label, label_type, score, score_type, created_at FROM scores";

/// Score persistence, partitioned by game and ordered by storage key.
pub struct ScoreStore {
    pool: DatabasePool,
}

impl ScoreStore {
    /// Connects to `database_url` and creates the `scores` table if it is missing.
    pub async fn connect(database_url: &str, max_connections: u32) -> sqlx::Result<Self> {
        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new().max_connections(max_connections);
        if database_url.contains(":memory:") {
            // Every connection to an in-memory database sees its own copy.
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options.connect(database_url).await?;

        let store = Self { pool };
        store.create_table().await?;
        Ok(store)
    }

    async fn create_table(&self) -> sqlx::Result<()> {
        sqlx::query(CREATE_SCORES_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Writes `record` under `(game_id, key)`. An existing score under the same key is replaced.
    pub async fn put_score(&self, record: &ScoreRecord, key: &StorageKey) -> sqlx::Result<()> {
        let row = StoredScore::new(record, key.as_str().to_owned());
        sqlx::query(UPSERT_SCORE)
            .bind(row.game_id)
            .bind(row.sort_key)
            .bind(row.label)
            .bind(row.label_type)
            .bind(row.score)
            .bind(row.score_type)
            .bind(row.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetches the rows of one score type of a game, in storage key order.
    pub async fn scores_for_game(
        &self,
        game_id: &str,
        score_type: ScoreType,
    ) -> sqlx::Result<Vec<StoredScore>> {
        // '$' sorts right after the '#' separator.
        let lower = StorageKey::prefix(score_type);
        let upper = format!("{}$", score_type.as_str());
        let query = format!(
            "{} WHERE game_id = $1 AND sort_key >= $2 AND sort_key < $3 ORDER BY sort_key",
            SELECT_COLUMNS
        );
        sqlx::query_as::<_, StoredScore>(&query)
            .bind(game_id)
            .bind(lower)
            .bind(upper)
            .fetch_all(&self.pool)
            .await
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Raw `score_type` column of every row of a game.
    pub async fn score_types_for_game(&self, game_id: &str) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT score_type FROM scores WHERE game_id = $1")
            .bind(game_id)
            .fetch_all(&self.pool)
            .await
    }
}
