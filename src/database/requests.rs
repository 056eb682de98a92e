use rocket::serde::json::{self, Json};
use rocket::serde::{Deserialize, Serialize};
use rocket::*;

use super::*;
use crate::leaderboard::DEFAULT_LIMIT;
use crate::score::ScoreType;
use crate::service::{LeaderboardResponse, LeaderboardService, ScoreTypesResponse, SubmissionReceipt};
use crate::submission::ScoreSubmission;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

#[get("/health")]
pub fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_owned(),
        service: "leaderboard".to_owned(),
    })
}

/// Validates a submission, derives its storage key and stores it
/// with a server-assigned timestamp.
#[post("/games/scores/v1", data = "<submission>")]
pub async fn submit_score(
    submission: Result<Json<ScoreSubmission>, json::Error<'_>>,
    service: &State<LeaderboardService>,
) -> RequestResult<Json<SubmissionReceipt>> {
    let submission = submission.map_err(|error| RequestError::MalformedBody(error.to_string()))?;
    let receipt = service.submit_score(submission.into_inner()).await?;
    Ok(Json(receipt))
}

/// Fetches the ranked top `limit` scores of a game.
/// `score_type` defaults to `HIGH_SCORE` and `limit` to 10.
#[get("/games/leaderboards/v1/<game_id>?<score_type>&<limit>")]
pub async fn get_leaderboard(
    game_id: &str,
    score_type: Option<&str>,
    limit: Option<&str>,
    service: &State<LeaderboardService>,
) -> RequestResult<Json<LeaderboardResponse>> {
    let score_type = match score_type {
        Some(value) => parse_score_type(value)?,
        None => ScoreType::HighScore,
    };
    let limit = match limit {
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| RequestError::MalformedLimit {
                value: value.to_owned(),
            })?,
        None => DEFAULT_LIMIT,
    };

    let response = service.get_leaderboard(game_id, score_type, limit).await?;
    Ok(Json(response))
}

/// Lists the score types that have at least one score for a game.
#[get("/games/score-types/v1/<game_id>")]
pub async fn get_score_types(
    game_id: &str,
    service: &State<LeaderboardService>,
) -> RequestResult<Json<ScoreTypesResponse>> {
    let response = service.score_types(game_id).await?;
    Ok(Json(response))
}

/// Query strings accept score types in any case.
fn parse_score_type(value: &str) -> RequestResult<ScoreType> {
    value
        .trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| RequestError::InvalidScoreType {
            value: value.to_owned(),
        })
}
