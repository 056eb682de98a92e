use rocket::{
    http::{ContentType, Status},
    local::asynchronous::{Client, LocalResponse},
};

use crate::{
    config::Config,
    database::ErrorBody,
    score::{LabelType, ScoreType},
    service::{LeaderboardResponse, ScoreTypesResponse, SubmissionReceipt},
    submission::ScoreSubmission,
};


async fn spawn_client() -> Client {
    let rocket = super::build(Config::new("sqlite::memory:"))
        .await
        .expect("valid rocket instance");
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn deserialize_response<'a, T: rocket::serde::DeserializeOwned>(
    response: LocalResponse<'a>,
) -> rocket::serde::json::serde_json::Result<T> {
    let string = response.into_string().await.unwrap();
    rocket::serde::json::serde_json::from_str(&string)
}

/// Submits a score and returns the receipt
async fn submit_score<'a>(
    client: &'a Client,
    submission: &ScoreSubmission,
) -> Result<SubmissionReceipt, LocalResponse<'a>> {
    let response = client
        .post("/games/scores/v1")
        .json(submission)
        .dispatch()
        .await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    let receipt = deserialize_response::<SubmissionReceipt>(response)
        .await
        .unwrap();
    Ok(receipt)
}

/// Fetches a leaderboard from `uri`
async fn get_leaderboard<'a>(
    client: &'a Client,
    uri: &'a str,
) -> Result<LeaderboardResponse, LocalResponse<'a>> {
    let response = client.get(uri).dispatch().await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    let leaderboard = deserialize_response::<LeaderboardResponse>(response)
        .await
        .unwrap();
    Ok(leaderboard)
}

fn submission(label: &str, score: f64, score_type: ScoreType) -> ScoreSubmission {
    ScoreSubmission::new(TEST_GAME_ID, label, LabelType::Username, score, score_type)
}

fn labels(response: &LeaderboardResponse) -> Vec<&str> {
    response
        .leaderboard
        .iter()
        .map(|entry| entry.label.as_str())
        .collect()
}

const TEST_GAME_ID: &'static str = "test_game";

#[rocket::async_test]
async fn health_check() {
    let client = spawn_client().await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().await.unwrap();
    assert!(body.contains("healthy"));
    assert!(body.contains("leaderboard"));
}

/// Submits high scores and reads them back in descending order
#[rocket::async_test]
async fn high_score_leaderboard() {
    let client = spawn_client().await;

    for (label, score) in [("P1", 1000.0), ("P2", 3000.0), ("P3", 2000.0), ("P4", 1500.0)] {
        submit_score(&client, &submission(label, score, ScoreType::HighScore))
            .await
            .unwrap();
    }

    let uri = format!("/games/leaderboards/v1/{}?score_type=HIGH_SCORE&limit=10", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();

    assert_eq!(response.game_id, TEST_GAME_ID);
    assert_eq!(response.score_type, ScoreType::HighScore);
    assert_eq!(labels(&response), vec!["P2", "P3", "P4", "P1"]);
    let ranks: Vec<u32> = response.leaderboard.iter().map(|entry| entry.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
    assert_eq!(response.leaderboard[0].score, 3000.0);
}

/// Lower times rank first and the limit truncates the list
#[rocket::async_test]
async fn fastest_time_leaderboard_with_limit() {
    let client = spawn_client().await;

    for (label, score) in [("A", 120.5), ("B", 95.3), ("C", 108.7)] {
        submit_score(&client, &submission(label, score, ScoreType::FastestTime))
            .await
            .unwrap();
    }

    let uri = format!("/games/leaderboards/v1/{}?score_type=fastest_time&limit=2", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();

    assert_eq!(labels(&response), vec!["B", "C"]);
    assert_eq!(response.leaderboard[0].rank, 1);
    assert_eq!(response.leaderboard[0].score, 95.3);
    assert_eq!(response.leaderboard[1].rank, 2);
    assert_eq!(response.leaderboard[1].score, 108.7);
}

/// Leaderboards only contain scores of the requested type
#[rocket::async_test]
async fn leaderboard_defaults_and_score_type_scoping() {
    let client = spawn_client().await;

    submit_score(&client, &submission("HIGH", 50.0, ScoreType::HighScore))
        .await
        .unwrap();
    submit_score(&client, &submission("LONG", 70.0, ScoreType::LongestTime))
        .await
        .unwrap();

    let uri = format!("/games/leaderboards/v1/{}", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();
    assert_eq!(response.score_type, ScoreType::HighScore);
    assert_eq!(labels(&response), vec!["HIGH"]);

    let uri = format!("/games/leaderboards/v1/{}?score_type=LONGEST_TIME", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();
    assert_eq!(labels(&response), vec!["LONG"]);
}

#[rocket::async_test]
async fn empty_leaderboard() {
    let client = spawn_client().await;

    let response = get_leaderboard(&client, "/games/leaderboards/v1/unknown_game").await.unwrap();
    assert!(response.leaderboard.is_empty());
}

/// The receipt carries the normalised submission and its storage key
#[rocket::async_test]
async fn submission_receipt() {
    let client = spawn_client().await;

    let submission = ScoreSubmission::new(
        "  Snake_Classic ",
        " KMW ",
        LabelType::Initials,
        103.0,
        ScoreType::HighScore,
    );
    let receipt = submit_score(&client, &submission).await.unwrap();

    assert_eq!(receipt.game_id, "snake_classic");
    assert_eq!(receipt.label, "KMW");
    assert_eq!(receipt.label_type, LabelType::Initials);
    assert_eq!(receipt.storage_key.as_str(), "HIGH_SCORE#00999999896.000");

    let response = get_leaderboard(&client, "/games/leaderboards/v1/SNAKE_CLASSIC").await.unwrap();
    assert_eq!(labels(&response), vec!["KMW"]);
    assert_eq!(response.leaderboard[0].label_type, LabelType::Initials);
}

/// The receipt reports the score and timestamp exactly as the leaderboard serves them
#[rocket::async_test]
async fn receipt_matches_stored_score() {
    let client = spawn_client().await;

    let receipt = submit_score(&client, &submission("P1", 1.0004, ScoreType::FastestTime))
        .await
        .unwrap();
    assert_eq!(receipt.score, 1.0);

    let uri = format!("/games/leaderboards/v1/{}?score_type=FASTEST_TIME", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();
    assert_eq!(response.leaderboard.len(), 1);
    assert_eq!(response.leaderboard[0].score, receipt.score);
    assert_eq!(response.leaderboard[0].created_at, receipt.created_at);
}

/// Bodies are read as JSON whatever the Content-Type header says
#[rocket::async_test]
async fn submission_without_content_type() {
    let client = spawn_client().await;

    let response = client
        .post("/games/scores/v1")
        .body(r#"{"game_id": "test_game", "label": "P1", "score": 7, "score_type": "HIGH_SCORE"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post("/games/scores/v1")
        .header(ContentType::Plain)
        .body("not json")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = deserialize_response::<ErrorBody>(response).await.unwrap();
    assert!(!body.error.is_empty());

    let uri = format!("/games/leaderboards/v1/{}", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();
    assert_eq!(labels(&response), vec!["P1"]);
}

/// Requests no route handles still get a JSON error body
#[rocket::async_test]
async fn unknown_routes_answer_with_json() {
    let client = spawn_client().await;

    let response = client.get("/games/unknown/v1").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(response.content_type(), Some(ContentType::JSON));

    let body = deserialize_response::<ErrorBody>(response).await.unwrap();
    assert_eq!(body.error, "not found");
}

/// `label_type` may be omitted from the request body
#[rocket::async_test]
async fn label_type_defaults_to_custom() {
    let client = spawn_client().await;

    let response = client
        .post("/games/scores/v1")
        .header(ContentType::JSON)
        .body(r#"{"game_id": "test_game", "label": "Team Rocket", "score": 12.5, "score_type": "LONGEST_TIME"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let receipt = deserialize_response::<SubmissionReceipt>(response)
        .await
        .unwrap();
    assert_eq!(receipt.label_type, LabelType::Custom);
}

/// Two scores with the same key in the same game: the later one wins
#[rocket::async_test]
async fn same_storage_key_overwrites() {
    let client = spawn_client().await;

    let first = submit_score(&client, &submission("FIRST", 42.0, ScoreType::HighScore))
        .await
        .unwrap();
    let second = submit_score(&client, &submission("SECOND", 42.0, ScoreType::HighScore))
        .await
        .unwrap();
    assert_eq!(first.storage_key, second.storage_key);

    let uri = format!("/games/leaderboards/v1/{}", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();
    assert_eq!(labels(&response), vec!["SECOND"]);
}

#[rocket::async_test]
async fn invalid_submissions_are_rejected() {
    let client = spawn_client().await;

    let invalid = [
        submission("P1", -10.0, ScoreType::HighScore),
        ScoreSubmission::new(TEST_GAME_ID, "KMWX", LabelType::Initials, 1.0, ScoreType::HighScore),
        ScoreSubmission::new(TEST_GAME_ID, "K-W", LabelType::Initials, 1.0, ScoreType::HighScore),
        ScoreSubmission::new("bad game!", "P1", LabelType::Custom, 1.0, ScoreType::HighScore),
        ScoreSubmission::new(TEST_GAME_ID, "   ", LabelType::Custom, 1.0, ScoreType::HighScore),
        submission("P1", 1_000_000_000.0, ScoreType::HighScore),
        submission("P1", 999_999_999.0004, ScoreType::HighScore),
        submission("P1", 999_999_999.0004, ScoreType::FastestTime),
    ];
    for submission in &invalid {
        let response = submit_score(&client, submission).await.unwrap_err();
        assert_eq!(response.status(), Status::BadRequest);
    }

    let response = client
        .post("/games/scores/v1")
        .header(ContentType::JSON)
        .body(r#"{"game_id": "test_game", "label": "P1", "score": 1, "score_type": "MOST_COINS"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    // Nothing was stored
    let uri = format!("/games/leaderboards/v1/{}", TEST_GAME_ID);
    let response = get_leaderboard(&client, &uri).await.unwrap();
    assert!(response.leaderboard.is_empty());
}

#[rocket::async_test]
async fn invalid_leaderboard_requests_are_rejected() {
    let client = spawn_client().await;

    for query in ["limit=0", "limit=101", "limit=ten", "score_type=invalid_type"] {
        let uri = format!("/games/leaderboards/v1/{}?{}", TEST_GAME_ID, query);
        let response = get_leaderboard(&client, &uri).await.unwrap_err();
        assert_eq!(response.status(), Status::BadRequest);

        let body = deserialize_response::<ErrorBody>(response).await.unwrap();
        assert!(!body.error.is_empty());
    }
}

/// Lists the score types a game has scores for
#[rocket::async_test]
async fn score_types_for_game() {
    let client = spawn_client().await;

    submit_score(&client, &submission("P1", 10.0, ScoreType::FastestTime))
        .await
        .unwrap();
    submit_score(&client, &submission("P2", 20.0, ScoreType::HighScore))
        .await
        .unwrap();
    submit_score(&client, &submission("P3", 30.0, ScoreType::FastestTime))
        .await
        .unwrap();
    let other_game = ScoreSubmission::new("other_game", "P4", LabelType::Custom, 5.0, ScoreType::LongestTime);
    submit_score(&client, &other_game).await.unwrap();

    let uri = format!("/games/score-types/v1/{}", TEST_GAME_ID);
    let response = client.get(&uri).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = deserialize_response::<ScoreTypesResponse>(response)
        .await
        .unwrap();
    assert_eq!(response.game_id, TEST_GAME_ID);
    assert_eq!(
        response.score_types,
        vec![ScoreType::HighScore, ScoreType::FastestTime]
    );
}
