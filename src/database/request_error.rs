use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{catch, Request};

use crate::leaderboard::{InvalidLimitError, MAX_LIMIT, MIN_LIMIT};
use crate::storage_key::EncodingError;
use crate::submission::ValidationError;

#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid score: {0}")]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    InvalidLimit(#[from] InvalidLimitError),
    #[error("invalid limit {value:?}: must be an integer between {} and {}", MIN_LIMIT, MAX_LIMIT)]
    MalformedLimit { value: String },
    #[error("invalid score_type {value:?}, must be one of: HIGH_SCORE, FASTEST_TIME, LONGEST_TIME")]
    InvalidScoreType { value: String },
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RequestError {
    pub fn status(&self) -> Status {
        match self {
            Self::Database(_) => Status::InternalServerError,
            _ => Status::BadRequest,
        }
    }
}

/// JSON body of every error response.
#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

impl<'r> Responder<'r, 'static> for RequestError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).respond_to(request)
    }
}

/// Answers requests no route handled, such as unknown paths, with an [`ErrorBody`].
#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request) -> (Status, Json<ErrorBody>) {
    let body = ErrorBody {
        error: status.reason_lossy().to_lowercase(),
    };
    (status, Json(body))
}

pub type RequestResult<T, E = RequestError> = std::result::Result<T, E>;
