use rocket::serde::{Deserialize, Serialize};

use crate::score::{LabelType, ScoreType};

pub const GAME_ID_MAX_LEN: usize = 50;
pub const LABEL_MAX_LEN: usize = 100;
pub const INITIALS_LEN: usize = 3;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("game id must be between 1 and {} characters", GAME_ID_MAX_LEN)]
    GameIdLength,
    #[error("game id must contain only alphanumeric characters, hyphens, and underscores")]
    GameIdCharacters,
    #[error("label cannot be empty")]
    EmptyLabel,
    #[error("label must be at most {} characters", LABEL_MAX_LEN)]
    LabelTooLong,
    #[error("label must be exactly {} alphanumeric characters when label_type is INITIALS", INITIALS_LEN)]
    InvalidInitials,
    #[error("score must be a non-negative number, got {score}")]
    InvalidScore { score: f64 },
}

/// Score submission as received from a client.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreSubmission {
    pub game_id: String,
    pub label: String,
    #[serde(default)]
    pub label_type: LabelType,
    pub score: f64,
    pub score_type: ScoreType,
}

/// A submission that passed validation, with normalised game id and label.
#[derive(Clone, PartialEq, Debug)]
pub struct ValidSubmission {
    pub game_id: String,
    pub label: String,
    pub label_type: LabelType,
    pub score: f64,
    pub score_type: ScoreType,
}

impl ScoreSubmission {
    pub fn new(
        game_id: impl Into<String>,
        label: impl Into<String>,
        label_type: LabelType,
        score: f64,
        score_type: ScoreType,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            label: label.into(),
            label_type,
            score,
            score_type,
        }
    }

    pub fn validate(self) -> Result<ValidSubmission, ValidationError> {
        let game_id = normalize_game_id(&self.game_id)?;
        let label = validate_label(&self.label, self.label_type)?;
        if !self.score.is_finite() || self.score < 0.0 {
            return Err(ValidationError::InvalidScore { score: self.score });
        }

        Ok(ValidSubmission {
            game_id,
            label,
            label_type: self.label_type,
            score: self.score,
            score_type: self.score_type,
        })
    }
}

/// Trims and lowercases a game id, then checks its length and characters.
pub fn normalize_game_id(game_id: &str) -> Result<String, ValidationError> {
    let game_id = game_id.trim().to_lowercase();
    let len = game_id.chars().count();
    if len == 0 || len > GAME_ID_MAX_LEN {
        return Err(ValidationError::GameIdLength);
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
    if !game_id.chars().all(allowed) {
        return Err(ValidationError::GameIdCharacters);
    }
    Ok(game_id)
}

fn validate_label(label: &str, label_type: LabelType) -> Result<String, ValidationError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    if label.chars().count() > LABEL_MAX_LEN {
        return Err(ValidationError::LabelTooLong);
    }
    if label_type == LabelType::Initials
        && (label.chars().count() != INITIALS_LEN
            || !label.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return Err(ValidationError::InvalidInitials);
    }
    Ok(label.to_owned())
}
