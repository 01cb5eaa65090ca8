use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Rejection of a starting word. Never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
pub enum ValidationError {
    #[error("Word must be exactly 5 letters")]
    WrongLength,
    #[error("Word must contain only letters")]
    NonAlphabetic,
    #[error("This word has already been used!")]
    AlreadyUsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
pub enum SubmissionError {
    #[error("Select your name before submitting")]
    MissingPlayer,
    #[error("Select a score before submitting")]
    MissingScore,
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
    #[error("write rejected: {message}")]
    Rejected { message: String },
}

impl SubmissionError {
    /// Text for the blocking alert shown to the player.
    pub fn user_notice(&self) -> String {
        match self {
            SubmissionError::MissingPlayer | SubmissionError::MissingScore => self.to_string(),
            SubmissionError::Unavailable { .. } | SubmissionError::Rejected { .. } => {
                "Error submitting score. Please try again.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordSubmissionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl WordSubmissionError {
    pub fn user_notice(&self) -> String {
        match self {
            WordSubmissionError::Invalid(reason) => reason.to_string(),
            WordSubmissionError::Submission(_) => {
                "Error submitting word. Please try again.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid score {raw:?}: expected 1-6 or X")]
pub struct InvalidScore {
    pub raw: String,
}
