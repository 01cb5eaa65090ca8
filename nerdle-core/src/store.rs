use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::broadcast;

use nerdle_types::{
    CurrentWeekState, Player, ScoreEntry, ScoreValue, SubmissionError, UsedWord, WeeklyStanding,
};

/// Capacity of the change-notification channel each store keeps.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// The collections a session mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Players,
    Scores,
    WeeklyStandings,
    UsedWords,
}

/// A score about to be appended; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScoreEntry {
    pub player: String,
    pub score: ScoreValue,
    pub week: i32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected write: {0}")]
    Rejected(String),
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => SubmissionError::Unavailable { message },
            StoreError::Rejected(message) => SubmissionError::Rejected { message },
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the session engine needs from the backing document store:
/// read each collection, append scores and words, and hear about changes.
///
/// `changes` only says *which* collection changed. Subscribers re-run their
/// own query and publish the full result set.
#[async_trait]
pub trait NerdleStore: Send + Sync {
    async fn players(&self) -> StoreResult<Vec<Player>>;

    /// Scores submitted at or after `since`, oldest first.
    async fn scores_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ScoreEntry>>;

    async fn weekly_standings(&self, week: i32) -> StoreResult<Vec<WeeklyStanding>>;

    /// Every used starting word, most recent week first.
    async fn used_words(&self) -> StoreResult<Vec<UsedWord>>;

    async fn current_week(&self) -> StoreResult<CurrentWeekState>;

    async fn append_score(&self, entry: NewScoreEntry) -> StoreResult<ScoreEntry>;

    async fn append_word(&self, word: UsedWord) -> StoreResult<UsedWord>;

    fn changes(&self) -> broadcast::Receiver<Collection>;
}
