use chrono::Utc;
use tracing::{error, info};

use crate::store::{NerdleStore, NewScoreEntry};
use crate::word_validation::validate_starting_word;
use nerdle_types::{ScoreEntry, ScoreValue, SubmissionError, UsedWord, WordSubmissionError};

/// Record a player's score for the given week.
///
/// One write attempt is made; a store failure is returned to the caller
/// as-is and never retried.
pub async fn submit_score(
    store: &dyn NerdleStore,
    player: &str,
    score: Option<ScoreValue>,
    week: i32,
) -> Result<ScoreEntry, SubmissionError> {
    let player = player.trim();
    if player.is_empty() {
        return Err(SubmissionError::MissingPlayer);
    }
    let score = score.ok_or(SubmissionError::MissingScore)?;

    let entry = NewScoreEntry {
        player: player.to_string(),
        score,
        week,
        submitted_at: Utc::now(),
    };

    match store.append_score(entry).await {
        Ok(saved) => {
            info!(
                "Score {} recorded for {} (week {})",
                saved.score, saved.player, saved.week
            );
            Ok(saved)
        }
        Err(e) => {
            error!("Error submitting score for {}: {}", player, e);
            Err(e.into())
        }
    }
}

/// Validate a starting word and book it for `week`.
/// Nothing is written unless every check passes.
pub async fn submit_word(
    store: &dyn NerdleStore,
    raw_input: &str,
    week: i32,
    picker: &str,
    used: &[UsedWord],
) -> Result<UsedWord, WordSubmissionError> {
    let word = validate_starting_word(raw_input, used)?;

    let record = UsedWord {
        word,
        week,
        picker: picker.to_string(),
    };

    match store.append_word(record).await {
        Ok(saved) => {
            info!(
                "Starting word {} booked for week {} by {}",
                saved.word, saved.week, saved.picker
            );
            Ok(saved)
        }
        Err(e) => {
            error!("Error submitting starting word for week {}: {}", week, e);
            Err(WordSubmissionError::Submission(e.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::memory_store::MemoryStore;
    use crate::views::today_start;
    use nerdle_types::ValidationError;

    #[tokio::test]
    async fn test_submit_score_requires_player_and_score() {
        let store = MemoryStore::new(demo::demo_week());

        let result = submit_score(&store, "", Some(ScoreValue::Two), 12).await;
        assert_eq!(result, Err(SubmissionError::MissingPlayer));

        let result = submit_score(&store, "   ", Some(ScoreValue::Two), 12).await;
        assert_eq!(result, Err(SubmissionError::MissingPlayer));

        let result = submit_score(&store, "Emma", None, 12).await;
        assert_eq!(result, Err(SubmissionError::MissingScore));

        assert!(store.scores_since(today_start()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_score_appends() {
        let store = MemoryStore::new(demo::demo_week());

        let entry = submit_score(&store, "Emma", Some(ScoreValue::Two), 12)
            .await
            .unwrap();
        assert_eq!(entry.player, "Emma");
        assert_eq!(entry.score, ScoreValue::Two);
        assert_eq!(entry.week, 12);
        assert!(!entry.id.is_empty());

        let today = store.scores_since(today_start()).await.unwrap();
        assert_eq!(today, vec![entry]);
    }

    #[tokio::test]
    async fn test_submit_score_store_failure() {
        let store = MemoryStore::new(demo::demo_week());
        store.set_available(false);

        let result = submit_score(&store, "Emma", Some(ScoreValue::Bust), 12).await;
        assert!(matches!(result, Err(SubmissionError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_submit_word_books_word() {
        let store = MemoryStore::with_demo_data();
        let used = store.used_words().await.unwrap();

        let booked = submit_word(&store, "stare", 13, "Tom", &used).await.unwrap();
        assert_eq!(booked.word, "STARE");
        assert_eq!(booked.week, 13);
        assert_eq!(booked.picker, "Tom");

        let words = store.used_words().await.unwrap();
        assert_eq!(words.iter().filter(|w| w.word == "STARE").count(), 1);
        assert_eq!(words.len(), used.len() + 1);
    }

    #[tokio::test]
    async fn test_submit_word_rejects_without_writing() {
        let store = MemoryStore::with_demo_data();
        let used = store.used_words().await.unwrap();

        let result = submit_word(&store, "CRANE", 13, "Tom", &used).await;
        assert_eq!(
            result,
            Err(WordSubmissionError::Invalid(ValidationError::AlreadyUsed))
        );

        let result = submit_word(&store, "CRAN", 13, "Tom", &used).await;
        assert_eq!(
            result,
            Err(WordSubmissionError::Invalid(ValidationError::WrongLength))
        );

        assert_eq!(store.used_words().await.unwrap().len(), used.len());
    }

    #[tokio::test]
    async fn test_submit_word_store_failure() {
        let store = MemoryStore::with_demo_data();
        let used = store.used_words().await.unwrap();
        store.set_available(false);

        let result = submit_word(&store, "STARE", 13, "Tom", &used).await;
        assert!(matches!(
            result,
            Err(WordSubmissionError::Submission(SubmissionError::Unavailable { .. }))
        ));
    }
}
