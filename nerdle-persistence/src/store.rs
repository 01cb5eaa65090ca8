use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::repositories::{PlayerRepository, ScoreRepository, StandingRepository, WordRepository};
use nerdle_core::demo;
use nerdle_core::{
    Collection, NerdleStore, NewScoreEntry, StoreError, StoreResult, CHANGE_CHANNEL_CAPACITY,
};
use nerdle_types::{CurrentWeekState, Player, ScoreEntry, UsedWord, WeeklyStanding};

/// SQLite-backed store.
///
/// Change notifications cover writes made through this instance only; rows
/// written by another process show up on the next refresh of that collection.
pub struct SqlStore {
    players: PlayerRepository,
    scores: ScoreRepository,
    standings: StandingRepository,
    words: WordRepository,
    current_week: RwLock<CurrentWeekState>,
    changes: broadcast::Sender<Collection>,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection, current_week: CurrentWeekState) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            players: PlayerRepository::new(db.clone()),
            scores: ScoreRepository::new(db.clone()),
            standings: StandingRepository::new(db.clone()),
            words: WordRepository::new(db),
            current_week: RwLock::new(current_week),
            changes,
        }
    }

    pub async fn set_current_week(&self, current_week: CurrentWeekState) {
        *self.current_week.write().await = current_week;
    }

    pub async fn add_player(&self, name: &str) -> StoreResult<Player> {
        let player = self.players.create_player(name).await.map_err(write_error)?;
        self.notify(Collection::Players);
        Ok(player)
    }

    /// Replace a week's standings, as the aggregation job would.
    pub async fn publish_standings(
        &self,
        week: i32,
        standings: Vec<WeeklyStanding>,
    ) -> StoreResult<()> {
        self.standings
            .replace_week(week, standings)
            .await
            .map_err(write_error)?;
        self.notify(Collection::WeeklyStandings);
        Ok(())
    }

    /// Load the sample league into an empty database. Returns false and
    /// leaves everything alone when players already exist.
    pub async fn seed_demo_data(&self) -> StoreResult<bool> {
        if self.players.count().await.map_err(read_error)? > 0 {
            debug!("Database already has players, skipping demo seed");
            return Ok(false);
        }

        for player in demo::demo_players() {
            self.players
                .create_player(&player.name)
                .await
                .map_err(write_error)?;
        }
        self.standings
            .replace_week(demo::DEMO_WEEK, demo::demo_standings())
            .await
            .map_err(write_error)?;
        for word in demo::demo_used_words() {
            self.words.create_used_word(word).await.map_err(write_error)?;
        }

        info!("Seeded demo league for week {}", demo::DEMO_WEEK);
        self.notify(Collection::Players);
        self.notify(Collection::WeeklyStandings);
        self.notify(Collection::UsedWords);
        Ok(true)
    }

    fn notify(&self, collection: Collection) {
        let _ = self.changes.send(collection);
    }
}

fn is_connection_error(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DbErr>(),
        Some(DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
    )
}

fn read_error(err: anyhow::Error) -> StoreError {
    StoreError::Unavailable(format!("{:#}", err))
}

fn write_error(err: anyhow::Error) -> StoreError {
    if is_connection_error(&err) {
        StoreError::Unavailable(format!("{:#}", err))
    } else {
        StoreError::Rejected(format!("{:#}", err))
    }
}

#[async_trait]
impl NerdleStore for SqlStore {
    async fn players(&self) -> StoreResult<Vec<Player>> {
        self.players.list_players().await.map_err(read_error)
    }

    async fn scores_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ScoreEntry>> {
        self.scores.scores_since(since).await.map_err(read_error)
    }

    async fn weekly_standings(&self, week: i32) -> StoreResult<Vec<WeeklyStanding>> {
        self.standings
            .standings_for_week(week)
            .await
            .map_err(read_error)
    }

    async fn used_words(&self) -> StoreResult<Vec<UsedWord>> {
        self.words.list_used_words().await.map_err(read_error)
    }

    async fn current_week(&self) -> StoreResult<CurrentWeekState> {
        Ok(self.current_week.read().await.clone())
    }

    async fn append_score(&self, entry: NewScoreEntry) -> StoreResult<ScoreEntry> {
        let saved = self.scores.create_score(entry).await.map_err(write_error)?;
        self.notify(Collection::Scores);
        Ok(saved)
    }

    async fn append_word(&self, word: UsedWord) -> StoreResult<UsedWord> {
        if self.words.is_used(&word.word).await.map_err(read_error)? {
            return Err(StoreError::Rejected(format!(
                "{} is already a starting word",
                word.word
            )));
        }

        let saved = self.words.create_used_word(word).await.map_err(write_error)?;
        self.notify(Collection::UsedWords);
        Ok(saved)
    }

    fn changes(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};
    use nerdle_core::{submit_score, submit_word, today_start};
    use nerdle_types::{ScoreValue, SubmissionError, ValidationError, WordSubmissionError};

    async fn setup_store() -> SqlStore {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SqlStore::new(db, demo::demo_week())
    }

    #[tokio::test]
    async fn test_seed_demo_data_once() {
        let store = setup_store().await;

        assert!(store.seed_demo_data().await.unwrap());
        assert!(!store.seed_demo_data().await.unwrap());

        assert_eq!(store.players().await.unwrap().len(), 4);
        assert_eq!(store.used_words().await.unwrap()[0].word, "CRANE");

        let standings = store.weekly_standings(demo::DEMO_WEEK).await.unwrap();
        assert_eq!(standings[0].name, "Emma");
        assert!(standings[0].is_on_fire());
    }

    #[tokio::test]
    async fn test_score_submission_persists_and_notifies() {
        let store = setup_store().await;
        let mut changes = store.changes();

        let entry = submit_score(&store, "Emma", Some(ScoreValue::Bust), demo::DEMO_WEEK)
            .await
            .unwrap();
        assert_eq!(changes.recv().await.unwrap(), Collection::Scores);

        let today = store.scores_since(today_start()).await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, entry.id);
        assert_eq!(today[0].score, ScoreValue::Bust);
    }

    #[tokio::test]
    async fn test_word_submission_checks_persisted_words() {
        let store = setup_store().await;
        store.seed_demo_data().await.unwrap();
        let used = store.used_words().await.unwrap();

        let result = submit_word(&store, "slate", 13, "Tom", &used).await;
        assert_eq!(
            result,
            Err(WordSubmissionError::Invalid(ValidationError::AlreadyUsed))
        );

        let booked = submit_word(&store, "stare", 13, "Tom", &used).await.unwrap();
        assert_eq!(booked.word, "STARE");
        assert_eq!(store.used_words().await.unwrap()[0], booked);
    }

    #[tokio::test]
    async fn test_stale_word_list_cannot_book_duplicate() {
        let store = setup_store().await;
        store.seed_demo_data().await.unwrap();
        let before = store.used_words().await.unwrap().len();

        // Validation passes against an empty list, the store still refuses
        let result = submit_word(&store, "audio", 13, "Tom", &[]).await;
        assert!(matches!(
            result,
            Err(WordSubmissionError::Submission(SubmissionError::Rejected { .. }))
        ));
        assert_eq!(store.used_words().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_duplicate_player_rejected() {
        let store = setup_store().await;

        store.add_player("Emma").await.unwrap();
        let err = store.add_player("Emma").await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));

        let notice: SubmissionError = err.into();
        assert_eq!(notice.user_notice(), "Error submitting score. Please try again.");
    }

    #[tokio::test]
    async fn test_publish_standings_notifies() {
        let store = setup_store().await;
        let mut changes = store.changes();

        store
            .publish_standings(13, demo::demo_standings())
            .await
            .unwrap();
        assert_eq!(changes.recv().await.unwrap(), Collection::WeeklyStandings);
        assert_eq!(store.weekly_standings(13).await.unwrap().len(), 3);
    }
}
