use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;
use uuid::Uuid;

use crate::demo;
use crate::store::{
    CHANGE_CHANNEL_CAPACITY, Collection, NerdleStore, NewScoreEntry, StoreError, StoreResult,
};
use nerdle_types::{CurrentWeekState, Player, ScoreEntry, UsedWord, WeeklyStanding};

struct StoredScore {
    submitted_at: DateTime<Utc>,
    entry: ScoreEntry,
}

struct MemoryData {
    players: Vec<Player>,
    scores: Vec<StoredScore>,
    standings: HashMap<i32, Vec<WeeklyStanding>>,
    used_words: Vec<UsedWord>,
    current_week: CurrentWeekState,
}

/// Process-local store. Backs the demo mode and stands in for the database
/// in tests; `set_available(false)` simulates an unreachable backend.
pub struct MemoryStore {
    data: RwLock<MemoryData>,
    changes: broadcast::Sender<Collection>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new(current_week: CurrentWeekState) -> Self {
        Self::from_data(MemoryData {
            players: Vec::new(),
            scores: Vec::new(),
            standings: HashMap::new(),
            used_words: Vec::new(),
            current_week,
        })
    }

    fn from_data(data: MemoryData) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            data: RwLock::new(data),
            changes,
            available: AtomicBool::new(true),
        }
    }

    /// Store preloaded with the sample league, including two scores for today.
    pub fn with_demo_data() -> Self {
        let week = demo::demo_week();
        let week_number = week.week_number;
        let now = Utc::now();

        let scores = demo::demo_today_scores()
            .into_iter()
            .map(|(player, score)| StoredScore {
                submitted_at: now,
                entry: ScoreEntry {
                    id: Uuid::new_v4().to_string(),
                    player,
                    score,
                    week: week_number,
                    submitted_at: now.to_rfc3339(),
                },
            })
            .collect();

        Self::from_data(MemoryData {
            players: demo::demo_players(),
            scores,
            standings: HashMap::from([(week_number, demo::demo_standings())]),
            used_words: demo::demo_used_words(),
            current_week: week,
        })
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of live change listeners, one per open subscription.
    pub fn listener_count(&self) -> usize {
        self.changes.receiver_count()
    }

    pub async fn add_player(&self, player: Player) {
        self.data.write().await.players.push(player);
        self.notify(Collection::Players);
    }

    pub async fn set_players(&self, players: Vec<Player>) {
        self.data.write().await.players = players;
        self.notify(Collection::Players);
    }

    /// Replace a week's standings, as the aggregation job would.
    pub async fn set_weekly_standings(&self, week: i32, standings: Vec<WeeklyStanding>) {
        self.data.write().await.standings.insert(week, standings);
        self.notify(Collection::WeeklyStandings);
    }

    pub async fn set_current_week(&self, current_week: CurrentWeekState) {
        self.data.write().await.current_week = current_week;
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    fn notify(&self, collection: Collection) {
        // No listeners is fine
        let _ = self.changes.send(collection);
    }
}

#[async_trait]
impl NerdleStore for MemoryStore {
    async fn players(&self) -> StoreResult<Vec<Player>> {
        self.check_available()?;
        Ok(self.data.read().await.players.clone())
    }

    async fn scores_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ScoreEntry>> {
        self.check_available()?;
        let data = self.data.read().await;

        let mut scores: Vec<&StoredScore> = data
            .scores
            .iter()
            .filter(|stored| stored.submitted_at >= since)
            .collect();
        scores.sort_by_key(|stored| stored.submitted_at);

        Ok(scores.into_iter().map(|stored| stored.entry.clone()).collect())
    }

    async fn weekly_standings(&self, week: i32) -> StoreResult<Vec<WeeklyStanding>> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.standings.get(&week).cloned().unwrap_or_default())
    }

    async fn used_words(&self) -> StoreResult<Vec<UsedWord>> {
        self.check_available()?;
        let mut words = self.data.read().await.used_words.clone();
        words.sort_by(|a, b| b.week.cmp(&a.week));
        Ok(words)
    }

    async fn current_week(&self) -> StoreResult<CurrentWeekState> {
        self.check_available()?;
        Ok(self.data.read().await.current_week.clone())
    }

    async fn append_score(&self, entry: NewScoreEntry) -> StoreResult<ScoreEntry> {
        self.check_available()?;

        let saved = ScoreEntry {
            id: Uuid::new_v4().to_string(),
            player: entry.player,
            score: entry.score,
            week: entry.week,
            submitted_at: entry.submitted_at.to_rfc3339(),
        };

        self.data.write().await.scores.push(StoredScore {
            submitted_at: entry.submitted_at,
            entry: saved.clone(),
        });
        debug!("Stored score {} for {}", saved.score, saved.player);

        self.notify(Collection::Scores);
        Ok(saved)
    }

    async fn append_word(&self, word: UsedWord) -> StoreResult<UsedWord> {
        self.check_available()?;

        let mut data = self.data.write().await;
        if data
            .used_words
            .iter()
            .any(|used| used.word.eq_ignore_ascii_case(&word.word))
        {
            return Err(StoreError::Rejected(format!(
                "{} is already a starting word",
                word.word
            )));
        }
        data.used_words.push(word.clone());
        drop(data);
        debug!("Stored starting word {} for week {}", word.word, word.week);

        self.notify(Collection::UsedWords);
        Ok(word)
    }

    fn changes(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}
