use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::{Collection, NerdleStore, StoreResult};
use crate::views::{next_day_start, today_start};
use nerdle_types::{Player, ScoreEntry, UsedWord, WeeklyStanding};

/// A query whose full result set is republished whenever its collection changes.
#[async_trait]
pub trait LiveQuery: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    fn collection(&self) -> Collection;

    /// How long until the result set goes stale without any write, for
    /// queries bounded by the clock. `None` means only writes invalidate it.
    fn refresh_after(&self) -> Option<Duration> {
        None
    }

    async fn fetch(&self, store: &dyn NerdleStore) -> StoreResult<Vec<Self::Item>>;
}

pub struct PlayersQuery;

#[async_trait]
impl LiveQuery for PlayersQuery {
    type Item = Player;

    fn collection(&self) -> Collection {
        Collection::Players
    }

    async fn fetch(&self, store: &dyn NerdleStore) -> StoreResult<Vec<Player>> {
        store.players().await
    }
}

/// Scores since local midnight. The feed refetches shortly after each local
/// midnight so a long-lived session starts the new day empty.
pub struct TodayScoresQuery;

/// Slack past midnight before the rollover refetch.
const ROLLOVER_MARGIN: Duration = Duration::from_secs(1);

#[async_trait]
impl LiveQuery for TodayScoresQuery {
    type Item = ScoreEntry;

    fn collection(&self) -> Collection {
        Collection::Scores
    }

    fn refresh_after(&self) -> Option<Duration> {
        let until_midnight = (next_day_start() - chrono::Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        Some(until_midnight + ROLLOVER_MARGIN)
    }

    async fn fetch(&self, store: &dyn NerdleStore) -> StoreResult<Vec<ScoreEntry>> {
        store.scores_since(today_start()).await
    }
}

pub struct WeeklyStandingsQuery {
    pub week: i32,
}

#[async_trait]
impl LiveQuery for WeeklyStandingsQuery {
    type Item = WeeklyStanding;

    fn collection(&self) -> Collection {
        Collection::WeeklyStandings
    }

    async fn fetch(&self, store: &dyn NerdleStore) -> StoreResult<Vec<WeeklyStanding>> {
        store.weekly_standings(self.week).await
    }
}

pub struct UsedWordsQuery;

#[async_trait]
impl LiveQuery for UsedWordsQuery {
    type Item = UsedWord;

    fn collection(&self) -> Collection {
        Collection::UsedWords
    }

    async fn fetch(&self, store: &dyn NerdleStore) -> StoreResult<Vec<UsedWord>> {
        store.used_words().await
    }
}

/// Live feed of one query's result set.
///
/// A background task fetches the query once, then again after every change
/// notification for its collection or when the query's clock bound expires,
/// and publishes each complete result.
/// A failed refresh is logged and the previous snapshot stays current.
/// Dropping the subscription stops the task.
pub struct Subscription<T> {
    receiver: watch::Receiver<Vec<T>>,
    task: JoinHandle<()>,
    open: bool,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    pub fn spawn<Q>(store: Arc<dyn NerdleStore>, query: Q) -> Self
    where
        Q: LiveQuery<Item = T>,
    {
        let (sender, receiver) = watch::channel(Vec::new());
        // Listen before the first fetch so no change slips between them
        let mut changes = store.changes();

        let task = tokio::spawn(async move {
            let collection = query.collection();

            loop {
                match query.fetch(store.as_ref()).await {
                    Ok(items) => {
                        if sender.send(items).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(
                            "Refreshing {:?} failed, keeping last snapshot: {}",
                            collection, e
                        );
                    }
                }

                let refresh_after = query.refresh_after();

                tokio::select! {
                    _ = sender.closed() => break,
                    changed = wait_for_change(&mut changes, collection) => {
                        if !changed {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(refresh_after.unwrap_or(Duration::MAX)), if refresh_after.is_some() => {
                        debug!("Clock bound for {:?} expired, refetching", collection);
                    }
                }
            }

            debug!("Snapshot feed for {:?} stopped", collection);
        });

        Self {
            receiver,
            task,
            open: true,
        }
    }

    /// Wait for the next snapshot. `None` once the feed has stopped.
    pub async fn changed(&mut self) -> Option<Vec<T>> {
        if self.receiver.changed().await.is_err() {
            self.open = false;
            return None;
        }
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Returns false once the store stops sending notifications.
async fn wait_for_change(
    changes: &mut broadcast::Receiver<Collection>,
    collection: Collection,
) -> bool {
    loop {
        match changes.recv().await {
            Ok(changed) if changed == collection => return true,
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                // Missed notifications may include ours, refetch to be safe
                debug!("Change feed lagged by {} for {:?}", skipped, collection);
                return true;
            }
            Err(RecvError::Closed) => return false,
        }
    }
}

/// A full replacement result set for one mirrored collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Players(Vec<Player>),
    TodayScores(Vec<ScoreEntry>),
    WeeklyStandings(Vec<WeeklyStanding>),
    UsedWords(Vec<UsedWord>),
}

/// The four feeds a session mirrors.
pub struct LiveFeeds {
    players: Subscription<Player>,
    today_scores: Subscription<ScoreEntry>,
    weekly_standings: Subscription<WeeklyStanding>,
    used_words: Subscription<UsedWord>,
}

impl LiveFeeds {
    pub fn subscribe(store: Arc<dyn NerdleStore>, week: i32) -> Self {
        Self {
            players: Subscription::spawn(store.clone(), PlayersQuery),
            today_scores: Subscription::spawn(store.clone(), TodayScoresQuery),
            weekly_standings: Subscription::spawn(store.clone(), WeeklyStandingsQuery { week }),
            used_words: Subscription::spawn(store, UsedWordsQuery),
        }
    }

    pub fn is_live(&self) -> bool {
        self.players.is_open()
            || self.today_scores.is_open()
            || self.weekly_standings.is_open()
            || self.used_words.is_open()
    }

    /// Next snapshot from whichever feed changes first.
    /// `None` when every feed has stopped.
    pub async fn next(&mut self) -> Option<Snapshot> {
        tokio::select! {
            Some(items) = self.players.changed(), if self.players.is_open() => {
                Some(Snapshot::Players(items))
            }
            Some(items) = self.today_scores.changed(), if self.today_scores.is_open() => {
                Some(Snapshot::TodayScores(items))
            }
            Some(items) = self.weekly_standings.changed(), if self.weekly_standings.is_open() => {
                Some(Snapshot::WeeklyStandings(items))
            }
            Some(items) = self.used_words.changed(), if self.used_words.is_open() => {
                Some(Snapshot::UsedWords(items))
            }
            else => None,
        }
    }

    /// Stop all refresh tasks.
    pub fn release(self) {
        info!("Releasing live feeds");
    }
}
