use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::store::{NerdleStore, StoreError, StoreResult};
use crate::submission;
use crate::subscription::{LiveFeeds, Snapshot};
use crate::views::{missing_players, today_rows};
use nerdle_types::{
    CurrentWeekState, Player, STARTING_WORD_LENGTH, ScoreEntry, ScoreValue, SessionView,
    SubmissionError, Tab, UsedWord, WeeklyStanding, WordStatus, WordSubmissionError,
};

pub const DEFAULT_ACK_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_SUBMISSION_DEADLINE: &str = "11:30 PM";
pub const WORD_ACCEPTED_MESSAGE: &str = "Word submitted successfully!";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// How long "submitted" acknowledgements stay up before the form resets.
    pub ack_delay: Duration,
    pub submission_deadline: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ack_delay: DEFAULT_ACK_DELAY,
            submission_deadline: DEFAULT_SUBMISSION_DEADLINE.to_string(),
        }
    }
}

/// One player's view of the league: mirrored collections plus form state.
///
/// The mirrored lists are replaced wholesale by each incoming snapshot. A
/// local append after a confirmed write is only a hint and the next snapshot
/// wins over it.
pub struct NerdleSession {
    store: Arc<dyn NerdleStore>,
    settings: SessionSettings,
    current_week: CurrentWeekState,

    players: Vec<Player>,
    today_scores: Vec<ScoreEntry>,
    weekly_standings: Vec<WeeklyStanding>,
    used_words: Vec<UsedWord>,
    loading: bool,

    active_tab: Tab,
    selected_player: Option<String>,
    selected_score: Option<ScoreValue>,
    submitted_until: Option<Instant>,

    show_word_submit: bool,
    word_input: String,
    word_status: Option<WordStatus>,
    word_status_until: Option<Instant>,
}

impl NerdleSession {
    pub fn new(
        store: Arc<dyn NerdleStore>,
        settings: SessionSettings,
        current_week: CurrentWeekState,
    ) -> Self {
        Self {
            store,
            settings,
            current_week,
            players: Vec::new(),
            today_scores: Vec::new(),
            weekly_standings: Vec::new(),
            used_words: Vec::new(),
            loading: true,
            active_tab: Tab::default(),
            selected_player: None,
            selected_score: None,
            submitted_until: None,
            show_word_submit: false,
            word_input: String::new(),
            word_status: None,
            word_status_until: None,
        }
    }

    /// Start a session and subscribe to the store. The caller drives the
    /// returned feeds and hands each snapshot to `apply_snapshot`.
    pub async fn open(
        store: Arc<dyn NerdleStore>,
        settings: SessionSettings,
    ) -> Result<(Self, LiveFeeds), StoreError> {
        let current_week = store.current_week().await?;
        info!(
            "Opening session for week {} (word {})",
            current_week.week_number, current_week.word
        );

        let feeds = LiveFeeds::subscribe(store.clone(), current_week.week_number);
        Ok((Self::new(store, settings, current_week), feeds))
    }

    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        // Any delivered feed means the league is reachable
        self.loading = false;

        match snapshot {
            Snapshot::Players(players) => {
                debug!("Players snapshot: {} players", players.len());
                self.players = players;
            }
            Snapshot::TodayScores(scores) => {
                debug!("Today's scores snapshot: {} entries", scores.len());
                self.today_scores = scores;
            }
            Snapshot::WeeklyStandings(standings) => {
                self.weekly_standings = standings;
            }
            Snapshot::UsedWords(words) => {
                self.used_words = words;
            }
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// An empty name clears the selection.
    pub fn select_player(&mut self, name: &str) {
        let name = name.trim();
        self.selected_player = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
    }

    pub fn select_score(&mut self, score: ScoreValue) {
        self.selected_score = Some(score);
    }

    pub fn can_submit_score(&self) -> bool {
        self.selected_player.is_some() && self.selected_score.is_some()
    }

    /// Submit the selected score. On success the entry is mirrored locally
    /// and the form resets once the acknowledgement expires. On failure
    /// nothing local changes.
    pub async fn submit_score(&mut self) -> Result<ScoreEntry, SubmissionError> {
        let player = self.selected_player.clone().unwrap_or_default();
        let entry = submission::submit_score(
            self.store.as_ref(),
            &player,
            self.selected_score,
            self.current_week.week_number,
        )
        .await?;

        self.today_scores.push(entry.clone());
        self.submitted_until = Some(Instant::now() + self.settings.ack_delay);
        Ok(entry)
    }

    pub fn toggle_word_panel(&mut self) {
        self.show_word_submit = !self.show_word_submit;
    }

    /// Input is uppercased as typed and capped at the word length.
    pub fn set_word_input(&mut self, text: &str) {
        self.word_input = text
            .to_uppercase()
            .chars()
            .take(STARTING_WORD_LENGTH)
            .collect();
    }

    /// Validate the typed word and book it for next week under the
    /// designated next picker.
    pub async fn submit_word(&mut self) -> Result<UsedWord, WordSubmissionError> {
        let result = match self.refresh_word_context().await {
            Ok(()) => {
                submission::submit_word(
                    self.store.as_ref(),
                    &self.word_input,
                    self.current_week.upcoming_week(),
                    &self.current_week.next_picker,
                    &self.used_words,
                )
                .await
            }
            Err(e) => Err(WordSubmissionError::Submission(e.into())),
        };

        match &result {
            Ok(word) => {
                self.word_status = Some(WordStatus::valid(WORD_ACCEPTED_MESSAGE));
                self.word_input.clear();
                self.used_words.insert(0, word.clone());
                self.word_status_until = Some(Instant::now() + self.settings.ack_delay);
            }
            Err(e) => {
                warn!("Starting word {:?} not accepted: {}", self.word_input, e);
                self.word_status = Some(WordStatus::invalid(e.user_notice()));
                self.word_status_until = None;
            }
        }

        result
    }

    /// Pull the used words and week straight from the store so a word
    /// checked before the feeds deliver is not validated against an empty list.
    async fn refresh_word_context(&mut self) -> StoreResult<()> {
        let used_words = self.store.used_words().await?;
        let current_week = self.store.current_week().await?;

        self.used_words = used_words;
        self.current_week = current_week;
        Ok(())
    }

    /// Earliest pending acknowledgement expiry, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.submitted_until, self.word_status_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Clear acknowledgements that have run their course. Returns true when
    /// anything visible changed.
    pub fn expire_transients(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.submitted_until.is_some_and(|until| until <= now) {
            self.submitted_until = None;
            self.selected_player = None;
            self.selected_score = None;
            changed = true;
        }

        if self.word_status_until.is_some_and(|until| until <= now) {
            self.word_status_until = None;
            self.word_status = None;
            self.show_word_submit = false;
            changed = true;
        }

        changed
    }

    pub fn missing_players(&self) -> Vec<String> {
        missing_players(&self.players, &self.today_scores)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            active_tab: self.active_tab,
            loading: self.loading,
            current_week: self.current_week.clone(),
            players: self.players.clone(),
            selected_player: self.selected_player.clone(),
            selected_score: self.selected_score,
            score_options: ScoreValue::ALL.to_vec(),
            can_submit_score: self.can_submit_score(),
            submitted: self.is_submitted(),
            today_scores: today_rows(&self.today_scores),
            missing_players: self.missing_players(),
            submission_deadline: self.settings.submission_deadline.clone(),
            weekly_standings: self.weekly_standings.clone(),
            used_words: self.used_words.clone(),
            show_word_submit: self.show_word_submit,
            word_input: self.word_input.clone(),
            word_status: self.word_status.clone(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_until.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn current_week(&self) -> &CurrentWeekState {
        &self.current_week
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn today_scores(&self) -> &[ScoreEntry] {
        &self.today_scores
    }

    pub fn weekly_standings(&self) -> &[WeeklyStanding] {
        &self.weekly_standings
    }

    pub fn used_words(&self) -> &[UsedWord] {
        &self.used_words
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.selected_player.as_deref()
    }

    pub fn selected_score(&self) -> Option<ScoreValue> {
        self.selected_score
    }

    pub fn show_word_submit(&self) -> bool {
        self.show_word_submit
    }

    pub fn word_input(&self) -> &str {
        &self.word_input
    }

    pub fn word_status(&self) -> Option<&WordStatus> {
        self.word_status.as_ref()
    }
}
