use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ColorTag, CurrentWeekState, Player, ScoreEntry, ScoreValue, UsedWord, WeeklyStanding};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Tab {
    #[default]
    Submit,
    Leaderboard,
    Today,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum WordStatusKind {
    Valid,
    Invalid,
}

/// Inline message under the starting-word input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordStatus {
    pub message: String,
    pub kind: WordStatusKind,
}

impl WordStatus {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: WordStatusKind::Valid,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: WordStatusKind::Invalid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TodayScoreRow {
    pub entry: ScoreEntry,
    pub color: ColorTag,
    pub time: String, // local "h:mm AM"
}

/// Everything a client needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionView {
    pub active_tab: Tab,
    pub loading: bool,
    pub current_week: CurrentWeekState,
    pub players: Vec<Player>,
    pub selected_player: Option<String>,
    #[ts(type = "number | string | null")]
    pub selected_score: Option<ScoreValue>,
    /// Choices offered by the score picker, in display order.
    #[ts(type = "Array<number | string>")]
    pub score_options: Vec<ScoreValue>,
    pub can_submit_score: bool,
    pub submitted: bool,
    pub today_scores: Vec<TodayScoreRow>,
    pub missing_players: Vec<String>,
    pub submission_deadline: String,
    pub weekly_standings: Vec<WeeklyStanding>,
    pub used_words: Vec<UsedWord>,
    pub show_word_submit: bool,
    pub word_input: String,
    pub word_status: Option<WordStatus>,
}
