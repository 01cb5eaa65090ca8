use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const STARTING_WORD_LENGTH: usize = 5;

/// A starting word that has already been played, or is booked for next week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UsedWord {
    pub word: String, // five uppercase letters
    pub week: i32,
    pub picker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrentWeekState {
    pub week_number: i32,
    pub word: String,
    pub picker: String,
    pub next_picker: String,
}

impl CurrentWeekState {
    /// Week a newly submitted starting word is booked for.
    pub fn upcoming_week(&self) -> i32 {
        self.week_number + 1
    }
}
