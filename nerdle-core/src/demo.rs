//! Sample league used by the in-memory store and `SEED_DEMO_DATA`.

use nerdle_types::{CurrentWeekState, Player, ScoreValue, UsedWord, WeeklyStanding};

pub const DEMO_WEEK: i32 = 12;

pub fn demo_week() -> CurrentWeekState {
    CurrentWeekState {
        week_number: DEMO_WEEK,
        word: "CRANE".to_string(),
        picker: "Sarah".to_string(),
        next_picker: "Tom".to_string(),
    }
}

pub fn demo_players() -> Vec<Player> {
    ["Emma", "Mike", "Sarah", "Tom"]
        .iter()
        .enumerate()
        .map(|(i, name)| Player::new(format!("player-{}", i + 1), *name))
        .collect()
}

pub fn demo_standings() -> Vec<WeeklyStanding> {
    vec![
        WeeklyStanding {
            name: "Emma".to_string(),
            total_score: 18,
            avg: 3.2,
            streak: 5,
        },
        WeeklyStanding {
            name: "Mike".to_string(),
            total_score: 20,
            avg: 3.5,
            streak: 3,
        },
        WeeklyStanding {
            name: "Sarah".to_string(),
            total_score: 22,
            avg: 3.8,
            streak: 6,
        },
    ]
}

pub fn demo_used_words() -> Vec<UsedWord> {
    [("CRANE", 12, "Sarah"), ("SLATE", 11, "Mike"), ("AUDIO", 10, "Emma")]
        .iter()
        .map(|(word, week, picker)| UsedWord {
            word: word.to_string(),
            week: *week,
            picker: picker.to_string(),
        })
        .collect()
}

/// Scores already in for today when the demo starts.
pub fn demo_today_scores() -> Vec<(String, ScoreValue)> {
    vec![
        ("Emma".to_string(), ScoreValue::Two),
        ("Mike".to_string(), ScoreValue::Three),
    ]
}
