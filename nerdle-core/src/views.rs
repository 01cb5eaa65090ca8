use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::collections::HashSet;

use nerdle_types::{ColorTag, Player, ScoreEntry, ScoreValue, TodayScoreRow};

/// Names on the roster with no entry among today's scores.
/// Keeps roster order.
pub fn missing_players(players: &[Player], today: &[ScoreEntry]) -> Vec<String> {
    let submitted: HashSet<&str> = today.iter().map(|entry| entry.player.as_str()).collect();

    players
        .iter()
        .filter(|player| !submitted.contains(player.name.as_str()))
        .map(|player| player.name.clone())
        .collect()
}

pub fn score_color(score: ScoreValue) -> ColorTag {
    match score {
        ScoreValue::One | ScoreValue::Two => ColorTag::Green,
        ScoreValue::Three | ScoreValue::Four => ColorTag::Yellow,
        ScoreValue::Five | ScoreValue::Six => ColorTag::Orange,
        ScoreValue::Bust => ColorTag::Gray,
    }
}

/// Color for an unchecked score value, falling back to neutral.
pub fn score_color_raw(raw: &str) -> ColorTag {
    raw.parse::<ScoreValue>()
        .map(score_color)
        .unwrap_or(ColorTag::Neutral)
}

/// Local wall-clock time of a submission, e.g. "8:32 AM".
pub fn display_time(submitted_at: &str) -> String {
    match DateTime::parse_from_rfc3339(submitted_at) {
        Ok(timestamp) => timestamp
            .with_timezone(&Local)
            .format("%-I:%M %p")
            .to_string(),
        Err(_) => String::new(),
    }
}

pub fn today_rows(entries: &[ScoreEntry]) -> Vec<TodayScoreRow> {
    entries
        .iter()
        .map(|entry| TodayScoreRow {
            entry: entry.clone(),
            color: score_color(entry.score),
            time: display_time(&entry.submitted_at),
        })
        .collect()
}

/// Start of the current local day, the lower bound for "today's" scores.
pub fn today_start() -> DateTime<Utc> {
    local_day_start(Local::now().date_naive())
}

/// Start of the next local day, when "today's" scores roll over.
pub fn next_day_start() -> DateTime<Utc> {
    match Local::now().date_naive().succ_opt() {
        Some(tomorrow) => local_day_start(tomorrow),
        None => Utc::now(),
    }
}

fn local_day_start(day: NaiveDate) -> DateTime<Utc> {
    let Some(midnight) = day.and_hms_opt(0, 0, 0) else {
        return Utc::now();
    };

    // None when a DST jump skips local midnight
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
