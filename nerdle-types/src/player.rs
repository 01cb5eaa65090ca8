use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Streak length at which a standing is shown with the fire marker.
pub const HOT_STREAK_WEEKS: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: String,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Aggregated result for one player over the current week.
/// Produced outside the session engine and only ever read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeeklyStanding {
    pub name: String,
    pub total_score: i32,
    pub avg: f64,
    pub streak: i32, // consecutive weeks played
}

impl WeeklyStanding {
    pub fn is_on_fire(&self) -> bool {
        self.streak >= HOT_STREAK_WEEKS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardEntry {
    pub standing: WeeklyStanding,
    pub rank: u32,
    pub on_fire: bool,
}

impl LeaderboardEntry {
    /// Rank standings in the order the store returned them.
    pub fn rank_all(standings: &[WeeklyStanding]) -> Vec<LeaderboardEntry> {
        standings
            .iter()
            .enumerate()
            .map(|(index, standing)| LeaderboardEntry {
                standing: standing.clone(),
                rank: (index + 1) as u32,
                on_fire: standing.is_on_fire(),
            })
            .collect()
    }
}
