pub use super::players::Entity as Players;
pub use super::scores::Entity as Scores;
pub use super::used_words::Entity as UsedWords;
pub use super::weekly_standings::Entity as WeeklyStandings;
