pub mod prelude;

pub mod players;
pub mod scores;
pub mod used_words;
pub mod weekly_standings;
