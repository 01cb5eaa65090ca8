pub mod player_repository;
pub mod score_repository;
pub mod standing_repository;
pub mod word_repository;

pub use player_repository::PlayerRepository;
pub use score_repository::ScoreRepository;
pub use standing_repository::StandingRepository;
pub use word_repository::WordRepository;
