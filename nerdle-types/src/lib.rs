pub mod errors;
pub mod messages;
pub mod player;
pub mod score;
pub mod view;
pub mod week;

// Re-export all types
pub use errors::*;
pub use messages::*;
pub use player::*;
pub use score::*;
pub use view::*;
pub use week::*;
