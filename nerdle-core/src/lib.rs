pub mod demo;
pub mod memory_store;
pub mod session;
pub mod store;
pub mod submission;
pub mod subscription;
pub mod views;
pub mod word_validation;

// Re-export main components
pub use memory_store::*;
pub use session::*;
pub use store::*;
pub use submission::*;
pub use subscription::*;
pub use views::*;
pub use word_validation::*;
