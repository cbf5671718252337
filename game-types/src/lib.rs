pub mod messages;
pub mod player;
pub mod room;

// Re-export all types
pub use messages::*;
pub use player::*;
pub use room::*;
