pub mod games;
pub mod player_scores;
pub mod players;
pub mod points_log;
pub mod rooms;

pub mod prelude {
    pub use super::games::Entity as Games;
    pub use super::player_scores::Entity as PlayerScores;
    pub use super::players::Entity as Players;
    pub use super::points_log::Entity as PointsLog;
    pub use super::rooms::Entity as Rooms;
}
