use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub type PlayerId = Uuid;

/// Turn status of a seated player. `Resigned` and `TimeUp` are terminal:
/// once reached, the seat never re-enters rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlayerStatus {
    Waiting,
    Playing,
    Resigned,
    TimeUp,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Waiting => "waiting",
            PlayerStatus::Playing => "playing",
            PlayerStatus::Resigned => "resigned",
            PlayerStatus::TimeUp => "time_up",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(PlayerStatus::Waiting),
            "playing" => Some(PlayerStatus::Playing),
            "resigned" => Some(PlayerStatus::Resigned),
            "time_up" => Some(PlayerStatus::TimeUp),
            _ => None,
        }
    }

    /// Whether this seat can still take part in rotation.
    pub fn is_active(&self) -> bool {
        matches!(self, PlayerStatus::Waiting | PlayerStatus::Playing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeatedPlayer {
    pub id: PlayerId,
    pub user_id: Uuid,
    /// Join-order position, fixed at seat time and never reshuffled.
    pub seat: i32,
    pub status: PlayerStatus,
    pub score: i32,
    pub game_points: i32,
    pub remaining_time: Option<i32>,
    pub joined_at: String, // ISO 8601 string
}
