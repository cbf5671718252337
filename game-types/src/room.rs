use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::player::SeatedPlayer;

pub type RoomId = Uuid;
pub type GameId = Uuid;
pub type UserId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoomStatus {
    Waiting, // Seats still open
    Active,  // Full room, game running
    Expired, // Settled, terminal
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Active => "active",
            RoomStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(RoomStatus::Waiting),
            "active" => Some(RoomStatus::Active),
            "expired" => Some(RoomStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoomVisibility {
    Public,   // Joinable from the open queue
    CodeOnly, // Joinable only via its room code
}

impl RoomVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomVisibility::Public => "public",
            RoomVisibility::CodeOnly => "code_only",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(RoomVisibility::Public),
            "code_only" => Some(RoomVisibility::CodeOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GameStatus {
    Waiting,
    Active,
    Expired,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Active => "active",
            GameStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(GameStatus::Waiting),
            "active" => Some(GameStatus::Active),
            "expired" => Some(GameStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomView {
    pub id: RoomId,
    pub room_code: String,
    pub is_full: bool,
    pub visibility: RoomVisibility,
    pub status: RoomStatus,
    pub entry_points: i32,
    /// Opaque board payload; the engine stores and relays it untouched.
    pub board: Option<serde_json::Value>,
    pub game_id: GameId,
    pub created_by: UserId,
    pub created_at: String, // ISO 8601 string
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameView {
    pub id: GameId,
    pub status: GameStatus,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_by: UserId,
    pub created_at: String,
}

/// Full room state pushed to seated clients and returned from the read path.
/// Players are in seat order; connection identifiers are never included.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomSnapshot {
    pub room: RoomView,
    pub game: GameView,
    pub players: Vec<SeatedPlayer>,
}

impl RoomSnapshot {
    /// Seat index of the player currently holding the turn, if any.
    pub fn playing_seat(&self) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.status == crate::player::PlayerStatus::Playing)
    }
}
