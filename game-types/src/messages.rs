use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::room::RoomSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ClientMessage {
    /// Binds this connection to a user. Identity validation happens upstream;
    /// the engine only needs the stable identifier.
    Authenticate { user_id: Uuid },
    Heartbeat,
}

/// Events pushed to seated clients. Every game event carries the full room
/// snapshot so a client can render from any single message.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ServerMessage {
    AuthenticationSuccess { user_id: Uuid },
    StartGame { room: RoomSnapshot },
    PlayGame { room: RoomSnapshot },
    BoardUpdate { room: RoomSnapshot },
    EndGame { room: RoomSnapshot },
    Error { message: String },
}

/// Result of a successfully applied turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TurnOutcome {
    /// Another seat was promoted; the round continues.
    NextTurn,
    /// Rotation found no next seat; the room has been settled and expired.
    GameEnded,
}

/// Body of the turn endpoint: the score delta and word for the completed
/// turn, plus optional elapsed-time and board payloads.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TurnRequest {
    pub score: i32,
    pub found_word: String,
    pub time: Option<i32>,
    pub board: Option<serde_json::Value>,
}
