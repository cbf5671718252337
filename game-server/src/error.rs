use thiserror::Error;
use warp::http::StatusCode;

/// Typed failures surfaced to callers. Storage errors pass through
/// unchanged; the engine never retries a write that moves turn ownership,
/// since a retry after a partial failure could advance the turn twice.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid Room Code or Room is Full")]
    InvalidRoomCode,
    #[error("Not your turn!")]
    NotYourTurn,
    #[error("Player Not Found")]
    PlayerNotFound,
    #[error("Room Not Found")]
    RoomNotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidRoomCode => StatusCode::BAD_REQUEST,
            EngineError::NotYourTurn => StatusCode::CONFLICT,
            EngineError::PlayerNotFound | EngineError::RoomNotFound => StatusCode::NOT_FOUND,
            EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
