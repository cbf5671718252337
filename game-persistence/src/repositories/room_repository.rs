use anyhow::{Result, anyhow};
use chrono::Duration;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{games, players, prelude::*, rooms};
use game_types::{GameStatus, GameView, RoomSnapshot, RoomStatus, RoomView, RoomVisibility};

pub struct RoomRepository {
    db: DatabaseConnection,
}

impl RoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn room_to_view(model: &rooms::Model) -> Result<RoomView> {
        Ok(RoomView {
            id: model.id,
            room_code: model.room_code.clone(),
            is_full: model.is_full,
            visibility: RoomVisibility::parse(&model.visibility)
                .ok_or_else(|| anyhow!("unknown room visibility: {}", model.visibility))?,
            status: RoomStatus::parse(&model.status)
                .ok_or_else(|| anyhow!("unknown room status: {}", model.status))?,
            entry_points: model.entry_points,
            board: model.board.clone(),
            game_id: model.game_id,
            created_by: model.created_by,
            created_at: model.created_at.to_rfc3339(),
        })
    }

    pub fn game_to_view(model: &games::Model) -> Result<GameView> {
        Ok(GameView {
            id: model.id,
            status: GameStatus::parse(&model.status)
                .ok_or_else(|| anyhow!("unknown game status: {}", model.status))?,
            start_time: model.start_time.map(|t| t.to_rfc3339()),
            end_time: model.end_time.map(|t| t.to_rfc3339()),
            created_by: model.created_by,
            created_at: model.created_at.to_rfc3339(),
        })
    }

    /// Creates the 1:1 Game+Room pair for a fresh room, both `waiting`.
    pub async fn create_with_game(
        &self,
        created_by: Uuid,
        room_code: String,
        entry_points: i32,
        visibility: RoomVisibility,
    ) -> Result<rooms::Model> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let game = games::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            status: ActiveValue::Set(GameStatus::Waiting.as_str().to_string()),
            start_time: ActiveValue::Set(None),
            end_time: ActiveValue::Set(None),
            created_by: ActiveValue::Set(created_by),
            is_deleted: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.db)
        .await?;

        let room = rooms::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            room_code: ActiveValue::Set(room_code),
            is_full: ActiveValue::Set(false),
            visibility: ActiveValue::Set(visibility.as_str().to_string()),
            status: ActiveValue::Set(RoomStatus::Waiting.as_str().to_string()),
            entry_points: ActiveValue::Set(entry_points),
            board: ActiveValue::Set(None),
            game_id: ActiveValue::Set(game.id),
            created_by: ActiveValue::Set(created_by),
            is_deleted: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(room)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<rooms::Model>> {
        let room = Rooms::find_by_id(id)
            .filter(rooms::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(room)
    }

    pub async fn find_by_code(&self, room_code: &str) -> Result<Option<rooms::Model>> {
        let room = Rooms::find()
            .filter(rooms::Column::RoomCode.eq(room_code))
            .filter(rooms::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(room)
    }

    pub async fn code_exists(&self, room_code: &str) -> Result<bool> {
        let count = Rooms::find()
            .filter(rooms::Column::RoomCode.eq(room_code))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Oldest public room with open seats, for the no-code join path.
    pub async fn find_oldest_open_public(&self) -> Result<Option<rooms::Model>> {
        let room = Rooms::find()
            .filter(rooms::Column::IsFull.eq(false))
            .filter(rooms::Column::Visibility.eq(RoomVisibility::Public.as_str()))
            .filter(rooms::Column::Status.ne(RoomStatus::Expired.as_str()))
            .filter(rooms::Column::IsDeleted.eq(false))
            .order_by_asc(rooms::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(room)
    }

    pub async fn mark_full(&self, room_id: Uuid) -> Result<()> {
        rooms::ActiveModel {
            id: ActiveValue::Unchanged(room_id),
            is_full: ActiveValue::Set(true),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    pub async fn set_board(&self, room_id: Uuid, board: serde_json::Value) -> Result<()> {
        rooms::ActiveModel {
            id: ActiveValue::Unchanged(room_id),
            board: ActiveValue::Set(Some(board)),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    pub async fn set_room_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()> {
        rooms::ActiveModel {
            id: ActiveValue::Unchanged(room_id),
            status: ActiveValue::Set(status.as_str().to_string()),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    pub async fn find_game(&self, game_id: Uuid) -> Result<Option<games::Model>> {
        let game = Games::find_by_id(game_id)
            .filter(games::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(game)
    }

    /// Flips the game to `active` and stamps the round window.
    pub async fn activate_game(&self, game_id: Uuid, round: Duration) -> Result<games::Model> {
        let now = chrono::Utc::now();
        let game = games::ActiveModel {
            id: ActiveValue::Unchanged(game_id),
            status: ActiveValue::Set(GameStatus::Active.as_str().to_string()),
            start_time: ActiveValue::Set(Some(now.into())),
            end_time: ActiveValue::Set(Some((now + round).into())),
            updated_at: ActiveValue::Set(now.into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(game)
    }

    pub async fn set_game_status(&self, game_id: Uuid, status: GameStatus) -> Result<()> {
        games::ActiveModel {
            id: ActiveValue::Unchanged(game_id),
            status: ActiveValue::Set(status.as_str().to_string()),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    /// Full room snapshot in seat order, as pushed to clients.
    pub async fn load_snapshot(&self, room_id: Uuid) -> Result<Option<RoomSnapshot>> {
        let room = match self.find_by_id(room_id).await? {
            Some(room) => room,
            None => return Ok(None),
        };

        let game = self
            .find_game(room.game_id)
            .await?
            .ok_or_else(|| anyhow!("room {} has no game row", room_id))?;

        let players = Players::find()
            .filter(players::Column::RoomId.eq(room_id))
            .order_by_asc(players::Column::Seat)
            .all(&self.db)
            .await?;

        let players = players
            .iter()
            .map(super::player_repository::PlayerRepository::player_to_seated)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(RoomSnapshot {
            room: Self::room_to_view(&room)?,
            game: Self::game_to_view(&game)?,
            players,
        }))
    }
}
