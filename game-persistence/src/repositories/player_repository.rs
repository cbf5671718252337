use anyhow::{Result, anyhow};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{player_scores, players, prelude::*};
use game_types::{PlayerStatus, SeatedPlayer};

pub struct PlayerRepository {
    db: DatabaseConnection,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn player_to_seated(model: &players::Model) -> Result<SeatedPlayer> {
        Ok(SeatedPlayer {
            id: model.id,
            user_id: model.user_id,
            seat: model.seat,
            status: PlayerStatus::parse(&model.status)
                .ok_or_else(|| anyhow!("unknown player status: {}", model.status))?,
            score: model.score,
            game_points: model.game_points,
            remaining_time: model.remaining_time,
            joined_at: model.created_at.to_rfc3339(),
        })
    }

    /// Seats a user into a room. The seat index is the join order and is
    /// never reassigned.
    pub async fn seat_player(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        game_id: Uuid,
        seat: i32,
    ) -> Result<players::Model> {
        let player = players::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            room_id: ActiveValue::Set(room_id),
            game_id: ActiveValue::Set(game_id),
            seat: ActiveValue::Set(seat),
            status: ActiveValue::Set(PlayerStatus::Waiting.as_str().to_string()),
            score: ActiveValue::Set(0),
            game_points: ActiveValue::Set(0),
            remaining_time: ActiveValue::Set(None),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        Ok(player)
    }

    pub async fn find_by_user_and_room(
        &self,
        user_id: Uuid,
        room_id: Uuid,
    ) -> Result<Option<players::Model>> {
        let player = Players::find()
            .filter(players::Column::UserId.eq(user_id))
            .filter(players::Column::RoomId.eq(room_id))
            .one(&self.db)
            .await?;
        Ok(player)
    }

    pub async fn list_by_room(&self, room_id: Uuid) -> Result<Vec<players::Model>> {
        let players = Players::find()
            .filter(players::Column::RoomId.eq(room_id))
            .order_by_asc(players::Column::Seat)
            .all(&self.db)
            .await?;
        Ok(players)
    }

    /// Seat-ordered players still part of rotation bookkeeping. Resigned
    /// seats are excluded entirely; `time_up` seats stay in the list so
    /// indexes line up with what the turn holder last saw.
    pub async fn list_non_resigned(&self, room_id: Uuid) -> Result<Vec<players::Model>> {
        let players = Players::find()
            .filter(players::Column::RoomId.eq(room_id))
            .filter(players::Column::Status.ne(PlayerStatus::Resigned.as_str()))
            .order_by_asc(players::Column::Seat)
            .all(&self.db)
            .await?;
        Ok(players)
    }

    /// Players that have neither resigned nor run out of time.
    pub async fn count_unfinished(&self, room_id: Uuid) -> Result<u64> {
        let count = Players::find()
            .filter(players::Column::RoomId.eq(room_id))
            .filter(players::Column::Status.is_not_in([
                PlayerStatus::Resigned.as_str(),
                PlayerStatus::TimeUp.as_str(),
            ]))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn count_by_room(&self, room_id: Uuid) -> Result<u64> {
        let count = Players::find()
            .filter(players::Column::RoomId.eq(room_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn set_status(&self, player_id: Uuid, status: PlayerStatus) -> Result<()> {
        players::ActiveModel {
            id: ActiveValue::Unchanged(player_id),
            status: ActiveValue::Set(status.as_str().to_string()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    /// Completed-turn bookkeeping: back to `waiting`, score accumulated,
    /// remaining time recorded when the client reported one.
    pub async fn complete_turn(
        &self,
        player_id: Uuid,
        new_score: i32,
        remaining_time: Option<i32>,
    ) -> Result<()> {
        let mut player = players::ActiveModel {
            id: ActiveValue::Unchanged(player_id),
            status: ActiveValue::Set(PlayerStatus::Waiting.as_str().to_string()),
            score: ActiveValue::Set(new_score),
            ..Default::default()
        };
        if let Some(time) = remaining_time {
            player.remaining_time = ActiveValue::Set(Some(time));
        }
        player.update(&self.db).await?;
        Ok(())
    }

    /// Resignation forfeits the score: the `-1` sentinel distinguishes a
    /// quit from a legitimate zero.
    pub async fn mark_resigned(&self, player_id: Uuid) -> Result<()> {
        players::ActiveModel {
            id: ActiveValue::Unchanged(player_id),
            status: ActiveValue::Set(PlayerStatus::Resigned.as_str().to_string()),
            score: ActiveValue::Set(-1),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    pub async fn award_prize(&self, player_id: Uuid, points: i32) -> Result<()> {
        players::ActiveModel {
            id: ActiveValue::Unchanged(player_id),
            game_points: ActiveValue::Set(points),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    /// Append-only record of an accepted scoring turn.
    pub async fn record_score(
        &self,
        player: &players::Model,
        found_word: &str,
        score: i32,
        turn_time: Option<i32>,
    ) -> Result<()> {
        player_scores::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            player_id: ActiveValue::Set(player.id),
            user_id: ActiveValue::Set(player.user_id),
            room_id: ActiveValue::Set(player.room_id),
            game_id: ActiveValue::Set(player.game_id),
            found_word: ActiveValue::Set(found_word.to_string()),
            score: ActiveValue::Set(score),
            turn_time: ActiveValue::Set(turn_time),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    pub async fn scores_for_room(&self, room_id: Uuid) -> Result<Vec<player_scores::Model>> {
        let scores = PlayerScores::find()
            .filter(player_scores::Column::RoomId.eq(room_id))
            .order_by_asc(player_scores::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(scores)
    }
}
