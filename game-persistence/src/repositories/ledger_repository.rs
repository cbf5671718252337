use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::{points_log, prelude::*};

/// Append-only double-entry points ledger. A user's balance is the sum of
/// inflows minus the sum of outflows; rows are never updated or deleted.
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn append(
        &self,
        user_id: Uuid,
        room_id: Option<Uuid>,
        description: &str,
        points_in: i32,
        points_out: i32,
    ) -> Result<points_log::Model> {
        let entry = points_log::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            description: ActiveValue::Set(description.to_string()),
            user_id: ActiveValue::Set(user_id),
            room_id: ActiveValue::Set(room_id),
            points_in: ActiveValue::Set(points_in),
            points_out: ActiveValue::Set(points_out),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        Ok(entry)
    }

    /// Outflow entry, e.g. the entry fee debit on joining a room.
    pub async fn record_debit(
        &self,
        user_id: Uuid,
        room_id: Option<Uuid>,
        description: &str,
        amount: i32,
    ) -> Result<points_log::Model> {
        self.append(user_id, room_id, description, 0, amount).await
    }

    /// Inflow entry, e.g. a prize credit at settlement.
    pub async fn record_credit(
        &self,
        user_id: Uuid,
        room_id: Option<Uuid>,
        description: &str,
        amount: i32,
    ) -> Result<points_log::Model> {
        self.append(user_id, room_id, description, amount, 0).await
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<i64> {
        let entries = PointsLog::find()
            .filter(points_log::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(entries
            .iter()
            .map(|e| e.points_in as i64 - e.points_out as i64)
            .sum())
    }

    pub async fn entries_for_room(&self, room_id: Uuid) -> Result<Vec<points_log::Model>> {
        let entries = PointsLog::find()
            .filter(points_log::Column::RoomId.eq(room_id))
            .order_by_asc(points_log::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }
}
