use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::EngineError;
use crate::websocket::ConnectionManager;
use game_core::{next_seat, next_seat_from, prize_pool, prize_shares, rank_indices, rank_payout};
use game_persistence::entities::players;
use game_persistence::repositories::{LedgerRepository, PlayerRepository, RoomRepository};
use game_types::{
    PlayerStatus, RoomSnapshot, RoomStatus, ServerMessage, TurnOutcome, TurnRequest,
};
use game_types::{GameStatus, UserId};

/// Per-room mutual exclusion. Every state transition for a room (join,
/// turn, resignation, timeout, settlement) runs inside its lock; calls
/// touching different rooms proceed fully in parallel.
#[derive(Default)]
pub struct RoomLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub async fn acquire(&self, room_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

/// The room turn engine: applies completed turns, reacts to resignations
/// and timeouts, and settles the room when rotation runs dry.
pub struct GameManager {
    rooms: RoomRepository,
    players: PlayerRepository,
    ledger: LedgerRepository,
    notifier: Arc<ConnectionManager>,
    locks: Arc<RoomLocks>,
    config: Config,
}

impl GameManager {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<ConnectionManager>,
        locks: Arc<RoomLocks>,
        config: Config,
    ) -> Self {
        Self {
            rooms: RoomRepository::new(db.clone()),
            players: PlayerRepository::new(db.clone()),
            ledger: LedgerRepository::new(db),
            notifier,
            locks,
            config,
        }
    }

    /// Applies a completed turn for `user_id` in `room_id`.
    ///
    /// `GameEnded` is a normal terminating outcome: rotation found nobody
    /// left to play and the room has been settled.
    pub async fn apply_turn(
        &self,
        user_id: UserId,
        room_id: Uuid,
        turn: TurnRequest,
    ) -> Result<TurnOutcome, EngineError> {
        let _guard = self.locks.acquire(room_id).await;

        let room = self
            .rooms
            .find_by_id(room_id)
            .await?
            .filter(|r| r.status == RoomStatus::Active.as_str())
            .ok_or(EngineError::RoomNotFound)?;

        let seats = self.players.list_non_resigned(room_id).await?;
        if seats.is_empty() {
            return Err(EngineError::PlayerNotFound);
        }

        let current = seats
            .iter()
            .position(|p| {
                p.user_id == user_id && p.status == PlayerStatus::Playing.as_str()
            })
            .ok_or(EngineError::NotYourTurn)?;

        // The board payload is opaque; persist whatever the client sent.
        if let Some(board) = turn.board {
            self.rooms.set_board(room_id, board).await?;
        }

        let acting = &seats[current];
        self.players
            .complete_turn(acting.id, acting.score + turn.score, turn.time)
            .await?;

        if turn.score > 0 {
            self.players
                .record_score(acting, &turn.found_word, turn.score, turn.time)
                .await?;
        }

        let statuses = seat_statuses(&seats)?;
        match next_seat(current, &statuses) {
            Some(idx) => {
                self.promote_and_broadcast(room_id, &seats[idx]).await?;
                Ok(TurnOutcome::NextTurn)
            }
            None => {
                info!("Rotation exhausted for room {}, settling", room.id);
                self.settle_room(room_id).await?;
                Ok(TurnOutcome::GameEnded)
            }
        }
    }

    /// Resignation is terminal and idempotent; the forfeited score is the
    /// `-1` sentinel. If the resigner held the turn, rotation continues as
    /// if that turn had just ended.
    pub async fn resign(&self, user_id: UserId, room_id: Uuid) -> Result<(), EngineError> {
        let _guard = self.locks.acquire(room_id).await;

        let room = self
            .rooms
            .find_by_id(room_id)
            .await?
            .ok_or(EngineError::RoomNotFound)?;

        let player = self
            .players
            .find_by_user_and_room(user_id, room_id)
            .await?
            .ok_or(EngineError::PlayerNotFound)?;

        if room.status == RoomStatus::Expired.as_str()
            || player.status == PlayerStatus::Resigned.as_str()
            || player.status == PlayerStatus::TimeUp.as_str()
        {
            return Ok(());
        }

        let held_turn = player.status == PlayerStatus::Playing.as_str();
        self.players.mark_resigned(player.id).await?;
        info!("Player {} resigned from room {}", user_id, room_id);

        self.after_departure(room_id, &player, held_turn).await
    }

    /// A caller-observed timeout. The engine never schedules timeouts
    /// itself; it only reacts. Idempotent once the seat is terminal.
    pub async fn time_up(&self, user_id: UserId, room_id: Uuid) -> Result<(), EngineError> {
        let _guard = self.locks.acquire(room_id).await;

        let room = self
            .rooms
            .find_by_id(room_id)
            .await?
            .ok_or(EngineError::RoomNotFound)?;

        let player = self
            .players
            .find_by_user_and_room(user_id, room_id)
            .await?
            .ok_or(EngineError::PlayerNotFound)?;

        if room.status == RoomStatus::Expired.as_str()
            || player.status == PlayerStatus::TimeUp.as_str()
            || player.status == PlayerStatus::Resigned.as_str()
        {
            return Ok(());
        }

        let held_turn = player.status == PlayerStatus::Playing.as_str();
        self.players
            .set_status(player.id, PlayerStatus::TimeUp)
            .await?;
        info!("Player {} out of time in room {}", user_id, room_id);

        let unfinished = self.players.count_unfinished(room_id).await?;
        if unfinished > 0 {
            self.after_departure(room_id, &player, held_turn).await
        } else {
            self.settle_room(room_id).await
        }
    }

    /// Current room snapshot, for the read/resume path.
    pub async fn snapshot(&self, room_id: Uuid) -> Result<RoomSnapshot, EngineError> {
        self.rooms
            .load_snapshot(room_id)
            .await?
            .ok_or(EngineError::RoomNotFound)
    }

    pub async fn ledger_balance(&self, user_id: UserId) -> Result<i64, EngineError> {
        Ok(self.ledger.balance(user_id).await?)
    }

    /// Shared tail of resignation and timeout. Runs under the caller's
    /// room lock.
    async fn after_departure(
        &self,
        room_id: Uuid,
        departed: &players::Model,
        held_turn: bool,
    ) -> Result<(), EngineError> {
        let remaining = self.players.list_non_resigned(room_id).await?;

        if remaining.len() <= 1 {
            return self.settle_room(room_id).await;
        }

        if !held_turn {
            // The current turn holder is undisturbed.
            return Ok(());
        }

        // Pick up the scan at the departed seat's successor. A resigned
        // holder has dropped out of the list, so the scan is inclusive of
        // the seat now occupying that position.
        let start = remaining
            .iter()
            .position(|p| p.seat > departed.seat)
            .unwrap_or(0);
        let statuses = seat_statuses(&remaining)?;

        match next_seat_from(start, &statuses) {
            Some(idx) => self.promote_and_broadcast(room_id, &remaining[idx]).await,
            None => self.settle_room(room_id).await,
        }
    }

    async fn promote_and_broadcast(
        &self,
        room_id: Uuid,
        next: &players::Model,
    ) -> Result<(), EngineError> {
        self.players
            .set_status(next.id, PlayerStatus::Playing)
            .await?;

        let snapshot = self.snapshot(room_id).await?;
        for seated in &snapshot.players {
            self.notifier
                .notify_user(
                    seated.user_id,
                    ServerMessage::BoardUpdate {
                        room: snapshot.clone(),
                    },
                )
                .await;
        }

        self.notifier.notify_user_later(
            next.user_id,
            ServerMessage::PlayGame {
                room: snapshot.clone(),
            },
            Duration::from_millis(self.config.play_notice_delay_ms),
        );

        Ok(())
    }

    /// Distributes the prize pool, expires the game and room, and fans out
    /// `endGame`. Must run under the room lock; the status check-and-set
    /// makes a second invocation a no-op, so racing terminating triggers
    /// cannot pay out twice.
    async fn settle_room(&self, room_id: Uuid) -> Result<(), EngineError> {
        let room = self
            .rooms
            .find_by_id(room_id)
            .await?
            .ok_or(EngineError::RoomNotFound)?;

        if room.status == RoomStatus::Expired.as_str() {
            return Ok(());
        }

        let total_seats = self.players.count_by_room(room_id).await?;
        if total_seats >= 2 {
            // The pool was fixed when the seats were paid for; resignations
            // do not shrink it.
            let pool = prize_pool(total_seats as i64, room.entry_points as i64);
            let shares = prize_shares(total_seats as usize);

            let ranked = self.players.list_non_resigned(room_id).await?;
            let order = rank_indices(&ranked, |p| p.score);

            for (rank, &idx) in order.iter().enumerate() {
                let payout = rank_payout(pool, shares, rank);
                if payout <= 0 {
                    continue;
                }

                let winner = &ranked[idx];
                self.players.award_prize(winner.id, payout as i32).await?;
                self.ledger
                    .record_credit(
                        winner.user_id,
                        Some(room_id),
                        &format!("Win a game at position {}", rank + 1),
                        payout as i32,
                    )
                    .await?;
            }
        }

        self.rooms
            .set_game_status(room.game_id, GameStatus::Expired)
            .await?;
        self.rooms
            .set_room_status(room_id, RoomStatus::Expired)
            .await?;
        info!("Room {} settled and expired", room_id);

        let snapshot = self.snapshot(room_id).await?;
        for seated in &snapshot.players {
            self.notifier
                .notify_user(
                    seated.user_id,
                    ServerMessage::EndGame {
                        room: snapshot.clone(),
                    },
                )
                .await;
        }

        Ok(())
    }
}

fn seat_statuses(seats: &[players::Model]) -> Result<Vec<PlayerStatus>, EngineError> {
    seats
        .iter()
        .map(|p| {
            PlayerStatus::parse(&p.status)
                .ok_or_else(|| anyhow::anyhow!("unknown player status: {}", p.status).into())
        })
        .collect()
}
