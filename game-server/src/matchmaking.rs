use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::EngineError;
use crate::game_manager::RoomLocks;
use crate::websocket::ConnectionManager;
use game_core::generate_room_code;
use game_persistence::entities::rooms;
use game_persistence::repositories::{LedgerRepository, PlayerRepository, RoomRepository};
use game_types::{PlayerStatus, RoomSnapshot, RoomStatus, RoomVisibility, ServerMessage, UserId};

/// Seats users into rooms: code lookups, the public open queue, room
/// creation, and the room-full transition that starts the game.
pub struct Matchmaker {
    rooms: RoomRepository,
    players: PlayerRepository,
    ledger: LedgerRepository,
    notifier: Arc<ConnectionManager>,
    locks: Arc<RoomLocks>,
    config: Config,
}

impl Matchmaker {
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

    /// Joins `user_id` into a room. With a code, only that exact room is
    /// considered and a full (or settled) room is an `InvalidRoomCode`.
    /// Without one, the oldest open public room wins, or a fresh Game+Room
    /// pair is created.
    pub async fn join_room(
        &self,
        user_id: UserId,
        room_code: Option<&str>,
    ) -> Result<RoomSnapshot, EngineError> {
        // Resolve, lock, then revalidate: an open room can fill between
        // resolution and lock acquisition.
        let (room, _guard) = loop {
            let candidate = match room_code {
                Some(code) => self
                    .rooms
                    .find_by_code(code)
                    .await?
                    .ok_or(EngineError::InvalidRoomCode)?,
                None => match self.rooms.find_oldest_open_public().await? {
                    Some(room) => room,
                    None => self.create_room(user_id).await?,
                },
            };

            let guard = self.locks.acquire(candidate.id).await;
            let fresh = self
                .rooms
                .find_by_id(candidate.id)
                .await?
                .ok_or(EngineError::RoomNotFound)?;

            if fresh.is_full || fresh.status == RoomStatus::Expired.as_str() {
                if room_code.is_some() {
                    return Err(EngineError::InvalidRoomCode);
                }
                // Raced against another join; go pick or create another room.
                continue;
            }

            break (fresh, guard);
        };

        // A seat already held in the resolved room is a resume, not an
        // error: re-emit the current state to cover reconnects.
        if let Some(existing) = self
            .players
            .find_by_user_and_room(user_id, room.id)
            .await?
        {
            let snapshot = self
                .rooms
                .load_snapshot(room.id)
                .await?
                .ok_or(EngineError::RoomNotFound)?;

            self.notifier
                .notify_user(
                    user_id,
                    ServerMessage::StartGame {
                        room: snapshot.clone(),
                    },
                )
                .await;
            if existing.status == PlayerStatus::Playing.as_str() {
                self.notifier.notify_user_later(
                    user_id,
                    ServerMessage::PlayGame {
                        room: snapshot.clone(),
                    },
                    Duration::from_millis(self.config.play_notice_delay_ms),
                );
            }

            info!("User {} resumed room {}", user_id, room.id);
            return Ok(snapshot);
        }

        let seat = self.players.count_by_room(room.id).await? as i32;
        self.players
            .seat_player(user_id, room.id, room.game_id, seat)
            .await?;
        self.ledger
            .record_debit(user_id, Some(room.id), "Join a Game", room.entry_points)
            .await?;
        info!("User {} seated in room {} at seat {}", user_id, room.id, seat);

        let seated = self.players.list_by_room(room.id).await?;
        if seated.len() >= self.config.seats_per_room {
            self.start_game(&room, &seated).await?;
        }

        self.rooms
            .load_snapshot(room.id)
            .await?
            .ok_or(EngineError::RoomNotFound)
    }

    /// The room-full transition, exactly once per room: flag the room,
    /// activate the game with its round window, hand the first seat the
    /// turn, and fan out `startGame`.
    async fn start_game(
        &self,
        room: &rooms::Model,
        seated: &[game_persistence::entities::players::Model],
    ) -> Result<(), EngineError> {
        self.rooms.mark_full(room.id).await?;
        self.rooms
            .activate_game(room.game_id, chrono::Duration::minutes(self.config.round_minutes))
            .await?;
        self.rooms
            .set_room_status(room.id, RoomStatus::Active)
            .await?;

        let first = &seated[0];
        self.players
            .set_status(first.id, PlayerStatus::Playing)
            .await?;

        let snapshot = self
            .rooms
            .load_snapshot(room.id)
            .await?
            .ok_or(EngineError::RoomNotFound)?;

        for player in &snapshot.players {
            self.notifier
                .notify_user(
                    player.user_id,
                    ServerMessage::StartGame {
                        room: snapshot.clone(),
                    },
                )
                .await;
        }

        // The turn holder gets the play notice after the start transition
        // has had a moment to render client-side.
        self.notifier.notify_user_later(
            first.user_id,
            ServerMessage::PlayGame {
                room: snapshot.clone(),
            },
            Duration::from_millis(self.config.play_notice_delay_ms),
        );

        info!(
            "Room {} is full with {} seats, game {} started",
            room.id,
            seated.len(),
            room.game_id
        );
        Ok(())
    }

    async fn create_room(&self, user_id: Uuid) -> Result<rooms::Model, EngineError> {
        let room_code = self.unique_room_code().await?;
        let room = self
            .rooms
            .create_with_game(
                user_id,
                room_code,
                self.config.entry_points,
                RoomVisibility::Public,
            )
            .await?;
        info!("Created room {} with code {}", room.id, room.room_code);
        Ok(room)
    }

    async fn unique_room_code(&self) -> Result<String, EngineError> {
        loop {
            let code = generate_room_code();
            if !self.rooms.code_exists(&code).await? {
                return Ok(code);
            }
        }
    }
}
