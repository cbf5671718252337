use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use game_persistence::repositories::{LedgerRepository, PlayerRepository, RoomRepository};
use game_server::config::Config;
use game_server::game_manager::{GameManager, RoomLocks};
use game_server::matchmaking::Matchmaker;
use game_server::websocket::connection::ConnectionId;
use game_server::websocket::ConnectionManager;
use game_types::{PlayerStatus, RoomSnapshot, ServerMessage, TurnRequest};

/// Test setup that provides all necessary components against an in-memory
/// database. The play-notice delay is zero so delayed pushes land fast.
pub struct TestSetup {
    pub db: DatabaseConnection,
    pub connection_manager: Arc<ConnectionManager>,
    pub matchmaker: Arc<Matchmaker>,
    pub game_manager: Arc<GameManager>,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self::with_seats(2).await
    }

    pub async fn with_seats(seats_per_room: usize) -> Self {
        let db = game_persistence::connection::connect_to_memory_database()
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            seats_per_room,
            entry_points: 10,
            round_minutes: 5,
            play_notice_delay_ms: 0,
            connection_timeout_seconds: 300,
        };

        let connection_manager = Arc::new(ConnectionManager::new());
        let locks = Arc::new(RoomLocks::new());
        let matchmaker = Arc::new(Matchmaker::new(
            db.clone(),
            connection_manager.clone(),
            locks.clone(),
            config.clone(),
        ));
        let game_manager = Arc::new(GameManager::new(
            db.clone(),
            connection_manager.clone(),
            locks,
            config,
        ));

        Self {
            db,
            connection_manager,
            matchmaker,
            game_manager,
        }
    }

    pub fn rooms(&self) -> RoomRepository {
        RoomRepository::new(self.db.clone())
    }

    pub fn players(&self) -> PlayerRepository {
        PlayerRepository::new(self.db.clone())
    }

    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.db.clone())
    }

    /// Opens a live connection bound to `user_id` and returns the stream of
    /// pushed server events.
    pub async fn connect_user(&self, user_id: Uuid) -> UnboundedReceiver<ServerMessage> {
        let connection_id = ConnectionId::new();
        let receiver = self
            .connection_manager
            .create_connection(connection_id)
            .await;
        self.connection_manager
            .register(connection_id, user_id)
            .await
            .unwrap();
        receiver
    }

    /// Seats `count` fresh users through the open queue and returns them in
    /// join order with the final snapshot.
    pub async fn join_users(&self, count: usize) -> (Vec<Uuid>, RoomSnapshot) {
        let users: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
        let mut last = None;
        for user in &users {
            last = Some(self.matchmaker.join_room(*user, None).await.unwrap());
        }
        (users, last.unwrap())
    }
}

pub fn turn(score: i32, found_word: &str) -> TurnRequest {
    TurnRequest {
        score,
        found_word: found_word.to_string(),
        time: None,
        board: None,
    }
}

/// Pulls everything currently queued on a receiver.
pub fn drain_messages(receiver: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}

/// At most one seat holds the turn at any observed instant.
pub fn assert_single_turn_owner(snapshot: &RoomSnapshot) {
    let playing = snapshot
        .players
        .iter()
        .filter(|p| p.status == PlayerStatus::Playing)
        .count();
    assert!(
        playing <= 1,
        "{} seats hold the turn simultaneously",
        playing
    );
}
