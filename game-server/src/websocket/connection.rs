use game_types::ServerMessage;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub user_id: Option<Uuid>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();

        let connection = Self {
            id,
            user_id: None,
            connected_at: now,
            last_activity: now,
            sender,
        };

        (connection, receiver)
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_inactive(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Process-wide registry of live connections plus the user → connection
/// mapping used for push delivery. A user holds at most one live mapping;
/// a reconnect replaces the old one. Push delivery is best effort: a user
/// without a live connection simply receives nothing, and clients recover
/// state through the join/resume path.
pub struct ConnectionManager {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    user_to_connection: RwLock<HashMap<Uuid, ConnectionId>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            user_to_connection: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_connection(
        &self,
        id: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (conn, receiver) = Connection::new(id);

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, conn);
        }

        receiver
    }

    pub async fn remove_connection(&self, id: ConnectionId) {
        let user_id = {
            let mut connections = self.connections.write().await;
            connections.remove(&id).and_then(|conn| conn.user_id)
        };

        // Drop the user mapping only if it still points at this connection;
        // a reconnect may already have claimed it.
        if let Some(user_id) = user_id {
            let mut user_to_connection = self.user_to_connection.write().await;
            if user_to_connection.get(&user_id) == Some(&id) {
                user_to_connection.remove(&user_id);
            }
        }
    }

    pub async fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        let connections = self.connections.read().await;
        connections.get(&id).cloned()
    }

    /// Binds a connection to a user, replacing any prior mapping for that
    /// user (reconnect-wins).
    pub async fn register(&self, id: ConnectionId, user_id: Uuid) -> Result<(), String> {
        {
            let mut connections = self.connections.write().await;
            let connection = connections.get_mut(&id).ok_or("Connection not found")?;
            connection.user_id = Some(user_id);
            connection.update_activity();
        }

        let mut user_to_connection = self.user_to_connection.write().await;
        user_to_connection.insert(user_id, id);
        Ok(())
    }

    pub async fn is_registered(&self, user_id: Uuid) -> bool {
        let user_to_connection = self.user_to_connection.read().await;
        user_to_connection.contains_key(&user_id)
    }

    pub async fn update_activity(&self, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.update_activity();
        }
    }

    pub async fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connections = self.connections.read().await;
        if let Some(connection) = connections.get(&id) {
            connection.send_message(message)
        } else {
            Err("Connection not found".to_string())
        }
    }

    /// Pushes an event to the user's live connection, if any. Absent or
    /// failed deliveries are logged and swallowed: real-time push never
    /// rolls back the state change that produced it.
    pub async fn notify_user(&self, user_id: Uuid, message: ServerMessage) {
        let connection_id = {
            let user_to_connection = self.user_to_connection.read().await;
            user_to_connection.get(&user_id).copied()
        };

        match connection_id {
            Some(connection_id) => {
                if let Err(e) = self.send_to_connection(connection_id, message).await {
                    tracing::debug!("Dropped notification for user {}: {}", user_id, e);
                }
            }
            None => {
                tracing::debug!("No live connection for user {}, notification dropped", user_id);
            }
        }
    }

    /// Schedules a push after `delay`. The timer fires independently of any
    /// later state change; a stale notice only nudges client UI.
    pub fn notify_user_later(
        self: &Arc<Self>,
        user_id: Uuid,
        message: ServerMessage,
        delay: Duration,
    ) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.notify_user(user_id, message).await;
        });
    }

    pub async fn cleanup_inactive_connections(&self, timeout: Duration) {
        let inactive_connections: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .filter(|conn| conn.is_inactive(timeout))
                .map(|conn| conn.id)
                .collect()
        };

        for connection_id in inactive_connections {
            tracing::info!("Removing inactive connection: {}", connection_id);
            self.remove_connection(connection_id).await;
        }
    }

    // Test helper methods
    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }

    pub async fn user_connection_count(&self) -> usize {
        let user_connections = self.user_to_connection.read().await;
        user_connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
