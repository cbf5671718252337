use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;

use crate::error::EngineError;
use crate::game_manager::GameManager;
use crate::matchmaking::Matchmaker;
use crate::websocket::ConnectionManager;
use game_types::TurnRequest;

pub mod config;
pub mod error;
pub mod game_manager;
pub mod matchmaking;
pub mod websocket;

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    matchmaker: Arc<Matchmaker>,
    game_manager: Arc<GameManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let matchmaker_filter = warp::any().map({
        let matchmaker = matchmaker.clone();
        move || matchmaker.clone()
    });

    let game_manager_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    // Identity is handled upstream; routes trust the stable identifier the
    // auth layer forwards.
    let user_header = warp::header::<Uuid>("x-user-id");

    // WebSocket push channel
    let ws = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, conn_mgr))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Open-queue join
    let join = warp::path!("room" / "join")
        .and(warp::post())
        .and(user_header)
        .and(matchmaker_filter.clone())
        .and_then(handle_join);

    // Code join
    let join_with_code = warp::path!("room" / "join" / String)
        .and(warp::post())
        .and(user_header)
        .and(matchmaker_filter.clone())
        .and_then(handle_join_with_code);

    // Completed-turn submission
    let turn = warp::path!("room" / Uuid / "turn")
        .and(warp::post())
        .and(user_header)
        .and(warp::body::json::<TurnRequest>())
        .and(game_manager_filter.clone())
        .and_then(handle_turn);

    let resign = warp::path!("room" / Uuid / "resign")
        .and(warp::post())
        .and(user_header)
        .and(game_manager_filter.clone())
        .and_then(handle_resign);

    let time_up = warp::path!("room" / Uuid / "timeup")
        .and(warp::post())
        .and(user_header)
        .and(game_manager_filter.clone())
        .and_then(handle_time_up);

    // Read path for reconnecting clients
    let room_state = warp::path!("room" / Uuid / "state")
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_room_state);

    let balance = warp::path!("user" / Uuid / "balance")
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_balance);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "x-user-id"])
        .allow_methods(vec!["GET", "POST"]);

    ws.or(health)
        .or(join)
        .or(join_with_code)
        .or(turn)
        .or(resign)
        .or(time_up)
        .or(room_state)
        .or(balance)
        .with(cors)
        .with(warp::log("word_rooms"))
}

fn error_reply(err: EngineError) -> warp::reply::WithStatus<warp::reply::Json> {
    if let EngineError::Storage(e) = &err {
        tracing::error!("Storage failure surfaced to caller: {:#}", e);
    }
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": err.to_string() })),
        err.status_code(),
    )
}

async fn handle_join(
    user_id: Uuid,
    matchmaker: Arc<Matchmaker>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match matchmaker.join_room(user_id, None).await {
        Ok(snapshot) => Ok(warp::reply::with_status(
            warp::reply::json(&snapshot),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_join_with_code(
    room_code: String,
    user_id: Uuid,
    matchmaker: Arc<Matchmaker>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match matchmaker.join_room(user_id, Some(&room_code)).await {
        Ok(snapshot) => Ok(warp::reply::with_status(
            warp::reply::json(&snapshot),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_turn(
    room_id: Uuid,
    user_id: Uuid,
    turn: TurnRequest,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.apply_turn(user_id, room_id, turn).await {
        Ok(outcome) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "outcome": outcome })),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_resign(
    room_id: Uuid,
    user_id: Uuid,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.resign(user_id, room_id).await {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "message": "You have resigned from the game. Thanks for playing!"
            })),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_time_up(
    room_id: Uuid,
    user_id: Uuid,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.time_up(user_id, room_id).await {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "message": "Time up recorded" })),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_room_state(
    room_id: Uuid,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.snapshot(room_id).await {
        Ok(snapshot) => Ok(warp::reply::with_status(
            warp::reply::json(&snapshot),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_balance(
    user_id: Uuid,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.ledger_balance(user_id).await {
        Ok(balance) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "user_id": user_id, "balance": balance })),
            warp::http::StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::config::Config;
    use crate::game_manager::RoomLocks;
    use game_types::{ClientMessage, RoomSnapshot, ServerMessage};
    use migration::{Migrator, MigratorTrait};

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            seats_per_room: 2,
            entry_points: 10,
            round_minutes: 5,
            play_notice_delay_ms: 0,
            connection_timeout_seconds: 300,
        }
    }

    async fn create_test_app()
    -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let db = game_persistence::connection::connect_to_memory_database()
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();

        let config = test_config();
        let connection_manager = Arc::new(ConnectionManager::new());
        let locks = Arc::new(RoomLocks::new());
        let matchmaker = Arc::new(Matchmaker::new(
            db.clone(),
            connection_manager.clone(),
            locks.clone(),
            config.clone(),
        ));
        let game_manager = Arc::new(GameManager::new(
            db,
            connection_manager.clone(),
            locks,
            config,
        ));

        create_routes(connection_manager, matchmaker, game_manager)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_join_returns_a_room_snapshot() {
        let app = create_test_app().await;
        let user = Uuid::new_v4();

        let response = warp::test::request()
            .method("POST")
            .path("/room/join")
            .header("x-user-id", user.to_string())
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);

        let snapshot: RoomSnapshot =
            serde_json::from_slice(response.body()).expect("Should parse snapshot");
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].user_id, user);
        assert_eq!(snapshot.room.room_code.len(), 6);
    }

    #[tokio::test]
    async fn test_join_requires_user_header() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/room/join")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_join_with_unknown_code_is_rejected() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/room/join/zzzzzz")
            .header("x-user-id", Uuid::new_v4().to_string())
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);

        let error: serde_json::Value =
            serde_json::from_slice(response.body()).expect("Should parse JSON");
        assert_eq!(error["error"], "Invalid Room Code or Room is Full");
    }

    #[tokio::test]
    async fn test_join_with_valid_code_seats_the_user() {
        let app = create_test_app().await;

        let creator = Uuid::new_v4();
        let response = warp::test::request()
            .method("POST")
            .path("/room/join")
            .header("x-user-id", creator.to_string())
            .reply(&app)
            .await;
        let snapshot: RoomSnapshot = serde_json::from_slice(response.body()).unwrap();

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/room/join/{}", snapshot.room.room_code))
            .header("x-user-id", Uuid::new_v4().to_string())
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let snapshot: RoomSnapshot = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(snapshot.players.len(), 2);
        // Second seat filled the two-seat room
        assert!(snapshot.room.is_full);
    }

    #[tokio::test]
    async fn test_room_state_unknown_room_is_404() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/room/{}/state", Uuid::new_v4()))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_turn_in_unknown_room_is_404() {
        let app = create_test_app().await;

        let body = serde_json::json!({
            "score": 5,
            "found_word": "crate",
            "time": null,
            "board": null
        });

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/room/{}/turn", Uuid::new_v4()))
            .header("x-user-id", Uuid::new_v4().to_string())
            .json(&body)
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_balance_reflects_the_entry_fee_debit() {
        let app = create_test_app().await;
        let user = Uuid::new_v4();

        warp::test::request()
            .method("POST")
            .path("/room/join")
            .header("x-user-id", user.to_string())
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/balance", user))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["balance"], -10);
    }

    #[tokio::test]
    async fn test_websocket_authenticate_binds_the_user() {
        let app = create_test_app().await;
        let user = Uuid::new_v4();

        let mut ws = warp::test::ws()
            .path("/ws")
            .handshake(app)
            .await
            .expect("WebSocket handshake should succeed");

        let auth_msg = ClientMessage::Authenticate { user_id: user };
        ws.send_text(serde_json::to_string(&auth_msg).unwrap()).await;

        let msg = ws.recv().await.expect("Should receive auth response");
        let server_msg: ServerMessage =
            serde_json::from_str(msg.to_str().unwrap()).expect("Should be valid ServerMessage");
        match server_msg {
            ServerMessage::AuthenticationSuccess { user_id } => assert_eq!(user_id, user),
            other => panic!("Expected AuthenticationSuccess, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_websocket_invalid_message_closes_or_errors() {
        let app = create_test_app().await;

        let mut ws = warp::test::ws()
            .path("/ws")
            .handshake(app)
            .await
            .expect("WebSocket handshake should succeed");

        ws.send_text("not json").await;

        // The connection is torn down after a malformed message
        match ws.recv().await {
            Err(_) => {}
            Ok(msg) => assert!(msg.is_close()),
        }
    }

    #[tokio::test]
    async fn test_invalid_routes() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/invalid")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }
}
