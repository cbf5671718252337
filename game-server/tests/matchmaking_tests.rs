mod test_helpers;

use game_server::error::EngineError;
use game_types::{PlayerStatus, RoomStatus, ServerMessage};
use test_helpers::*;
use uuid::Uuid;

#[tokio::test]
async fn test_first_join_creates_a_fresh_room() {
    let setup = TestSetup::with_seats(4).await;
    let user = Uuid::new_v4();

    let snapshot = setup.matchmaker.join_room(user, None).await.unwrap();

    assert_eq!(snapshot.room.status, RoomStatus::Waiting);
    assert!(!snapshot.room.is_full);
    assert_eq!(snapshot.room.entry_points, 10);
    assert_eq!(snapshot.room.room_code.len(), 6);
    assert!(snapshot.room.room_code.chars().all(|c| c.is_ascii_alphanumeric()));

    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].user_id, user);
    assert_eq!(snapshot.players[0].seat, 0);
    assert_eq!(snapshot.players[0].status, PlayerStatus::Waiting);
}

#[tokio::test]
async fn test_join_debits_the_entry_fee() {
    let setup = TestSetup::with_seats(4).await;
    let user = Uuid::new_v4();

    let snapshot = setup.matchmaker.join_room(user, None).await.unwrap();

    let entries = setup
        .ledger()
        .entries_for_room(snapshot.room.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, user);
    assert_eq!(entries[0].points_out, 10);
    assert_eq!(entries[0].description, "Join a Game");

    assert_eq!(setup.ledger().balance(user).await.unwrap(), -10);
}

#[tokio::test]
async fn test_queue_joins_share_the_oldest_open_room() {
    let setup = TestSetup::with_seats(4).await;

    let first = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();
    let second = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();

    assert_eq!(first.room.id, second.room.id);
    assert_eq!(second.players.len(), 2);
    let seats: Vec<i32> = second.players.iter().map(|p| p.seat).collect();
    assert_eq!(seats, vec![0, 1]);
}

#[tokio::test]
async fn test_join_with_code_targets_the_exact_room() {
    let setup = TestSetup::with_seats(3).await;

    let created = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();

    let joined = setup
        .matchmaker
        .join_room(Uuid::new_v4(), Some(&created.room.room_code))
        .await
        .unwrap();

    assert_eq!(joined.room.id, created.room.id);
    assert_eq!(joined.players.len(), 2);
}

#[tokio::test]
async fn test_unknown_code_is_invalid() {
    let setup = TestSetup::new().await;

    let err = setup
        .matchmaker
        .join_room(Uuid::new_v4(), Some("nope99"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRoomCode));
}

#[tokio::test]
async fn test_code_join_on_a_full_room_is_invalid() {
    let setup = TestSetup::with_seats(2).await;
    let (_, snapshot) = setup.join_users(2).await;
    assert!(snapshot.room.is_full);

    let err = setup
        .matchmaker
        .join_room(Uuid::new_v4(), Some(&snapshot.room.room_code))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRoomCode));
}

#[tokio::test]
async fn test_room_fill_flips_exactly_at_capacity() {
    let setup = TestSetup::with_seats(3).await;

    let one = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();
    assert!(!one.room.is_full);
    assert_eq!(one.game.status, game_types::GameStatus::Waiting);

    let two = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();
    assert!(!two.room.is_full);

    let three = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();
    assert!(three.room.is_full);
    assert_eq!(three.room.status, RoomStatus::Active);
    assert_eq!(three.game.status, game_types::GameStatus::Active);
    assert_single_turn_owner(&three);
    assert_eq!(three.players[0].status, PlayerStatus::Playing);
}

#[tokio::test]
async fn test_round_window_matches_the_configured_duration() {
    let setup = TestSetup::with_seats(2).await;
    let (_, snapshot) = setup.join_users(2).await;

    let start = chrono::DateTime::parse_from_rfc3339(snapshot.game.start_time.as_ref().unwrap())
        .unwrap();
    let end =
        chrono::DateTime::parse_from_rfc3339(snapshot.game.end_time.as_ref().unwrap()).unwrap();
    assert_eq!((end - start).num_minutes(), 5);
}

#[tokio::test]
async fn test_rejoin_is_a_resume_not_a_second_seat() {
    let setup = TestSetup::with_seats(4).await;
    let user = Uuid::new_v4();
    let mut receiver = setup.connect_user(user).await;

    let first = setup.matchmaker.join_room(user, None).await.unwrap();
    let again = setup.matchmaker.join_room(user, None).await.unwrap();

    assert_eq!(first.room.id, again.room.id);
    assert_eq!(again.players.len(), 1);

    // No double entry fee
    assert_eq!(setup.ledger().balance(user).await.unwrap(), -10);

    // The resume re-emitted the room state to the user's connection
    let messages = drain_messages(&mut receiver);
    assert!(messages
        .iter()
        .any(|m| matches!(m, ServerMessage::StartGame { .. })));
}

#[tokio::test]
async fn test_rejoin_by_code_resumes_too() {
    let setup = TestSetup::with_seats(4).await;
    let user = Uuid::new_v4();

    let first = setup.matchmaker.join_room(user, None).await.unwrap();
    let again = setup
        .matchmaker
        .join_room(user, Some(&first.room.room_code))
        .await
        .unwrap();

    assert_eq!(first.room.id, again.room.id);
    assert_eq!(again.players.len(), 1);
}

#[tokio::test]
async fn test_settled_rooms_leave_the_open_queue() {
    let setup = TestSetup::with_seats(2).await;
    let (users, snapshot) = setup.join_users(2).await;

    // Settle the room
    setup
        .game_manager
        .resign(users[1], snapshot.room.id)
        .await
        .unwrap();

    // A fresh join must not land in the expired room
    let next = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();
    assert_ne!(next.room.id, snapshot.room.id);
    assert_eq!(next.room.status, RoomStatus::Waiting);
}

#[tokio::test]
async fn test_code_join_on_a_settled_room_is_invalid() {
    let setup = TestSetup::with_seats(2).await;
    let (users, snapshot) = setup.join_users(2).await;

    setup
        .game_manager
        .resign(users[0], snapshot.room.id)
        .await
        .unwrap();

    let err = setup
        .matchmaker
        .join_room(Uuid::new_v4(), Some(&snapshot.room.room_code))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRoomCode));
}

#[tokio::test]
async fn test_full_room_spills_queue_joins_into_a_new_room() {
    let setup = TestSetup::with_seats(2).await;
    let (_, full) = setup.join_users(2).await;
    assert!(full.room.is_full);

    let spilled = setup
        .matchmaker
        .join_room(Uuid::new_v4(), None)
        .await
        .unwrap();
    assert_ne!(spilled.room.id, full.room.id);
    assert_eq!(spilled.players.len(), 1);
}

#[tokio::test]
async fn test_concurrent_joins_never_overfill_a_room() {
    let setup = TestSetup::with_seats(2).await;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let matchmaker = setup.matchmaker.clone();
        handles.push(tokio::spawn(async move {
            matchmaker.join_room(Uuid::new_v4(), None).await.unwrap()
        }));
    }

    let mut room_ids = Vec::new();
    for handle in handles {
        room_ids.push(handle.await.unwrap().room.id);
    }
    room_ids.sort();
    room_ids.dedup();

    for room_id in room_ids {
        let players = setup.players().list_by_room(room_id).await.unwrap();
        assert!(
            players.len() <= 2,
            "room {} overfilled with {} seats",
            room_id,
            players.len()
        );
        let snapshot = setup.game_manager.snapshot(room_id).await.unwrap();
        assert_single_turn_owner(&snapshot);
    }
}
