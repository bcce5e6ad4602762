use super::*;
use shared::error::ErrorCode;

async fn two_player_context() -> ApiContext {
    let ctx = ApiContext::default();
    join(&ctx, "Alice").await.expect("alice joins");
    join(&ctx, "Bob").await.expect("bob joins");
    ctx
}

#[test]
fn status_reports_alive() {
    assert_eq!(status(), "Server is alive!");
}

#[tokio::test]
async fn join_confirms_with_roster() {
    let ctx = ApiContext::default();
    let response = join(&ctx, "Alice").await.expect("join");
    assert_eq!(response.status, JoinStatus::Joined);
    assert_eq!(
        response.message,
        "[SERVER] Player Alice has joined!\n All players: Alice ."
    );
    assert_eq!(response.players, vec!["Alice".to_string()]);
}

#[tokio::test]
async fn third_join_is_rejected_with_structured_status() {
    let ctx = two_player_context().await;
    let response = join(&ctx, "Carol").await.expect("join");
    assert_eq!(response.status, JoinStatus::Full);
    assert_eq!(response.message, "Sorry, the game is full.");
    assert_eq!(response.players, vec!["Alice".to_string(), "Bob".to_string()]);
    assert_eq!(ctx.session.lock().await.number_of_players(), 2);
}

#[tokio::test]
async fn blank_name_is_a_validation_error() {
    let ctx = ApiContext::default();
    let err = join(&ctx, "   ").await.expect_err("blank name");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(ctx.session.lock().await.number_of_players(), 0);
}

#[tokio::test]
async fn moves_are_one_based() {
    let ctx = two_player_context().await;
    submit_move(&ctx, 1).await.expect("move");
    let session = ctx.session.lock().await;
    assert_eq!(
        session.grid().cell(5, 0),
        Some(shared::domain::CellState::Disc(shared::domain::PlayerIndex::First))
    );
}

#[tokio::test]
async fn out_of_range_column_leaves_session_untouched() {
    let ctx = two_player_context().await;
    for column in [0, 10] {
        let err = submit_move(&ctx, column).await.expect_err("invalid column");
        assert_eq!(err.code, ErrorCode::Validation);
    }
    let snapshot = snapshot(&ctx).await;
    assert_eq!(snapshot.player_turn.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn full_column_is_accepted_and_passes_turn() {
    let ctx = two_player_context().await;
    for _ in 0..6 {
        submit_move(&ctx, 9).await.expect("move");
    }
    submit_move(&ctx, 9).await.expect("full column is not an error");
    assert_eq!(snapshot(&ctx).await.player_turn.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn snapshot_shows_winner_after_vertical_line() {
    let ctx = two_player_context().await;
    for bob_column in [5, 6, 7, 8] {
        submit_move(&ctx, 3).await.expect("alice");
        submit_move(&ctx, bob_column).await.expect("bob");
    }
    submit_move(&ctx, 3).await.expect("alice wins");

    let snapshot = snapshot(&ctx).await;
    assert_eq!(snapshot.winner.as_deref(), Some("Alice"));
    for row in snapshot.board.lines().skip(1) {
        assert_eq!(&row[6..9], "[x]");
    }
}

#[tokio::test]
async fn leave_resets_board_and_reports_waiting() {
    let ctx = two_player_context().await;
    submit_move(&ctx, 4).await.expect("move");

    let response = leave(&ctx, "Alice").await;
    assert_eq!(response.message, "[SERVER] Player Alice has left the game.");
    assert!(response.snapshot.waiting);
    assert_eq!(response.snapshot.player_turn.as_deref(), Some("Bob"));
    assert!(!response.snapshot.board.contains('x'));
}

#[tokio::test]
async fn leave_for_unknown_player_is_harmless() {
    let ctx = two_player_context().await;
    let response = leave(&ctx, "Mallory").await;
    assert_eq!(response.message, "[SERVER] Player Mallory is not in the game.");
    assert!(!response.snapshot.waiting);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_seat_exactly_two_players() {
    let ctx = ApiContext::default();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ctx = ctx.clone();
            tokio::spawn(async move { join(&ctx, &format!("Player{i}")).await })
        })
        .collect();

    let mut joined = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.expect("task").expect("join").status {
            JoinStatus::Joined => joined += 1,
            JoinStatus::Full => full += 1,
        }
    }

    assert_eq!(joined, 2);
    assert_eq!(full, 6);
    let session = ctx.session.lock().await;
    assert_eq!(session.number_of_players(), 2);
    assert!(!session.snapshot().waiting);
}
