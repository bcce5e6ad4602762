use std::sync::Arc;

use game::{GridError, Session, SessionError};
use shared::{
    domain::column_from_one_based,
    error::ApiError,
    protocol::{
        GameSnapshot, JoinResponse, JoinStatus, LeaveResponse, ALIVE_MESSAGE, GAME_FULL_MESSAGE,
    },
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Shared handle to the one session a server process hosts. Every operation
/// holds the lock for its whole read-modify-write.
#[derive(Clone, Default)]
pub struct ApiContext {
    pub session: Arc<Mutex<Session>>,
}

impl ApiContext {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}

pub fn status() -> &'static str {
    ALIVE_MESSAGE
}

pub async fn join(ctx: &ApiContext, player_name: &str) -> Result<JoinResponse, ApiError> {
    let player_name = player_name.trim();
    if player_name.is_empty() {
        return Err(ApiError::validation("player name cannot be empty"));
    }

    let mut session = ctx.session.lock().await;
    match session.add_player(player_name) {
        Ok(()) => Ok(JoinResponse {
            status: JoinStatus::Joined,
            message: format!(
                "[SERVER] Player {player_name} has joined!\n All players: {}.",
                session.roster_text()
            ),
            players: session.players().to_vec(),
        }),
        Err(SessionError::GameFull) => {
            info!(player = %player_name, "join rejected; game is full");
            Ok(JoinResponse {
                status: JoinStatus::Full,
                message: GAME_FULL_MESSAGE.to_string(),
                players: session.players().to_vec(),
            })
        }
        Err(err) => Err(internal(err)),
    }
}

pub async fn snapshot(ctx: &ApiContext) -> GameSnapshot {
    ctx.session.lock().await.snapshot()
}

/// Applies a 1-based column for whoever holds the turn. A full column is not
/// an error for the caller: the board is unchanged and the turn still passes.
pub async fn submit_move(ctx: &ApiContext, column: u32) -> Result<(), ApiError> {
    let index = column_from_one_based(column)
        .ok_or_else(|| ApiError::validation(format!("column {column} is not on the board")))?;

    let mut session = ctx.session.lock().await;
    match session.apply_move(index) {
        Ok(placement) if placement.is_win() => {
            info!(column, winner = ?session.winner(), "move completed a line");
        }
        Ok(_) => {}
        Err(GridError::ColumnFull { .. }) => {
            warn!(column, "column full; turn passed without a disc");
        }
        Err(err) => return Err(internal(err)),
    }
    Ok(())
}

pub async fn leave(ctx: &ApiContext, player_name: &str) -> LeaveResponse {
    let player_name = player_name.trim();
    let mut session = ctx.session.lock().await;
    let message = if session.remove_player(player_name) {
        format!("[SERVER] Player {player_name} has left the game.")
    } else {
        format!("[SERVER] Player {player_name} is not in the game.")
    };
    LeaveResponse {
        message,
        snapshot: session.snapshot(),
    }
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    ApiError::new(shared::error::ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
