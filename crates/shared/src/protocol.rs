use serde::{Deserialize, Serialize};

pub const STATUS_ROUTE: &str = "/status";
pub const JOIN_ROUTE: &str = "/join";
pub const STATE_ROUTE: &str = "/state";
pub const MOVE_ROUTE: &str = "/move";
pub const QUIT_ROUTE: &str = "/quit";

pub const ALIVE_MESSAGE: &str = "Server is alive!";
pub const GAME_FULL_MESSAGE: &str = "Sorry, the game is full.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub player_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    Joined,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub status: JoinStatus,
    pub message: String,
    pub players: Vec<String>,
}

/// Point-in-time view of the session handed to polling clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_turn: Option<String>,
    /// True while fewer than two players are seated.
    pub waiting: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub board: String,
}

impl GameSnapshot {
    /// Winner name, treating an empty name as no winner.
    pub fn winner_name(&self) -> Option<&str> {
        self.winner.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// 1-based column as chosen by the player.
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResponse {
    pub message: String,
    pub snapshot: GameSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_without_turn_or_winner_omits_fields() {
        let snapshot = GameSnapshot {
            player_turn: None,
            waiting: true,
            winner: None,
            board: String::new(),
        };
        let value = serde_json::to_value(&snapshot).expect("json");
        assert!(value.get("player_turn").is_none());
        assert!(value.get("winner").is_none());
        assert_eq!(value["waiting"], true);
    }

    #[test]
    fn empty_winner_name_is_no_winner() {
        let snapshot: GameSnapshot =
            serde_json::from_str(r#"{"waiting":false,"winner":"","board":""}"#).expect("json");
        assert_eq!(snapshot.winner_name(), None);
    }

    #[test]
    fn join_status_uses_snake_case() {
        let json = serde_json::to_string(&JoinStatus::Full).expect("json");
        assert_eq!(json, r#""full""#);
    }
}
