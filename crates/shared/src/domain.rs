use serde::{Deserialize, Serialize};

pub const ROWS: usize = 6;
pub const COLS: usize = 9;
pub const WIN_LENGTH: usize = 5;
pub const MAX_PLAYERS: usize = 2;

/// Seat of a player in the roster. `First` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerIndex {
    First,
    Second,
}

impl PlayerIndex {
    pub fn index(self) -> usize {
        match self {
            PlayerIndex::First => 0,
            PlayerIndex::Second => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            PlayerIndex::First => PlayerIndex::Second,
            PlayerIndex::Second => PlayerIndex::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Disc(PlayerIndex),
}

impl CellState {
    pub fn is_disc_of(self, player: PlayerIndex) -> bool {
        self == CellState::Disc(player)
    }
}

/// Converts a 1-based column as typed by a player into a board column.
pub fn column_from_one_based(column: u32) -> Option<usize> {
    let column = usize::try_from(column).ok()?;
    if (1..=COLS).contains(&column) {
        Some(column - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_player_alternates() {
        assert_eq!(PlayerIndex::First.other(), PlayerIndex::Second);
        assert_eq!(PlayerIndex::Second.other(), PlayerIndex::First);
        assert_eq!(PlayerIndex::Second.index(), 1);
    }

    #[test]
    fn one_based_columns_map_to_board_range() {
        assert_eq!(column_from_one_based(1), Some(0));
        assert_eq!(column_from_one_based(9), Some(8));
        assert_eq!(column_from_one_based(0), None);
        assert_eq!(column_from_one_based(10), None);
    }

    #[test]
    fn cell_state_serializes_with_player() {
        let json = serde_json::to_string(&CellState::Disc(PlayerIndex::Second)).expect("json");
        assert_eq!(json, r#"{"disc":"second"}"#);
    }
}
