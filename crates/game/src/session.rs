use shared::{
    domain::{PlayerIndex, MAX_PLAYERS},
    protocol::GameSnapshot,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::grid::{Grid, GridError, Placement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the game already has {max} players", max = MAX_PLAYERS)]
    GameFull,
    #[error("no player is seated at turn index {turn_index}")]
    NoPlayerAtTurn { turn_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Waiting,
    Active,
    Finished,
}

/// Roster, turn pointer and winner slot for the single game a server hosts.
#[derive(Debug, Clone)]
pub struct Session {
    players: Vec<String>,
    turn: PlayerIndex,
    winner: Option<String>,
    grid: Grid,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            players: Vec::with_capacity(MAX_PLAYERS),
            turn: PlayerIndex::First,
            winner: None,
            grid: Grid::new(),
        }
    }

    /// Seats a player. Names are not checked for uniqueness.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        if self.is_full() {
            return Err(SessionError::GameFull);
        }
        let name = name.into();
        info!(player = %name, "player joined");
        self.players.push(name);
        Ok(())
    }

    /// Drops a disc for whoever holds the turn, then hands the turn over.
    ///
    /// The turn flips even when the column was full or the move won the game;
    /// callers treat a recorded winner as overriding the turn pointer.
    pub fn apply_move(&mut self, column: usize) -> Result<Placement, GridError> {
        let mover = self.turn;
        let result = self.grid.drop_disc(column, mover);
        match &result {
            Ok(placement) => {
                for _ in &placement.lines {
                    self.set_winner(mover);
                }
            }
            Err(error) => debug!(column, turn = ?mover, %error, "move had no effect"),
        }
        self.turn = mover.other();
        result
    }

    /// Removes the first player with this name and starts the board over.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let Some(position) = self.players.iter().position(|p| p == name) else {
            warn!(player = %name, "leave requested for unknown player");
            return false;
        };
        self.players.remove(position);
        self.grid.reset();
        self.winner = None;
        self.turn = PlayerIndex::First;
        info!(player = %name, remaining = self.players.len(), "player left; board reset");
        true
    }

    /// Records the player seated at `player` as winner. The first winner of a
    /// game stands until the board is reset.
    pub fn set_winner(&mut self, player: PlayerIndex) {
        let Some(name) = self.players.get(player.index()) else {
            warn!(?player, "winner index has no seated player");
            return;
        };
        match &self.winner {
            Some(current) if current == name => {}
            Some(current) => {
                warn!(winner = %current, ignored = %name, "winner already recorded");
            }
            None => {
                info!(winner = %name, "winner recorded");
                self.winner = Some(name.clone());
            }
        }
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Names separated by spaces, each followed by one.
    pub fn roster_text(&self) -> String {
        self.players.iter().map(|p| format!("{p} ")).collect()
    }

    pub fn player_turn(&self) -> Result<&str, SessionError> {
        self.players
            .get(self.turn.index())
            .map(String::as_str)
            .ok_or(SessionError::NoPlayerAtTurn {
                turn_index: self.turn.index(),
            })
    }

    pub fn turn(&self) -> PlayerIndex {
        self.turn
    }

    pub fn board_text(&self) -> String {
        self.grid.render()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn phase(&self) -> SessionPhase {
        if self.winner.is_some() {
            return SessionPhase::Finished;
        }
        match self.players.len() {
            0 => SessionPhase::Empty,
            n if n < MAX_PLAYERS => SessionPhase::Waiting,
            _ => SessionPhase::Active,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            player_turn: self.player_turn().ok().map(str::to_string),
            waiting: !self.is_full(),
            winner: self.winner.clone(),
            board: self.board_text(),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
