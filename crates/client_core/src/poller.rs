//! Client-side game loop.
//!
//! The service only answers snapshots, so the player rebuilds "my turn",
//! "waiting" and "someone won" from periodic polls and submits at most one
//! move per observed turn.

use std::{future::Future, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use shared::{error::ApiException, protocol::GameSnapshot};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::GameTransport;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// What the player last learned from the service, plus local submission state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub is_my_turn: bool,
    pub waiting_for_opponent: bool,
    /// Set while a prompt or submission is in flight; blocks re-prompting.
    pub deciding: bool,
    pub winner_announced: bool,
    pub displayed_waiting_message: bool,
    pub board_text: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            is_my_turn: false,
            waiting_for_opponent: true,
            deciding: false,
            winner_announced: false,
            displayed_waiting_message: false,
            board_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerEvent {
    WaitingForOpponent,
    Board(String),
    MoveSubmitted { column: u32 },
    MoveFailed(String),
    GameOver { winner: String, local_player_won: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnChoice {
    /// 1-based.
    Column(u32),
    Quit,
}

/// Where the poller reports progress and asks the player for a column.
#[async_trait]
pub trait GameConsole: Send {
    fn show(&mut self, event: PollerEvent);
    async fn prompt_column(&mut self, player_name: &str) -> Result<ColumnChoice>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    GameOver,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    GameOver,
    Quit,
    Interrupted,
}

pub struct Poller {
    player_name: String,
    view: ViewState,
    poll_interval: Duration,
}

impl Poller {
    pub fn new(player_name: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            player_name: player_name.into(),
            view: ViewState::default(),
            poll_interval,
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Polls until the game ends, the player quits or `shutdown` resolves.
    #[instrument(skip_all, fields(player = %self.player_name))]
    pub async fn run<T, C, S>(&mut self, transport: &T, console: &mut C, shutdown: S) -> RunOutcome
    where
        T: GameTransport + ?Sized,
        C: GameConsole + ?Sized,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(interval = ?self.poll_interval, "starting game loop");

        loop {
            tokio::select! {
                _ = &mut shutdown => return RunOutcome::Interrupted,
                outcome = self.tick(transport, console) => match outcome {
                    TickOutcome::Continue => {}
                    TickOutcome::GameOver => return RunOutcome::GameOver,
                    TickOutcome::Quit => return RunOutcome::Quit,
                },
            }
            tokio::select! {
                _ = &mut shutdown => return RunOutcome::Interrupted,
                _ = sleep(self.poll_interval) => {}
            }
        }
    }

    /// One poll: refresh the view, announce a winner or the waiting state,
    /// and take the turn if it is ours.
    pub async fn tick<T, C>(&mut self, transport: &T, console: &mut C) -> TickOutcome
    where
        T: GameTransport + ?Sized,
        C: GameConsole + ?Sized,
    {
        let snapshot = match transport.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(error = %error, "failed to poll game state");
                return TickOutcome::Continue;
            }
        };
        if self.observe(&snapshot, console) {
            return TickOutcome::GameOver;
        }

        if self.view.waiting_for_opponent && !self.view.displayed_waiting_message {
            console.show(PollerEvent::WaitingForOpponent);
            self.view.displayed_waiting_message = true;
        }

        if !self.is_time_to_move() {
            return TickOutcome::Continue;
        }

        self.view.deciding = true;
        let outcome = self.take_turn(transport, console).await;
        self.view.deciding = false;
        self.view.displayed_waiting_message = false;
        outcome
    }

    fn is_time_to_move(&self) -> bool {
        self.view.is_my_turn && !self.view.waiting_for_opponent && !self.view.deciding
    }

    /// Applies a snapshot to the view. Returns true once a winner is known.
    fn observe<C: GameConsole + ?Sized>(&mut self, snapshot: &GameSnapshot, console: &mut C) -> bool {
        self.view.is_my_turn = snapshot.player_turn.as_deref() == Some(self.player_name.as_str());
        self.view.waiting_for_opponent = snapshot.waiting;
        self.view.board_text.clone_from(&snapshot.board);

        let Some(winner) = snapshot.winner_name() else {
            return false;
        };
        if !self.view.winner_announced {
            self.view.winner_announced = true;
            let local_player_won = winner == self.player_name;
            info!(%winner, local_player_won, "game over");
            console.show(PollerEvent::GameOver {
                winner: winner.to_string(),
                local_player_won,
            });
        }
        true
    }

    async fn take_turn<T, C>(&mut self, transport: &T, console: &mut C) -> TickOutcome
    where
        T: GameTransport + ?Sized,
        C: GameConsole + ?Sized,
    {
        console.show(PollerEvent::Board(self.view.board_text.clone()));
        let column = match console.prompt_column(&self.player_name).await {
            Ok(ColumnChoice::Column(column)) => column,
            Ok(ColumnChoice::Quit) => return TickOutcome::Quit,
            Err(error) => {
                warn!(error = %error, "could not read a column; treating as quit");
                return TickOutcome::Quit;
            }
        };

        // The opponent may have left or the game may have ended while the
        // player was typing.
        match transport.snapshot().await {
            Ok(snapshot) => {
                if self.observe(&snapshot, console) {
                    return TickOutcome::GameOver;
                }
            }
            Err(error) => warn!(error = %error, "re-check before move failed; using last state"),
        }
        if self.view.waiting_for_opponent {
            debug!(column, "opponent left before the move was sent");
            return TickOutcome::Continue;
        }

        match submit_with_retry(transport, &self.player_name, column).await {
            Ok(()) => console.show(PollerEvent::MoveSubmitted { column }),
            Err(error) => console.show(PollerEvent::MoveFailed(error.to_string())),
        }
        TickOutcome::Continue
    }

    /// Best-effort leave notification for the shutdown path. Skipped once the
    /// winner was announced, since the game is already over for both players.
    pub async fn leave<T: GameTransport + ?Sized>(&self, transport: &T) {
        if self.view.winner_announced {
            debug!("winner already announced; not sending leave");
            return;
        }
        match transport.leave(&self.player_name).await {
            Ok(response) => info!(message = %response.message, "left the game"),
            Err(error) => warn!(error = %error, "failed to notify server of leave"),
        }
    }
}

/// Sends the move. A failure is retried once only when the server never
/// answered and a fresh snapshot still shows our turn with no winner.
async fn submit_with_retry<T: GameTransport + ?Sized>(
    transport: &T,
    player_name: &str,
    column: u32,
) -> Result<()> {
    let Err(error) = transport.submit_move(column).await else {
        return Ok(());
    };
    if error.downcast_ref::<ApiException>().is_some() {
        return Err(error);
    }

    match transport.snapshot().await {
        Ok(snapshot) if snapshot.winner_name().is_some() => {
            debug!(column, "game already decided; not resending move");
            Ok(())
        }
        Ok(snapshot) if snapshot.player_turn.as_deref() != Some(player_name) => {
            debug!(column, "turn moved on; first submission was applied");
            Ok(())
        }
        Ok(_) => {
            warn!(column, error = %error, "move submission failed; retrying once");
            transport.submit_move(column).await
        }
        Err(check) => {
            warn!(column, error = %check, "cannot confirm failed move; not resending");
            Err(error)
        }
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
