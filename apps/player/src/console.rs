use std::io::{self, Write};

use anyhow::{bail, Result};
use async_trait::async_trait;
use client_core::{ColumnChoice, GameConsole, PollerEvent};
use shared::domain::COLS;

/// Terminal front end: events go to stdout, columns are read from stdin.
pub struct StdConsole;

#[async_trait]
impl GameConsole for StdConsole {
    fn show(&mut self, event: PollerEvent) {
        match event {
            PollerEvent::MoveFailed(_) => eprintln!("{}", describe(&event)),
            _ => println!("{}", describe(&event)),
        }
    }

    async fn prompt_column(&mut self, player_name: &str) -> Result<ColumnChoice> {
        let message =
            format!("It's your turn {player_name}, please enter column (1-{COLS}) or Q to quit: ");
        loop {
            let line = prompt_line(&message).await?;
            if let Some(choice) = parse_choice(&line) {
                return Ok(choice);
            }
        }
    }
}

pub fn describe(event: &PollerEvent) -> String {
    match event {
        PollerEvent::WaitingForOpponent => "Waiting for opponent to join...\n".to_string(),
        PollerEvent::Board(board) => board.clone(),
        PollerEvent::MoveSubmitted { .. } => "Waiting for opponent...\n".to_string(),
        PollerEvent::MoveFailed(reason) => format!("Could not send your move: {reason}"),
        PollerEvent::GameOver {
            local_player_won: true,
            ..
        } => "\nCongratulation!! You won the game!\n".to_string(),
        PollerEvent::GameOver { winner, .. } => format!("\nSorry - {winner} has won the game.\n"),
    }
}

/// `q`/`Q` quits; any column on the board is accepted 1-based. Everything
/// else asks again.
pub fn parse_choice(input: &str) -> Option<ColumnChoice> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Some(ColumnChoice::Quit);
    }
    input
        .parse::<u32>()
        .ok()
        .filter(|column| (1..=COLS as u32).contains(column))
        .map(ColumnChoice::Column)
}

pub async fn prompt_line(message: &str) -> Result<String> {
    println!("{message}");
    io::stdout().flush()?;
    tokio::task::spawn_blocking(|| -> Result<String> {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            bail!("standard input closed");
        }
        Ok(line)
    })
    .await?
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
