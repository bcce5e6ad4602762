use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{poller::DEFAULT_POLL_INTERVAL, GameClient, GameTransport, Poller};
use shared::protocol::JoinStatus;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod console;

use console::{prompt_line, StdConsole};

#[derive(Parser, Debug)]
#[command(about = "Join a five-in-a-row game and play it from the terminal")]
struct Args {
    #[arg(long, default_value = "http://localhost:8081")]
    server_url: String,
    /// Prompted for when omitted.
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    poll_interval_secs: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(play(args));
    // A prompt still blocked on stdin would keep a normal shutdown waiting.
    runtime.shutdown_background();
    result
}

async fn play(args: Args) -> Result<()> {
    let client = GameClient::new(&args.server_url)?;
    let alive = client
        .status()
        .await
        .with_context(|| format!("server at {} is not reachable", args.server_url))?;
    println!("{alive}");

    let name = match args.name {
        Some(name) => name,
        None => prompt_line("Enter your name:").await?,
    };
    let name = name.trim().to_string();
    if name.is_empty() {
        bail!("player name cannot be empty");
    }
    println!("Welcome {name}!");

    let joined = client.join(&name).await?;
    println!("{}", joined.message);
    if joined.status == JoinStatus::Full {
        return Ok(());
    }

    let interval = Duration::from_secs(args.poll_interval_secs.max(1));
    let mut poller = Poller::new(name, interval);
    let outcome = poller.run(&client, &mut StdConsole, shutdown_signal()).await;
    info!(?outcome, "game loop finished");

    poller.leave(&client).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
