use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    error::{ApiError, ApiException},
    protocol::{
        GameSnapshot, JoinRequest, JoinResponse, LeaveRequest, LeaveResponse, MoveRequest,
        JOIN_ROUTE, MOVE_ROUTE, QUIT_ROUTE, STATE_ROUTE, STATUS_ROUTE,
    },
};
use tracing::debug;
use url::Url;

pub mod poller;

pub use poller::{ColumnChoice, GameConsole, Poller, PollerEvent, RunOutcome, TickOutcome, ViewState};

/// The operations a player needs from the game service.
#[async_trait]
pub trait GameTransport: Send + Sync {
    async fn status(&self) -> Result<String>;
    async fn join(&self, player_name: &str) -> Result<JoinResponse>;
    async fn snapshot(&self) -> Result<GameSnapshot>;
    /// `column` is 1-based, as typed by the player.
    async fn submit_move(&self, column: u32) -> Result<()>;
    async fn leave(&self, player_name: &str) -> Result<LeaveResponse>;
}

pub struct GameClient {
    http: Client,
    server_url: Url,
}

impl GameClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut server_url =
            Url::parse(server_url).with_context(|| format!("invalid server url {server_url}"))?;
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            server_url,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        self.server_url
            .join(route.trim_start_matches('/'))
            .with_context(|| format!("cannot build url for {route}"))
    }
}

/// Turns a non-success response into an error, preferring the server's
/// structured `ApiError` body when it sent one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ApiError>().await {
        Ok(body) => Err(ApiException::from(body)).with_context(|| format!("server answered {status}")),
        Err(_) => Err(anyhow!("server answered {status}")),
    }
}

#[async_trait]
impl GameTransport for GameClient {
    async fn status(&self) -> Result<String> {
        let res = self.http.get(self.endpoint(STATUS_ROUTE)?).send().await?;
        Ok(check_status(res).await?.text().await?)
    }

    async fn join(&self, player_name: &str) -> Result<JoinResponse> {
        let res = self
            .http
            .post(self.endpoint(JOIN_ROUTE)?)
            .json(&JoinRequest {
                player_name: player_name.to_string(),
            })
            .send()
            .await?;
        let body: JoinResponse = check_status(res).await?.json().await?;
        debug!(status = ?body.status, players = ?body.players, "join answered");
        Ok(body)
    }

    async fn snapshot(&self) -> Result<GameSnapshot> {
        let res = self.http.get(self.endpoint(STATE_ROUTE)?).send().await?;
        Ok(check_status(res).await?.json().await?)
    }

    async fn submit_move(&self, column: u32) -> Result<()> {
        let res = self
            .http
            .post(self.endpoint(MOVE_ROUTE)?)
            .json(&MoveRequest { column })
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }

    async fn leave(&self, player_name: &str) -> Result<LeaveResponse> {
        let res = self
            .http
            .post(self.endpoint(QUIT_ROUTE)?)
            .json(&LeaveRequest {
                player_name: player_name.to_string(),
            })
            .send()
            .await?;
        Ok(check_status(res).await?.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
