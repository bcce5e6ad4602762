use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        GameSnapshot, JoinRequest, JoinResponse, LeaveRequest, LeaveResponse, MoveRequest,
        JOIN_ROUTE, MOVE_ROUTE, QUIT_ROUTE, STATE_ROUTE, STATUS_ROUTE,
    },
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const MAX_REQUEST_BYTES: usize = 16 * 1024;

type HttpError = (StatusCode, Json<ApiError>);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let state = AppState::default();
        let app = build_router(Arc::new(state));

        let addr: SocketAddr = settings.server_bind.parse()?;
        info!(%addr, workers = settings.worker_threads, "game server listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("game server stopped");
        Ok::<_, anyhow::Error>(())
    })
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c; shutting down");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(STATUS_ROUTE, get(http_status))
        .route(JOIN_ROUTE, post(http_join))
        .route(STATE_ROUTE, get(http_state))
        .route(MOVE_ROUTE, post(http_move))
        .route(QUIT_ROUTE, post(http_quit))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

async fn http_status() -> &'static str {
    server_api::status()
}

async fn http_join(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, HttpError> {
    server_api::join(&state.api, &req.player_name)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn http_state(State(state): State<Arc<AppState>>) -> Json<GameSnapshot> {
    Json(server_api::snapshot(&state.api).await)
}

async fn http_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoveRequest>,
) -> Result<StatusCode, HttpError> {
    server_api::submit_move(&state.api, req.column)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_quit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LeaveRequest>,
) -> Json<LeaveResponse> {
    Json(server_api::leave(&state.api, &req.player_name).await)
}

async fn not_found() -> impl IntoResponse {
    api_error(ApiError::new(ErrorCode::NotFound, "no such route"))
}

fn api_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
