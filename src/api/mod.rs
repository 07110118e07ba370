mod router;
mod routes_core;
mod routes_generation;
mod security;
mod state;
pub mod types;

use axum::{
    extract::Request,
    extract::State,
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use levelsynth::SynthConfig;
pub(crate) use router::build_router;
use routes_core::*;
use routes_generation::*;
pub(crate) use security::ApiSecurity;
use security::*;
pub(crate) use state::AppState;
use types::*;

pub(crate) const DEFAULT_ADDR: &str = "127.0.0.1:3000";

pub(crate) fn addr_from_env() -> String {
    std::env::var("LEVELSYNTH_ADDR")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
}

/// Bind and serve until the process is stopped.
pub(crate) async fn serve(config: SynthConfig, security: ApiSecurity, addr: &str) -> std::io::Result<()> {
    let state = AppState::new(config);
    let app = build_router(state, security);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("[levelsynth API] Listening on http://{}", addr);

    axum::serve(listener, app).await
}
