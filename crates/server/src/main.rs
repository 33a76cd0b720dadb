mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post, put};
use bustrack::prelude::*;
use std::{sync::Arc, time::Instant};
use tokio::runtime::Handle;
use tracing::{error, info, warn};

const PORT: u32 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).unwrap_or_else(|err| {
            warn!("Failed to read config {path}: {err}, using defaults");
            Config::default()
        }),
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };

    // The gateway's blocking client must be built off the async workers
    let now = Instant::now();
    let session = tokio::task::spawn_blocking(move || {
        let gateway = MbtaGateway::new(config.base_url.clone(), config.api_key.clone());
        let shortcuts = ShortcutStore::open(&config.shortcuts_path);
        Session::new(gateway, config, shortcuts)
    })
    .await;
    let session = match session {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to create session: {err}");
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState::new(session, Handle::current()));
    if let Err(err) = state
        .converse(|session, host| session.register_vocabulary(host))
        .await
    {
        error!("Failed to register vocabulary: {err}");
    }
    info!("Session ready in {:?}", now.elapsed());

    let app = axum::Router::new()
        .route("/intent", post(api::intent))
        .route("/reply", post(api::reply))
        .route("/speech", get(api::speech))
        .route("/shortcuts", get(api::shortcuts))
        .route("/settings", put(api::settings))
        .with_state(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {PORT}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {PORT}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
        std::process::exit(1);
    }
}
