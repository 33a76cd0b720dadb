use std::sync::Arc;

use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bustrack::prelude::*;

pub async fn settings(
    State(state): State<Arc<AppState>>,
    Json(config): Json<Config>,
) -> Result<Response, StatusCode> {
    state
        .converse(move |session, _| session.update_settings(config))
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
