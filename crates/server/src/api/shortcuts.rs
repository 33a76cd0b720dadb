use std::sync::Arc;

use crate::{dto::ShortcutDto, state::AppState};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn shortcuts(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let (result, _) = state
        .converse(|session, _| {
            let store = session.shortcuts();
            store
                .list()
                .into_iter()
                .filter_map(|name| Some(ShortcutDto::from(name, store.get(name)?)))
                .collect::<Vec<_>>()
        })
        .await?;
    Ok(Json(result).into_response())
}
