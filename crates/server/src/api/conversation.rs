use std::sync::Arc;

use crate::{
    dto::{IntentDto, ReplyDto, SpeechDto},
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bustrack::prelude::*;
use tracing::{debug, warn};

pub async fn intent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IntentDto>,
) -> Result<Response, StatusCode> {
    let Some(intent) = Intent::recognize(&body.slots) else {
        warn!("No intent matches slots {:?}", body.slots);
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let ((), spoken) = state
        .converse(move |session, host| session.handle(host, intent))
        .await?;
    Ok(Json(SpeechDto::from(spoken)).into_response())
}

pub async fn reply(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplyDto>,
) -> Result<Response, StatusCode> {
    let (answered, spoken) = state
        .converse(move |session, host| session.reply(host, &body.utterance))
        .await?;
    if !answered {
        debug!("Reply arrived while nothing was asked");
        return Err(StatusCode::CONFLICT);
    }
    Ok(Json(SpeechDto::from(spoken)).into_response())
}

pub async fn speech(State(state): State<Arc<AppState>>) -> Response {
    let mut lines = Vec::with_capacity(state.speech.len());
    while let Some(line) = state.speech.pop() {
        lines.push(line);
    }
    Json(SpeechDto::from(lines)).into_response()
}
