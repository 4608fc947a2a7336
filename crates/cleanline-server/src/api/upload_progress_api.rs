//! `upload-progress/{uploadId}`, `upload-progress/active/all`, and the SSE
//! stream `upload-progress/stream/{uploadId}`.

use crate::api::AppState;
use crate::error::AppError;
use crate::upload_progress::UploadProgress;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

pub async fn one(State(state): State<AppState>, Path(upload_id): Path<Uuid>) -> Result<Json<UploadProgress>, AppError> {
    state
        .upload_progress
        .get_progress(upload_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("upload '{upload_id}' not tracked")))
}

pub async fn active(State(state): State<AppState>) -> Json<Vec<UploadProgress>> {
    Json(state.upload_progress.get_all_active())
}

pub async fn stream(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let receiver = state
        .upload_progress
        .subscribe(upload_id)
        .ok_or_else(|| AppError::NotFound(format!("upload '{upload_id}' not tracked")))?;

    let events = BroadcastStream::new(receiver).filter_map(|item| {
        item.ok().and_then(|progress| serde_json::to_string(&progress).ok()).map(|json| Ok(Event::default().data(json)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
