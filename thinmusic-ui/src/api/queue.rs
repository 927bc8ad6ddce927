//! Playback queue endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use thinmusic_common::Track;

use crate::error::ApiResult;
use crate::playback::QueueSnapshot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub track: Track,
}

#[derive(Debug, Deserialize)]
pub struct CollectionRequest {
    pub tracks: Vec<Track>,
}

/// GET /api/queue
pub async fn get_queue(State(state): State<AppState>) -> Json<QueueSnapshot> {
    Json(state.playback.snapshot().await)
}

/// POST /api/queue/play-now
pub async fn play_now(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> ApiResult<Json<QueueSnapshot>> {
    Ok(Json(state.playback.play_now(request.track).await?))
}

/// POST /api/queue/play-next
pub async fn play_next(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> ApiResult<Json<QueueSnapshot>> {
    Ok(Json(state.playback.play_next(request.track).await?))
}

/// POST /api/queue/play-last
pub async fn play_last(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> ApiResult<Json<QueueSnapshot>> {
    Ok(Json(state.playback.play_last(request.track).await?))
}

/// POST /api/queue/collection
pub async fn play_collection(
    State(state): State<AppState>,
    Json(request): Json<CollectionRequest>,
) -> ApiResult<Json<QueueSnapshot>> {
    Ok(Json(state.playback.play_collection_now(request.tracks).await?))
}
