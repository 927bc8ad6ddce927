//! Search input and panel tab endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use thinmusic_common::events::PanelTab;

use crate::error::ApiResult;
use crate::search::{InputSummary, PanelSnapshot};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchInputRequest {
    /// Raw contents of the search box
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: PanelTab,
}

/// GET /api/search
pub async fn get_panel(State(state): State<AppState>) -> Json<PanelSnapshot> {
    Json(state.search.snapshot().await)
}

/// POST /api/search/input
///
/// Called on every change of the search box. Results arrive later through
/// `GET /api/search` or the `SearchStateChanged` event.
pub async fn search_input(
    State(state): State<AppState>,
    Json(request): Json<SearchInputRequest>,
) -> Json<InputSummary> {
    let outcome = state.search.input(&request.text).await;
    Json(outcome.summary())
}

/// POST /api/tab
pub async fn select_tab(
    State(state): State<AppState>,
    Json(request): Json<TabRequest>,
) -> ApiResult<Json<PanelSnapshot>> {
    Ok(Json(state.search.select_tab(request.tab).await?))
}
