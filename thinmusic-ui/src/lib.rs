//! thinmusic-ui library
//!
//! Front-end service for ThinMusic: debounced catalog + library search,
//! playback queue control, and sign-in state, exposed over HTTP and SSE.

use axum::Router;
use std::sync::Arc;
use thinmusic_common::events::EventBus;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod logging;
pub mod playback;
pub mod search;
pub mod services;
pub mod session;

use playback::{PlaybackController, PlaybackQueue};
use search::{DispatcherSettings, SearchDispatcher};
use services::{ProfileStore, SongSearch};
use session::Session;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub search: SearchDispatcher,
    pub playback: Arc<PlaybackController>,
    pub session: Arc<Session>,
    pub events: EventBus,
}

impl AppState {
    /// Wire the collaborators together
    pub fn new(
        catalog: Arc<dyn SongSearch>,
        library: Arc<dyn SongSearch>,
        queue: Arc<dyn PlaybackQueue>,
        profiles: Arc<dyn ProfileStore>,
        settings: DispatcherSettings,
        events: EventBus,
    ) -> Self {
        let search = SearchDispatcher::new(catalog, library, settings, events.clone());
        let playback = Arc::new(PlaybackController::new(queue, events.clone()));
        let session = Arc::new(Session::new(profiles, playback.clone(), events.clone()));

        Self {
            search,
            playback,
            session,
            events,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/search", get(api::search::get_panel))
        .route("/api/search/input", post(api::search::search_input))
        .route("/api/tab", post(api::search::select_tab))
        .route("/api/queue", get(api::queue::get_queue))
        .route("/api/queue/play-now", post(api::queue::play_now))
        .route("/api/queue/play-next", post(api::queue::play_next))
        .route("/api/queue/play-last", post(api::queue::play_last))
        .route("/api/queue/collection", post(api::queue::play_collection))
        .route("/api/session", get(api::session::get_session))
        .route("/api/session/sign-in", post(api::session::sign_in))
        .route("/api/session/sign-out", post(api::session::sign_out))
        .route("/api/session/link", post(api::session::link_account))
        .route(
            "/api/session/authorization-revoked",
            post(api::session::authorization_revoked),
        )
        .route("/events", get(api::event_stream));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
