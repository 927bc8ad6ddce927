//! Shared test doubles for thinmusic-ui integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thinmusic_common::Track;
use thinmusic_ui::services::{MusicApiError, SearchScope, SongSearch};

/// Scripted search endpoint
///
/// Returns canned songs per term after an optional per-term delay and records
/// every term it was asked for.
pub struct FakeSearch {
    scope: SearchScope,
    songs: HashMap<String, Vec<Track>>,
    latency: HashMap<String, Duration>,
    failing: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new(scope: SearchScope) -> Self {
        Self {
            scope,
            songs: HashMap::new(),
            latency: HashMap::new(),
            failing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_songs(mut self, term: &str, songs: Vec<Track>) -> Self {
        self.songs.insert(term.to_string(), songs);
        self
    }

    pub fn with_latency(mut self, term: &str, latency: Duration) -> Self {
        self.latency.insert(term.to_string(), latency);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SongSearch for FakeSearch {
    fn scope(&self) -> SearchScope {
        self.scope
    }

    async fn search(&self, term: &str, _limit: u32) -> Result<Vec<Track>, MusicApiError> {
        self.calls.lock().unwrap().push(term.to_string());

        if let Some(latency) = self.latency.get(term) {
            tokio::time::sleep(*latency).await;
        }

        if self.failing {
            return Err(MusicApiError::ApiError(500, "upstream unavailable".to_string()));
        }

        Ok(self.songs.get(term).cloned().unwrap_or_default())
    }
}

pub fn catalog(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| Track::catalog(*id, format!("Song {}", id))).collect()
}

pub fn shared(search: FakeSearch) -> Arc<FakeSearch> {
    Arc::new(search)
}
