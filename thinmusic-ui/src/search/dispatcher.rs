//! Debounced search dispatcher
//!
//! Every accepted keystroke bumps a generation counter. The spawned task for
//! that generation waits out the debounce delay, runs the catalog and library
//! searches side by side, reconciles them, and commits the result only if no
//! newer input arrived in the meantime. Superseded work is never aborted; its
//! outcome is dropped.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thinmusic_common::events::{EventBus, PanelTab, ThinEvent};
use thinmusic_common::track::retain_playable;
use thinmusic_common::{reconcile, Error, MergedResult, Result, Track};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::state::{PanelSnapshot, PanelState};
use crate::services::{MusicApiError, SongSearch};

/// Timing and paging for the dispatcher
#[derive(Debug, Clone, Copy)]
pub struct DispatcherSettings {
    /// Quiet period after the last keystroke before searching
    pub debounce: Duration,
    /// Page size requested from each search endpoint
    pub search_limit: u32,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(thinmusic_common::config::DEFAULT_DEBOUNCE_MS),
            search_limit: thinmusic_common::config::DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// What happened to an input event
#[derive(Debug)]
pub enum InputOutcome {
    /// Empty term: back to browse, pending search cancelled
    Cleared,
    /// Same term already being searched
    Duplicate,
    /// Search scheduled after the debounce delay
    Scheduled(SearchTicket),
}

impl InputOutcome {
    pub fn summary(&self) -> InputSummary {
        match self {
            InputOutcome::Cleared => InputSummary {
                outcome: "cleared",
                generation: None,
            },
            InputOutcome::Duplicate => InputSummary {
                outcome: "duplicate",
                generation: None,
            },
            InputOutcome::Scheduled(ticket) => InputSummary {
                outcome: "scheduled",
                generation: Some(ticket.generation),
            },
        }
    }
}

/// Serializable form of [`InputOutcome`]
#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}

/// How a scheduled search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCompletion {
    /// A newer input arrived during the debounce delay; nothing was sent
    Superseded,
    /// Searches ran but a newer input arrived before they finished
    Stale,
    /// Results committed to the panel
    Committed { result_count: usize },
    /// Both searches failed; panel shows no results
    Failed,
}

/// Handle to a scheduled search
#[derive(Debug)]
pub struct SearchTicket {
    pub generation: u64,
    pub term: String,
    handle: JoinHandle<SearchCompletion>,
}

impl SearchTicket {
    /// Wait for the search task to finish
    pub async fn completion(self) -> SearchCompletion {
        match self.handle.await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(generation = self.generation, "Search task did not complete: {}", e);
                SearchCompletion::Stale
            }
        }
    }
}

struct Inner {
    catalog: Arc<dyn SongSearch>,
    library: Arc<dyn SongSearch>,
    generation: AtomicU64,
    panel: RwLock<PanelState>,
    events: EventBus,
    settings: DispatcherSettings,
}

/// Owns the search panel state and the request generation counter
#[derive(Clone)]
pub struct SearchDispatcher {
    inner: Arc<Inner>,
}

impl SearchDispatcher {
    pub fn new(
        catalog: Arc<dyn SongSearch>,
        library: Arc<dyn SongSearch>,
        settings: DispatcherSettings,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                library,
                generation: AtomicU64::new(0),
                panel: RwLock::new(PanelState::default()),
                events,
                settings,
            }),
        }
    }

    /// Handle one change of the search input
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn input(&self, text: &str) -> InputOutcome {
        let term = text.trim();
        let mut panel = self.inner.panel.write().await;

        if term.is_empty() {
            let generation = self.inner.next_generation();
            panel.reset_to_browse();
            self.inner.emit_state(&panel, generation);
            debug!(generation, "Search cleared");
            return InputOutcome::Cleared;
        }

        if panel.searching && panel.query == term {
            debug!(term = %term, "Search already in flight");
            return InputOutcome::Duplicate;
        }

        let generation = self.inner.next_generation();
        panel.begin_search(term);
        self.inner.emit_state(&panel, generation);
        drop(panel);

        let inner = Arc::clone(&self.inner);
        let owned_term = term.to_string();
        let handle = tokio::spawn(async move { inner.run(generation, owned_term).await });

        InputOutcome::Scheduled(SearchTicket {
            generation,
            term: term.to_string(),
            handle,
        })
    }

    /// Switch tabs; the search tab can only be selected while it is visible
    pub async fn select_tab(&self, tab: PanelTab) -> Result<PanelSnapshot> {
        let mut panel = self.inner.panel.write().await;
        if tab == PanelTab::Search && !panel.search_tab_visible() {
            return Err(Error::InvalidInput(
                "search tab is hidden until a search runs".to_string(),
            ));
        }
        panel.selected = tab;
        self.inner.events.emit_lossy(ThinEvent::TabChanged {
            tab,
            timestamp: chrono::Utc::now(),
        });
        Ok(panel.snapshot(self.current_generation()))
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let panel = self.inner.panel.read().await;
        panel.snapshot(self.current_generation())
    }

    /// Latest generation handed out
    pub fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation < self.generation.load(Ordering::SeqCst)
    }

    fn emit_state(&self, panel: &PanelState, generation: u64) {
        self.events.emit_lossy(ThinEvent::SearchStateChanged {
            query: panel.query.clone(),
            searching: panel.searching,
            result_count: panel.results.len(),
            generation,
            timestamp: chrono::Utc::now(),
        });
    }

    async fn run(self: Arc<Self>, generation: u64, term: String) -> SearchCompletion {
        tokio::time::sleep(self.settings.debounce).await;

        if self.is_stale(generation) {
            debug!(generation, term = %term, "Search superseded before dispatch");
            return SearchCompletion::Superseded;
        }

        debug!(generation, term = %term, "Dispatching catalog and library search");
        let limit = self.settings.search_limit;
        let (global, library) = tokio::join!(
            self.catalog.search(&term, limit),
            self.library.search(&term, limit),
        );

        let both_failed = global.is_err() && library.is_err();
        let global = songs_or_empty(global, self.catalog.scope().label(), generation);
        let library = songs_or_empty(library, self.library.scope().label(), generation);

        let merged = if both_failed {
            MergedResult::empty()
        } else {
            reconcile(&retain_playable(library), &retain_playable(global))
        };

        // Check and commit under one lock so a new input cannot slip in between
        let mut panel = self.panel.write().await;
        if self.is_stale(generation) {
            debug!(generation, term = %term, "Discarding stale search results");
            return SearchCompletion::Stale;
        }

        let result_count = merged.len();
        panel.finish_search(merged);
        self.emit_state(&panel, generation);

        if both_failed {
            warn!(generation, term = %term, "Catalog and library search both failed");
            SearchCompletion::Failed
        } else {
            info!(generation, term = %term, result_count, "Search results ready");
            SearchCompletion::Committed { result_count }
        }
    }
}

/// A failed search contributes no songs
fn songs_or_empty(
    result: std::result::Result<Vec<Track>, MusicApiError>,
    source: &str,
    generation: u64,
) -> Vec<Track> {
    match result {
        Ok(songs) => songs,
        Err(MusicApiError::MissingCredentials(what)) => {
            debug!(generation, source, "Skipping search without {}", what);
            Vec::new()
        }
        Err(e) => {
            warn!(generation, source, "Search failed: {}", e);
            Vec::new()
        }
    }
}
