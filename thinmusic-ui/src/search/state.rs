//! Panel state: selected tab, current query, and search results

use serde::Serialize;
use thinmusic_common::events::PanelTab;
use thinmusic_common::MergedResult;

/// What the search tab shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultView {
    Spinner,
    NoResults,
    Results,
}

#[derive(Debug, Clone)]
pub struct PanelState {
    pub selected: PanelTab,
    pub query: String,
    pub searching: bool,
    pub results: MergedResult,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            selected: PanelTab::Browse,
            query: String::new(),
            searching: false,
            results: MergedResult::empty(),
        }
    }
}

impl PanelState {
    /// Back to browsing with nothing pending
    pub fn reset_to_browse(&mut self) {
        self.selected = PanelTab::Browse;
        self.query.clear();
        self.searching = false;
        self.results = MergedResult::empty();
    }

    pub fn begin_search(&mut self, term: &str) {
        self.query = term.to_string();
        self.selected = PanelTab::Search;
        self.searching = true;
    }

    pub fn finish_search(&mut self, results: MergedResult) {
        self.results = results;
        self.searching = false;
    }

    /// The search tab exists only while searching or when there is something to show
    pub fn search_tab_visible(&self) -> bool {
        self.searching || !self.results.is_empty()
    }

    pub fn result_view(&self) -> ResultView {
        if self.searching {
            ResultView::Spinner
        } else if self.results.is_empty() {
            ResultView::NoResults
        } else {
            ResultView::Results
        }
    }

    pub fn snapshot(&self, generation: u64) -> PanelSnapshot {
        PanelSnapshot {
            selected: self.selected,
            query: self.query.clone(),
            searching: self.searching,
            search_tab_visible: self.search_tab_visible(),
            view: self.result_view(),
            results: self.results.clone(),
            generation,
        }
    }
}

/// Serializable view of [`PanelState`]
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub selected: PanelTab,
    pub query: String,
    pub searching: bool,
    pub search_tab_visible: bool,
    pub view: ResultView,
    pub results: MergedResult,
    pub generation: u64,
}
