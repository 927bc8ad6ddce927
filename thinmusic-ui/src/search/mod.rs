//! Search panel: debounced dispatch of catalog + library searches

pub mod dispatcher;
pub mod state;

pub use dispatcher::{
    DispatcherSettings, InputOutcome, InputSummary, SearchCompletion, SearchDispatcher,
    SearchTicket,
};
pub use state::{PanelSnapshot, PanelState, ResultView};
