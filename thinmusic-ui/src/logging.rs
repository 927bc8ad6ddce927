//! Tracing subscriber setup
//!
//! The subscriber is installed before the config file is read so that config
//! loading is logged. Filter priority:
//!
//! 1. `RUST_LOG`
//! 2. `log_level` from the resolved config, applied once it is known
//! 3. `--log-level` / `THINMUSIC_LOG_LEVEL`, or `info`, until then

use anyhow::{Context, Result};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Directives for our crates at `level`
pub fn service_directives(level: &str) -> String {
    format!(
        "thinmusic_ui={0},thinmusic_common={0},tower_http=info",
        level
    )
}

/// Lets the filter follow the resolved config after startup
pub struct LogControl {
    /// `None` when `RUST_LOG` fixed the filter
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogControl {
    /// Switch our crates to `level`; no-op when `RUST_LOG` is set
    pub fn apply_level(&self, level: &str) -> Result<()> {
        match &self.handle {
            Some(handle) => handle
                .reload(EnvFilter::new(service_directives(level)))
                .with_context(|| format!("Failed to apply log level {}", level)),
            None => Ok(()),
        }
    }
}

/// Wrap `filter` in a reloadable layer
///
/// `adjustable` is false when the filter came from the environment.
pub fn reloadable(
    filter: EnvFilter,
    adjustable: bool,
) -> (reload::Layer<EnvFilter, Registry>, LogControl) {
    let (layer, handle) = reload::Layer::new(filter);
    let control = LogControl {
        handle: adjustable.then_some(handle),
    };
    (layer, control)
}

/// Install the global subscriber
///
/// Call once, first thing in `main`.
pub fn init(initial_level: &str) -> LogControl {
    let (filter, adjustable) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(service_directives(initial_level)), true),
    };
    let (filter, control) = reloadable(filter, adjustable);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    control
}
