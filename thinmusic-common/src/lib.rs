//! # ThinMusic Common Library
//!
//! Shared code for the ThinMusic service including:
//! - Track records as returned by the streaming service
//! - Search result reconciliation (library + catalog merge)
//! - Event types (ThinEvent enum) and EventBus
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod events;
pub mod reconcile;
pub mod track;

pub use error::{Error, Result};
pub use reconcile::{reconcile, MergedResult};
pub use track::Track;
