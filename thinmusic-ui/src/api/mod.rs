//! HTTP API handlers for thinmusic-ui

pub mod health;
pub mod queue;
pub mod search;
pub mod session;
pub mod sse;

pub use health::health_routes;
pub use sse::event_stream;
