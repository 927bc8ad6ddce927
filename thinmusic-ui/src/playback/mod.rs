//! Playback queue adapter

pub mod controller;
pub mod queue;

pub use controller::{PlaybackController, QueueSnapshot};
pub use queue::{MemoryQueue, PlaybackQueue, QueueItem};
