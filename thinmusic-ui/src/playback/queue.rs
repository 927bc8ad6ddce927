//! Playback queue surface of the streaming SDK, plus an in-process stand-in

use async_trait::async_trait;
use serde::Serialize;
use thinmusic_common::{Error, Result, Track};
use tokio::sync::Mutex;
use uuid::Uuid;

/// One queued track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueItem {
    pub entry_id: Uuid,
    pub track: Track,
}

impl QueueItem {
    fn new(track: Track) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            track,
        }
    }
}

/// Operations the player exposes for queue control
#[async_trait]
pub trait PlaybackQueue: Send + Sync {
    async fn is_empty(&self) -> bool;

    /// Replace the whole queue; the first item becomes now playing
    async fn set_queue(&self, tracks: Vec<Track>) -> Result<()>;

    /// Start playing the now-playing item
    async fn play(&self) -> Result<()>;

    async fn stop(&self);

    async fn is_playing(&self) -> bool;

    /// Insert directly after the now-playing item
    async fn prepend(&self, track: Track) -> Result<()>;

    /// Insert at the end of the queue
    async fn append(&self, track: Track) -> Result<()>;

    /// Jump to `index` and play it
    async fn change_to_index(&self, index: usize) -> Result<()>;

    async fn now_playing_index(&self) -> Option<usize>;

    async fn items(&self) -> Vec<QueueItem>;
}

#[derive(Debug, Default)]
struct QueueInner {
    items: Vec<QueueItem>,
    now_playing: Option<usize>,
    playing: bool,
}

/// Queue kept in memory, for running without the SDK and for tests
#[derive(Debug, Default)]
pub struct MemoryQueue {
    inner: Mutex<QueueInner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_playable(track: &Track) -> Result<()> {
    if track.is_playable() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("track {} has no play parameters", track.id)))
    }
}

#[async_trait]
impl PlaybackQueue for MemoryQueue {
    async fn is_empty(&self) -> bool {
        self.inner.lock().await.items.is_empty()
    }

    async fn set_queue(&self, tracks: Vec<Track>) -> Result<()> {
        for track in &tracks {
            ensure_playable(track)?;
        }
        let mut inner = self.inner.lock().await;
        inner.items = tracks.into_iter().map(QueueItem::new).collect();
        inner.now_playing = if inner.items.is_empty() { None } else { Some(0) };
        inner.playing = false;
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.items.is_empty() {
            return Err(Error::InvalidInput("queue is empty".to_string()));
        }
        if inner.now_playing.is_none() {
            inner.now_playing = Some(0);
        }
        inner.playing = true;
        Ok(())
    }

    async fn stop(&self) {
        self.inner.lock().await.playing = false;
    }

    async fn is_playing(&self) -> bool {
        self.inner.lock().await.playing
    }

    async fn prepend(&self, track: Track) -> Result<()> {
        ensure_playable(&track)?;
        let mut inner = self.inner.lock().await;
        let position = inner.now_playing.map_or(0, |i| i + 1);
        inner.items.insert(position, QueueItem::new(track));
        Ok(())
    }

    async fn append(&self, track: Track) -> Result<()> {
        ensure_playable(&track)?;
        self.inner.lock().await.items.push(QueueItem::new(track));
        Ok(())
    }

    async fn change_to_index(&self, index: usize) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if index >= inner.items.len() {
            return Err(Error::InvalidInput(format!(
                "queue index {} out of range (length {})",
                index,
                inner.items.len()
            )));
        }
        inner.now_playing = Some(index);
        inner.playing = true;
        Ok(())
    }

    async fn now_playing_index(&self) -> Option<usize> {
        self.inner.lock().await.now_playing
    }

    async fn items(&self) -> Vec<QueueItem> {
        self.inner.lock().await.items.clone()
    }
}
