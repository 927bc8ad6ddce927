//! Play now / play next / play last on top of a [`PlaybackQueue`]

use serde::Serialize;
use std::sync::Arc;
use thinmusic_common::events::{EventBus, ThinEvent};
use thinmusic_common::track::retain_playable;
use thinmusic_common::{Error, Result, Track};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::queue::{PlaybackQueue, QueueItem};

/// Queue contents as shown on the Playing tab
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    pub items: Vec<QueueItem>,
    pub now_playing_index: Option<usize>,
    pub playing: bool,
}

/// Queue commands run one at a time
///
/// Each command reads the queue and then mutates it; `commands` is held for the
/// whole sequence so concurrent requests cannot act on a stale view.
pub struct PlaybackController {
    queue: Arc<dyn PlaybackQueue>,
    events: EventBus,
    commands: Mutex<()>,
}

impl PlaybackController {
    pub fn new(queue: Arc<dyn PlaybackQueue>, events: EventBus) -> Self {
        Self {
            queue,
            events,
            commands: Mutex::new(()),
        }
    }

    /// Play immediately, keeping the rest of the queue behind it
    pub async fn play_now(&self, track: Track) -> Result<QueueSnapshot> {
        let _guard = self.commands.lock().await;
        self.play_now_locked(track).await
    }

    /// Queue right after the current track
    pub async fn play_next(&self, track: Track) -> Result<QueueSnapshot> {
        let _guard = self.commands.lock().await;
        if self.queue.is_empty().await {
            return self.play_now_locked(track).await;
        }
        debug!(track_id = %track.id, "Play next");
        self.queue.prepend(track).await?;
        self.publish(false).await
    }

    /// Queue at the end
    pub async fn play_last(&self, track: Track) -> Result<QueueSnapshot> {
        let _guard = self.commands.lock().await;
        if self.queue.is_empty().await {
            return self.play_now_locked(track).await;
        }
        debug!(track_id = %track.id, "Play last");
        self.queue.append(track).await?;
        self.publish(false).await
    }

    /// Replace the queue with a collection (album, playlist) and start it
    ///
    /// Tracks without play parameters are dropped first.
    pub async fn play_collection_now(&self, tracks: Vec<Track>) -> Result<QueueSnapshot> {
        let total = tracks.len();
        let playable = retain_playable(tracks);
        if playable.is_empty() {
            return Err(Error::InvalidInput(
                "collection has no playable tracks".to_string(),
            ));
        }
        info!(
            playable = playable.len(),
            skipped = total - playable.len(),
            "Play collection now"
        );

        let _guard = self.commands.lock().await;
        self.queue.set_queue(playable).await?;
        self.queue.play().await?;
        self.publish(true).await
    }

    pub async fn stop(&self) {
        let _guard = self.commands.lock().await;
        if self.queue.is_playing().await {
            self.queue.stop().await;
            self.events.emit_lossy(ThinEvent::PlaybackStateChanged {
                playing: false,
                timestamp: chrono::Utc::now(),
            });
            info!("Playback stopped");
        }
    }

    pub async fn is_playing(&self) -> bool {
        self.queue.is_playing().await
    }

    pub async fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            items: self.queue.items().await,
            now_playing_index: self.queue.now_playing_index().await,
            playing: self.queue.is_playing().await,
        }
    }

    async fn play_now_locked(&self, track: Track) -> Result<QueueSnapshot> {
        info!(track_id = %track.id, "Play now");
        if self.queue.is_empty().await {
            self.queue.set_queue(vec![track]).await?;
            self.queue.play().await?;
        } else {
            self.queue.prepend(track).await?;
            let target = self.queue.now_playing_index().await.map_or(0, |i| i + 1);
            self.queue.change_to_index(target).await?;
        }
        self.publish(true).await
    }

    async fn publish(&self, started: bool) -> Result<QueueSnapshot> {
        let snapshot = self.snapshot().await;
        self.events.emit_lossy(ThinEvent::QueueChanged {
            length: snapshot.items.len(),
            now_playing_index: snapshot.now_playing_index,
            timestamp: chrono::Utc::now(),
        });
        if started {
            self.events.emit_lossy(ThinEvent::PlaybackStateChanged {
                playing: snapshot.playing,
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::MemoryQueue;
    use async_trait::async_trait;

    /// Yields to the scheduler before every queue call so that concurrent
    /// commands interleave between their reads and writes
    #[derive(Default)]
    struct YieldingQueue(MemoryQueue);

    #[async_trait]
    impl PlaybackQueue for YieldingQueue {
        async fn is_empty(&self) -> bool {
            tokio::task::yield_now().await;
            self.0.is_empty().await
        }

        async fn set_queue(&self, tracks: Vec<Track>) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.set_queue(tracks).await
        }

        async fn play(&self) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.play().await
        }

        async fn stop(&self) {
            tokio::task::yield_now().await;
            self.0.stop().await
        }

        async fn is_playing(&self) -> bool {
            self.0.is_playing().await
        }

        async fn prepend(&self, track: Track) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.prepend(track).await
        }

        async fn append(&self, track: Track) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.append(track).await
        }

        async fn change_to_index(&self, index: usize) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.change_to_index(index).await
        }

        async fn now_playing_index(&self) -> Option<usize> {
            self.0.now_playing_index().await
        }

        async fn items(&self) -> Vec<QueueItem> {
            self.0.items().await
        }
    }

    fn controller() -> (PlaybackController, EventBus) {
        let events = EventBus::new(32);
        (
            PlaybackController::new(Arc::new(MemoryQueue::new()), events.clone()),
            events,
        )
    }

    fn ids(snapshot: &QueueSnapshot) -> Vec<&str> {
        snapshot.items.iter().map(|i| i.track.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_play_now_on_empty_queue_starts_playback() {
        let (controller, _events) = controller();

        let snapshot = controller.play_now(Track::catalog("1", "a")).await.unwrap();

        assert_eq!(ids(&snapshot), vec!["1"]);
        assert_eq!(snapshot.now_playing_index, Some(0));
        assert!(snapshot.playing);
    }

    #[tokio::test]
    async fn test_play_now_jumps_to_inserted_track() {
        let (controller, _events) = controller();
        controller.play_now(Track::catalog("1", "a")).await.unwrap();
        controller.play_last(Track::catalog("2", "b")).await.unwrap();

        let snapshot = controller.play_now(Track::catalog("3", "c")).await.unwrap();

        assert_eq!(ids(&snapshot), vec!["1", "3", "2"]);
        assert_eq!(snapshot.now_playing_index, Some(1));
    }

    #[tokio::test]
    async fn test_play_next_and_last_ordering() {
        let (controller, _events) = controller();
        controller.play_now(Track::catalog("1", "a")).await.unwrap();
        controller.play_last(Track::catalog("2", "b")).await.unwrap();
        controller.play_last(Track::catalog("3", "c")).await.unwrap();

        let snapshot = controller.play_next(Track::catalog("4", "d")).await.unwrap();

        assert_eq!(ids(&snapshot), vec!["1", "4", "2", "3"]);
        assert_eq!(snapshot.now_playing_index, Some(0));
    }

    #[tokio::test]
    async fn test_play_next_on_empty_queue_plays_now() {
        let (controller, _events) = controller();
        let snapshot = controller.play_next(Track::catalog("1", "a")).await.unwrap();
        assert!(snapshot.playing);
        assert_eq!(ids(&snapshot), vec!["1"]);
    }

    #[tokio::test]
    async fn test_collection_drops_unplayable_tracks() {
        let (controller, _events) = controller();
        controller.play_now(Track::catalog("old", "x")).await.unwrap();

        let snapshot = controller
            .play_collection_now(vec![
                Track::catalog("1", "a"),
                Track::catalog("2", "b").without_play_params(),
                Track::catalog("3", "c"),
            ])
            .await
            .unwrap();

        assert_eq!(ids(&snapshot), vec!["1", "3"]);
        assert!(snapshot.playing);
    }

    #[tokio::test]
    async fn test_collection_without_playable_tracks_rejected() {
        let (controller, _events) = controller();
        let result = controller
            .play_collection_now(vec![Track::catalog("1", "a").without_play_params()])
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_queue_change_emits_event() {
        let (controller, events) = controller();
        let mut rx = events.subscribe();

        controller.play_now(Track::catalog("1", "a")).await.unwrap();

        match rx.recv().await.unwrap() {
            ThinEvent::QueueChanged { length, .. } => assert_eq!(length, 1),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_only_when_playing() {
        let (controller, _events) = controller();
        controller.stop().await;
        assert!(!controller.is_playing().await);

        controller.play_now(Track::catalog("1", "a")).await.unwrap();
        controller.stop().await;
        assert!(!controller.is_playing().await);
    }

    #[tokio::test]
    async fn test_concurrent_play_now_keeps_both_tracks() {
        let controller = PlaybackController::new(
            Arc::new(YieldingQueue::default()),
            EventBus::new(32),
        );

        let (first, second) = tokio::join!(
            controller.play_now(Track::catalog("1", "a")),
            controller.play_now(Track::catalog("2", "b")),
        );
        first.unwrap();
        second.unwrap();

        let snapshot = controller.snapshot().await;
        assert_eq!(ids(&snapshot), vec!["1", "2"]);
        assert_eq!(snapshot.now_playing_index, Some(1));
        assert!(snapshot.playing);
    }

    #[tokio::test]
    async fn test_concurrent_play_last_on_empty_queue_keeps_order() {
        let controller = PlaybackController::new(
            Arc::new(YieldingQueue::default()),
            EventBus::new(32),
        );

        let (first, second, third) = tokio::join!(
            controller.play_last(Track::catalog("1", "a")),
            controller.play_last(Track::catalog("2", "b")),
            controller.play_last(Track::catalog("3", "c")),
        );
        first.unwrap();
        second.unwrap();
        third.unwrap();

        let snapshot = controller.snapshot().await;
        assert_eq!(ids(&snapshot), vec!["1", "2", "3"]);
        assert_eq!(snapshot.now_playing_index, Some(0));
    }
}
