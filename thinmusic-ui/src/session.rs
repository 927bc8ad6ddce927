//! Sign-in state and playback entitlement
//!
//! The auth provider itself is external; this module tracks what it reported,
//! loads the matching profile, and derives whether playback is limited to
//! previews.

use serde::Serialize;
use std::sync::Arc;
use thinmusic_common::events::{AuthState, EventBus, PlaybackMode, ThinEvent};
use thinmusic_common::{Error, Result};
use tokio::sync::RwLock;
use tracing::info;

use crate::playback::PlaybackController;
use crate::services::{LinkedAccount, ProfileStore, UserProfile};

const ANONYMOUS_NOTICE: &str = "You are listening anonymously, so tracks play as 30-second previews. \
     Sign in and connect your streaming account to hear full tracks.";

const UNLINKED_NOTICE: &str = "Your streaming account is not connected yet, so tracks play as \
     30-second previews. Connect it from settings to hear full tracks.";

/// Session state as reported to the front-end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub auth_state: AuthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    pub playback_mode: PlaybackMode,
    /// Banner text; absent when nothing needs attention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

#[derive(Debug)]
struct SessionInner {
    auth_state: AuthState,
    user: Option<UserProfile>,
}

pub struct Session {
    store: Arc<dyn ProfileStore>,
    playback: Arc<PlaybackController>,
    events: EventBus,
    inner: RwLock<SessionInner>,
}

impl Session {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        playback: Arc<PlaybackController>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            playback,
            events,
            inner: RwLock::new(SessionInner {
                auth_state: AuthState::Unknown,
                user: None,
            }),
        }
    }

    /// The auth provider reported its current user (or none)
    pub async fn provider_reported(&self, user_id: Option<&str>) -> Result<SessionSnapshot> {
        match user_id {
            Some(id) => self.sign_in(id).await,
            None => {
                let mut inner = self.inner.write().await;
                inner.auth_state = AuthState::LoggedOut;
                inner.user = None;
                Ok(self.publish(&inner))
            }
        }
    }

    /// Load the user's profile and mark the session signed in
    ///
    /// A user without a stored profile gets an empty one.
    pub async fn sign_in(&self, user_id: &str) -> Result<SessionSnapshot> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::InvalidInput("user_id must not be empty".to_string()));
        }

        let profile = self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id));

        let mut inner = self.inner.write().await;
        inner.auth_state = AuthState::LoggedIn;
        inner.user = Some(profile);
        info!(user_id = %user_id, "Signed in");
        Ok(self.publish(&inner))
    }

    /// Stop playback and forget the user
    pub async fn sign_out(&self) -> Result<SessionSnapshot> {
        self.playback.stop().await;

        let mut inner = self.inner.write().await;
        if let Some(user) = inner.user.take() {
            info!(user_id = %user.user_id, "Signed out");
        }
        inner.auth_state = AuthState::LoggedOut;
        Ok(self.publish(&inner))
    }

    /// Record a newly linked streaming account for the signed-in user
    pub async fn link_account(&self, storefront: Option<String>) -> Result<SessionSnapshot> {
        let user_id = self.require_user().await?;

        let mut profile = self
            .store
            .get(&user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id.as_str()));
        profile.apple = Some(LinkedAccount {
            linked_at: chrono::Utc::now(),
            storefront,
        });
        self.store.put(profile).await?;
        info!(user_id = %user_id, "Streaming account linked");

        self.refresh(&user_id).await
    }

    /// The streaming SDK reports it lost authorization
    ///
    /// Drops the stored account link so the profile matches reality. No-op when
    /// nobody is signed in.
    pub async fn authorization_revoked(&self) -> Result<SessionSnapshot> {
        let user_id = match self.current_user_id().await {
            Some(id) => id,
            None => return Ok(self.snapshot().await),
        };

        match self.store.unlink_account(&user_id).await {
            Ok(()) | Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        info!(user_id = %user_id, "Streaming authorization revoked");

        self.refresh(&user_id).await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        snapshot_of(&inner)
    }

    pub async fn playback_mode(&self) -> PlaybackMode {
        self.snapshot().await.playback_mode
    }

    async fn current_user_id(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .user
            .as_ref()
            .map(|u| u.user_id.clone())
    }

    async fn require_user(&self) -> Result<String> {
        self.current_user_id()
            .await
            .ok_or_else(|| Error::InvalidInput("no user is signed in".to_string()))
    }

    /// Reload the profile of a user who is still signed in
    async fn refresh(&self, user_id: &str) -> Result<SessionSnapshot> {
        let profile = self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id));

        let mut inner = self.inner.write().await;
        // Signed out while the store was busy
        if inner.user.as_ref().map(|u| u.user_id.as_str()) == Some(user_id) {
            inner.user = Some(profile);
        }
        Ok(self.publish(&inner))
    }

    fn publish(&self, inner: &SessionInner) -> SessionSnapshot {
        let snapshot = snapshot_of(inner);
        self.events.emit_lossy(ThinEvent::AuthStateChanged {
            state: snapshot.auth_state,
            playback_mode: snapshot.playback_mode,
            timestamp: chrono::Utc::now(),
        });
        snapshot
    }
}

fn snapshot_of(inner: &SessionInner) -> SessionSnapshot {
    let linked = inner
        .user
        .as_ref()
        .map(UserProfile::has_linked_account)
        .unwrap_or(false);

    let playback_mode = if inner.auth_state == AuthState::LoggedIn && linked {
        PlaybackMode::Full
    } else {
        PlaybackMode::Preview
    };

    let notice = match (inner.auth_state, linked) {
        (AuthState::Unknown, _) => None,
        (AuthState::LoggedOut, _) => Some(ANONYMOUS_NOTICE),
        (AuthState::LoggedIn, false) => Some(UNLINKED_NOTICE),
        (AuthState::LoggedIn, true) => None,
    };

    SessionSnapshot {
        auth_state: inner.auth_state,
        user: inner.user.clone(),
        playback_mode,
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::MemoryQueue;
    use crate::services::MemoryProfileStore;
    use thinmusic_common::Track;

    struct Fixture {
        session: Session,
        store: Arc<MemoryProfileStore>,
        playback: Arc<PlaybackController>,
    }

    fn fixture() -> Fixture {
        let events = EventBus::new(32);
        let store = Arc::new(MemoryProfileStore::new());
        let playback = Arc::new(PlaybackController::new(
            Arc::new(MemoryQueue::new()),
            events.clone(),
        ));
        let session = Session::new(store.clone(), playback.clone(), events);
        Fixture {
            session,
            store,
            playback,
        }
    }

    #[tokio::test]
    async fn test_starts_unknown_without_notice() {
        let f = fixture();
        let snapshot = f.session.snapshot().await;
        assert_eq!(snapshot.auth_state, AuthState::Unknown);
        assert_eq!(snapshot.playback_mode, PlaybackMode::Preview);
        assert!(snapshot.notice.is_none());
    }

    #[tokio::test]
    async fn test_anonymous_gets_preview_notice() {
        let f = fixture();
        let snapshot = f.session.provider_reported(None).await.unwrap();
        assert_eq!(snapshot.auth_state, AuthState::LoggedOut);
        assert_eq!(snapshot.notice, Some(ANONYMOUS_NOTICE));
    }

    #[tokio::test]
    async fn test_signed_in_without_link_is_preview() {
        let f = fixture();
        let snapshot = f.session.sign_in("u1").await.unwrap();
        assert_eq!(snapshot.auth_state, AuthState::LoggedIn);
        assert_eq!(snapshot.playback_mode, PlaybackMode::Preview);
        assert_eq!(snapshot.notice, Some(UNLINKED_NOTICE));
    }

    #[tokio::test]
    async fn test_linking_unlocks_full_playback() {
        let f = fixture();
        f.session.sign_in("u1").await.unwrap();

        let snapshot = f.session.link_account(Some("us".to_string())).await.unwrap();

        assert_eq!(snapshot.playback_mode, PlaybackMode::Full);
        assert!(snapshot.notice.is_none());
        assert!(f.store.get("u1").await.unwrap().unwrap().has_linked_account());
    }

    #[tokio::test]
    async fn test_link_requires_sign_in() {
        let f = fixture();
        let result = f.session.link_account(None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_revoked_authorization_unlinks_profile() {
        let f = fixture();
        f.session.sign_in("u1").await.unwrap();
        f.session.link_account(None).await.unwrap();

        let snapshot = f.session.authorization_revoked().await.unwrap();

        assert_eq!(snapshot.playback_mode, PlaybackMode::Preview);
        assert!(!f.store.get("u1").await.unwrap().unwrap().has_linked_account());
    }

    #[tokio::test]
    async fn test_revoked_while_signed_out_is_noop() {
        let f = fixture();
        f.session.provider_reported(None).await.unwrap();
        let snapshot = f.session.authorization_revoked().await.unwrap();
        assert_eq!(snapshot.auth_state, AuthState::LoggedOut);
    }

    #[tokio::test]
    async fn test_sign_out_stops_playback() {
        let f = fixture();
        f.session.sign_in("u1").await.unwrap();
        f.playback.play_now(Track::catalog("1", "a")).await.unwrap();
        assert!(f.playback.is_playing().await);

        let snapshot = f.session.sign_out().await.unwrap();

        assert_eq!(snapshot.auth_state, AuthState::LoggedOut);
        assert!(snapshot.user.is_none());
        assert!(!f.playback.is_playing().await);
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let f = fixture();
        assert!(matches!(f.session.sign_in("  ").await, Err(Error::InvalidInput(_))));
    }
}
