//! User profile store
//!
//! Profiles are keyed by the auth provider's user id and record whether the
//! user has linked a streaming account, which unlocks full-length playback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thinmusic_common::{Error, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// A linked streaming account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub linked_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storefront: Option<String>,
}

/// Stored profile document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple: Option<LinkedAccount>,
}

impl UserProfile {
    /// Profile for a user who has not linked anything yet
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            apple: None,
        }
    }

    pub fn has_linked_account(&self) -> bool {
        self.apple.is_some()
    }
}

/// Document store holding user profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Insert or replace a profile
    async fn put(&self, profile: UserProfile) -> Result<()>;

    /// Remove the linked streaming account from a profile
    async fn unlink_account(&self, user_id: &str) -> Result<()>;
}

/// In-process profile store
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn put(&self, profile: UserProfile) -> Result<()> {
        if profile.user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user_id must not be empty".to_string()));
        }
        debug!(user_id = %profile.user_id, "Storing profile");
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn unlink_account(&self, user_id: &str) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))?;
        profile.apple = None;
        debug!(user_id = %user_id, "Unlinked streaming account");
        Ok(())
    }
}
