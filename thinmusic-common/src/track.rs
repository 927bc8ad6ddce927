//! Track records as delivered by the streaming service
//!
//! Catalog songs carry their catalog identifier in `id`. Library songs carry a
//! library-scoped `id` and, when they correspond to a catalog entry, link to it
//! through `attributes.playParams.catalogId`.

use serde::{Deserialize, Serialize};

/// A playable song resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Resource identifier (catalog id for catalog songs, `i.…` for library songs)
    pub id: String,
    /// Resource type, e.g. `songs` or `library-songs`
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: TrackAttributes,
}

/// Display and playback attributes of a track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_millis: Option<u64>,
    /// Absent when the track cannot be played (region locked, removed, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_params: Option<PlayParams>,
}

/// Parameters the player needs to start a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayParams {
    pub id: String,
    pub kind: String,
    /// Catalog counterpart of a library song
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub is_library: bool,
}

impl Track {
    /// Build a catalog song
    pub fn catalog(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            attributes: TrackAttributes {
                name: name.into(),
                play_params: Some(PlayParams {
                    id: id.clone(),
                    kind: "song".to_string(),
                    catalog_id: None,
                    is_library: false,
                }),
                ..Default::default()
            },
            id,
            kind: "songs".to_string(),
        }
    }

    /// Build a library song, optionally linked to a catalog id
    pub fn library(
        id: impl Into<String>,
        name: impl Into<String>,
        catalog_id: Option<&str>,
    ) -> Self {
        let id = id.into();
        Self {
            attributes: TrackAttributes {
                name: name.into(),
                play_params: Some(PlayParams {
                    id: id.clone(),
                    kind: "song".to_string(),
                    catalog_id: catalog_id.map(str::to_string),
                    is_library: true,
                }),
                ..Default::default()
            },
            id,
            kind: "library-songs".to_string(),
        }
    }

    /// Drop the play parameters, making the track unplayable
    pub fn without_play_params(mut self) -> Self {
        self.attributes.play_params = None;
        self
    }

    pub fn is_playable(&self) -> bool {
        self.attributes.play_params.is_some()
    }

    /// Catalog id a library copy links to, if any
    pub fn catalog_link(&self) -> Option<&str> {
        self.attributes
            .play_params
            .as_ref()
            .and_then(|p| p.catalog_id.as_deref())
    }

    /// Identity used for de-duplication across sources
    ///
    /// The catalog link when present, otherwise the resource id.
    pub fn catalog_identity(&self) -> &str {
        self.catalog_link().unwrap_or(&self.id)
    }

    pub fn is_library(&self) -> bool {
        self.attributes
            .play_params
            .as_ref()
            .map(|p| p.is_library)
            .unwrap_or(false)
    }
}

/// Remove tracks without play parameters, keeping order
pub fn retain_playable(mut tracks: Vec<Track>) -> Vec<Track> {
    tracks.retain(Track::is_playable);
    tracks
}
