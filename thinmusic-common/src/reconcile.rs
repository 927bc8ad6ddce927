//! Search result reconciliation
//!
//! Merges the user's library search results with the global catalog search
//! results for the same term into one ranked list:
//!
//! 1. Catalog songs the user also has in their library, in catalog order
//! 2. Catalog-only songs, up to 5 (or `10 - library.len()` when the library
//!    returned fewer than 5 songs)
//! 3. Library songs not already listed, up to 5
//! 4. Everything capped at 10
//!
//! Inputs are expected to contain playable tracks only; see
//! [`crate::track::retain_playable`].

use serde::Serialize;
use std::collections::HashSet;

use crate::track::Track;

/// Maximum number of merged results
pub const MAX_RESULTS: usize = 10;

/// Catalog-only results shown once the library returned at least this many songs
pub const CATALOG_FLOOR: usize = 5;

/// Maximum number of library songs appended after the catalog passes
pub const LIBRARY_REMAINDER_LIMIT: usize = 5;

/// Ranked, de-duplicated, capped search results
///
/// Only [`reconcile`] constructs non-empty values, so every `MergedResult`
/// holds at most [`MAX_RESULTS`] tracks with distinct catalog identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedResult {
    tracks: Vec<Track>,
}

impl MergedResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Resource ids in result order
    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }
}

impl IntoIterator for MergedResult {
    type Item = Track;
    type IntoIter = std::vec::IntoIter<Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

impl<'a> IntoIterator for &'a MergedResult {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// Number of catalog-only songs the second pass may add
pub fn catalog_only_limit(library_len: usize) -> usize {
    if library_len >= CATALOG_FLOOR {
        CATALOG_FLOOR
    } else {
        MAX_RESULTS - library_len
    }
}

/// Merge library and catalog results for one search term
///
/// Never fails; two empty inputs produce an empty result.
pub fn reconcile(library_songs: &[Track], global_songs: &[Track]) -> MergedResult {
    // Catalog ids the library links to
    let in_library: HashSet<&str> = library_songs
        .iter()
        .filter_map(Track::catalog_link)
        .collect();

    let mut listed: HashSet<&str> = HashSet::with_capacity(MAX_RESULTS * 2);
    let mut tracks: Vec<Track> = Vec::with_capacity(MAX_RESULTS);

    // 1. In both sources: catalog record first
    for track in global_songs {
        let id = track.id.as_str();
        if in_library.contains(id) && listed.insert(id) {
            tracks.push(track.clone());
        }
    }

    // 2. Catalog-only songs
    let limit = catalog_only_limit(library_songs.len());
    let mut added = 0;
    for track in global_songs {
        if added >= limit {
            break;
        }
        let id = track.id.as_str();
        if in_library.contains(id) || !listed.insert(id) {
            continue;
        }
        tracks.push(track.clone());
        added += 1;
    }

    // 3. Remaining library songs
    added = 0;
    for track in library_songs {
        if added >= LIBRARY_REMAINDER_LIMIT {
            break;
        }
        if listed.insert(track.catalog_identity()) {
            tracks.push(track.clone());
            added += 1;
        }
    }

    // 4. Cap
    tracks.truncate(MAX_RESULTS);

    MergedResult { tracks }
}
