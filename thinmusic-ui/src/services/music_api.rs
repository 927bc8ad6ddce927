//! Streaming service search client
//!
//! Catalog search needs the developer token only. Library search also needs
//! the user's music token and is scoped to that user's saved songs.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thinmusic_common::config::ServiceConfig;
use thinmusic_common::Track;
use thiserror::Error;

const USER_AGENT: &str = concat!("ThinMusic/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Search client errors
#[derive(Debug, Error)]
pub enum MusicApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Which collection a search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Global catalog, `types=songs`
    Catalog,
    /// The user's library, `types=library-songs`
    Library,
}

impl SearchScope {
    pub fn resource_type(&self) -> &'static str {
        match self {
            SearchScope::Catalog => "songs",
            SearchScope::Library => "library-songs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchScope::Catalog => "catalog",
            SearchScope::Library => "library",
        }
    }
}

/// One side of a search: a term in, an ordered song list out
#[async_trait]
pub trait SongSearch: Send + Sync {
    fn scope(&self) -> SearchScope;

    /// Search songs matching `term`, ranked by relevance
    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Track>, MusicApiError>;
}

/// `{ "results": { "songs": { "data": [...] } } }`
#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: SearchResults,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResults {
    #[serde(default)]
    songs: Option<ResourceList>,
    #[serde(rename = "library-songs", default)]
    library_songs: Option<ResourceList>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceList {
    #[serde(default)]
    data: Vec<Track>,
}

/// Extract the song list for `scope` from a search response body
///
/// A body without the scope's key means no matches.
pub fn parse_search_response(body: &str, scope: SearchScope) -> Result<Vec<Track>, MusicApiError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| MusicApiError::ParseError(e.to_string()))?;

    let list = match scope {
        SearchScope::Catalog => response.results.songs,
        SearchScope::Library => response.results.library_songs,
    };

    Ok(list.map(|l| l.data).unwrap_or_default())
}

/// HTTP client for the streaming service's search endpoints
pub struct MusicApiClient {
    http_client: reqwest::Client,
    base_url: String,
    storefront: String,
    developer_token: Option<String>,
    music_user_token: Option<String>,
}

impl MusicApiClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, MusicApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MusicApiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            storefront: config.storefront.clone(),
            developer_token: config.developer_token.clone(),
            music_user_token: config.music_user_token.clone(),
        })
    }

    /// Search endpoint URL with query parameters
    pub fn search_url(&self, scope: SearchScope, term: &str, limit: u32) -> Result<Url, MusicApiError> {
        let path = match scope {
            SearchScope::Catalog => format!("{}/v1/catalog/{}/search", self.base_url, self.storefront),
            SearchScope::Library => format!("{}/v1/me/library/search", self.base_url),
        };
        let limit = limit.to_string();

        Url::parse_with_params(
            &path,
            &[
                ("term", term),
                ("limit", limit.as_str()),
                ("types", scope.resource_type()),
            ],
        )
        .map_err(|e| MusicApiError::ParseError(e.to_string()))
    }

    async fn search_scope(
        &self,
        scope: SearchScope,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Track>, MusicApiError> {
        let developer_token = self
            .developer_token
            .as_deref()
            .ok_or(MusicApiError::MissingCredentials("developer token"))?;

        let url = self.search_url(scope, term, limit)?;
        let mut request = self.http_client.get(url.clone()).bearer_auth(developer_token);

        if scope == SearchScope::Library {
            let user_token = self
                .music_user_token
                .as_deref()
                .ok_or(MusicApiError::MissingCredentials("music user token"))?;
            request = request.header("Music-User-Token", user_token);
        }

        tracing::debug!(scope = scope.label(), url = %url, "Querying search API");

        let response = request
            .send()
            .await
            .map_err(|e| MusicApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MusicApiError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(MusicApiError::ApiError(status.as_u16(), body));
        }

        let tracks = parse_search_response(&body, scope)?;
        tracing::debug!(scope = scope.label(), count = tracks.len(), "Search API returned songs");
        Ok(tracks)
    }

    /// Bind the client to one search scope
    pub fn scoped(self: &Arc<Self>, scope: SearchScope) -> ScopedSearch {
        ScopedSearch {
            client: Arc::clone(self),
            scope,
        }
    }
}

/// [`SongSearch`] over one scope of a shared [`MusicApiClient`]
pub struct ScopedSearch {
    client: Arc<MusicApiClient>,
    scope: SearchScope,
}

#[async_trait]
impl SongSearch for ScopedSearch {
    fn scope(&self) -> SearchScope {
        self.scope
    }

    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Track>, MusicApiError> {
        self.client.search_scope(self.scope, term, limit).await
    }
}
