//! Songsterr metadata HTTP client
//!
//! Looks up the revisions of a song and picks the URL of the latest
//! notation file. One attempt per call; no retries.
//!
//! API: `GET {base_url}/api/meta/{id}/revisions`

use super::dto::Revision;
use super::link::SongId;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{Error, Result};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build `builder`, falling back to a stock client if it is rejected.
///
/// The fallback loses the builder's settings, so it is logged.
pub(crate) fn build_or_default(builder: reqwest::ClientBuilder) -> reqwest::Client {
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(
            target: "tabripp::songsterr::client",
            error = %e,
            "HTTP client configuration rejected, using defaults"
        );
        reqwest::Client::new()
    })
}

/// Songsterr API client
#[derive(Debug, Clone)]
pub struct SongsterrClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SongsterrClient {
    /// Create a client for the public Songsterr host
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against another host (mirrors, local test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http_client = build_or_default(reqwest::Client::builder().gzip(true).user_agent(USER_AGENT));

        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Underlying HTTP client for metadata requests
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Metadata endpoint for a song
    pub fn revisions_url(&self, id: &SongId) -> String {
        format!("{}/api/meta/{}/revisions", self.base_url, id)
    }

    /// Fetch all revisions of a song, in the order the API returns them
    pub async fn revisions(&self, id: &SongId) -> Result<Vec<Revision>> {
        let url = self.revisions_url(id);
        tracing::debug!(target: "tabripp::songsterr::client", %url, "Fetching revisions");

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(Error::network)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Remote {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await.map_err(Error::network)?;
        serde_json::from_slice::<Vec<Revision>>(&body)
            .map_err(|e| Error::Payload(format!("revisions for song {id}: {e}")))
    }

    /// URL of the latest revision's notation file.
    ///
    /// "Latest" is the first element as returned by the API. The value is
    /// passed through without validation or rewriting.
    pub async fn latest_source(&self, id: &SongId) -> Result<String> {
        let revisions = self.revisions(id).await?;
        let latest = revisions
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmptyResult(id.to_string()))?;

        tracing::debug!(
            target: "tabripp::songsterr::client",
            song_id = %id,
            revision = ?latest.revision_id(),
            "Selected latest revision"
        );

        latest
            .source
            .ok_or_else(|| Error::MissingField(id.to_string()))
    }
}

impl Default for SongsterrClient {
    fn default() -> Self {
        Self::new()
    }
}
