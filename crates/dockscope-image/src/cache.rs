//! URL-keyed response cache for registry calls.
//!
//! Responses are kept in a JSON file and served untouched while younger
//! than the freshness window. Two callers missing the same key at the same
//! time may both go to the network; the last write wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dockscope_common::error::RegistryError;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Request options for [`CachedFetch::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Bypass a fresh cache entry and always hit the network.
    pub skip_cache: bool,
}

impl FetchOptions {
    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets whether the cache is bypassed.
    #[must_use]
    pub const fn skip_cache(mut self, skip: bool) -> Self {
        self.skip_cache = skip;
        self
    }
}

/// A response as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Response body as text.
    pub body: String,
    /// When the response was fetched from the network.
    pub timestamp: DateTime<Utc>,
}

impl CachedResponse {
    /// Returns whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Looks up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Fetches a URL through a cache.
#[async_trait]
pub trait CachedFetch: Send + Sync {
    /// Returns the cached response for `url` when fresh, otherwise fetches it.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails or the cache store cannot
    /// be read or written.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<CachedResponse, RegistryError>;
}

/// Returns whether a response fetched at `fetched` is still fresh at `now`.
#[must_use]
pub fn is_fresh(fetched: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - fetched).to_std().map_or(true, |age| age < ttl)
}

/// Cache backed by a JSON file and a `reqwest` client.
#[derive(Debug)]
pub struct HttpCache {
    client: reqwest::Client,
    path: PathBuf,
    ttl: Duration,
    store_lock: Mutex<()>,
}

impl HttpCache {
    /// Opens or creates a cache at the given file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn open(path: &Path, ttl: Duration, timeout: Duration) -> Result<Self, RegistryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::Cache {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dockscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            path: path.to_path_buf(),
            ttl,
            store_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, CachedResponse>, RegistryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.cache_error(e.to_string())),
        };
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable request cache");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_entries(
        &self,
        entries: &BTreeMap<String, CachedResponse>,
    ) -> Result<(), RegistryError> {
        let json =
            serde_json::to_string_pretty(entries).map_err(|e| self.cache_error(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.cache_error(e.to_string()))
    }

    async fn lookup(&self, url: &str) -> Result<Option<CachedResponse>, RegistryError> {
        let _guard = self.store_lock.lock().await;
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(url))
    }

    async fn upsert(&self, url: &str, response: &CachedResponse) -> Result<(), RegistryError> {
        let _guard = self.store_lock.lock().await;
        let mut entries = self.read_entries().await?;
        let _ = entries.insert(url.to_string(), response.clone());
        self.write_entries(&entries).await
    }

    async fn fetch_remote(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<CachedResponse, RegistryError> {
        let mut request = self.client.get(url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let transport = |e: reqwest::Error| RegistryError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(transport)?;
        Ok(CachedResponse {
            status,
            headers,
            body,
            timestamp: Utc::now(),
        })
    }

    fn cache_error(&self, message: String) -> RegistryError {
        RegistryError::Cache {
            path: self.path.clone(),
            message,
        }
    }
}

#[async_trait]
impl CachedFetch for HttpCache {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<CachedResponse, RegistryError> {
        if !options.skip_cache {
            if let Some(cached) = self.lookup(url).await? {
                if is_fresh(cached.timestamp, Utc::now(), self.ttl) {
                    tracing::debug!(url, "request cache hit");
                    return Ok(cached);
                }
            }
        }

        tracing::debug!(url, "request cache miss");
        let response = self.fetch_remote(url, options).await?;
        // Error responses are not kept; a transient 429 must not stick for a day.
        if response.is_success() {
            self.upsert(url, &response).await?;
        }
        Ok(response)
    }
}
