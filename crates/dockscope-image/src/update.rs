//! Registry update checks.
//!
//! Compares the digest the engine recorded for an image with the digest
//! the registry currently serves for the same `repository:tag`.

use std::fmt;

use dockscope_common::error::RegistryError;
use serde::{Deserialize, Serialize};

use crate::cache::{CachedFetch, FetchOptions};
use crate::reference::ImageRef;
use crate::registry::{CONTENT_DIGEST_HEADER, MANIFEST_ACCEPT, Registry};

/// Outcome of an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateStatus {
    /// The local digest matches the registry.
    UpToDate,
    /// The registry serves a different digest for the tag.
    UpdateAvailable,
    /// The compose file pins a digest, so no update is looked for.
    UpdateBlocked,
    /// The check could not be made.
    Unknown,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UpToDate => "up-to-date",
            Self::UpdateAvailable => "update-available",
            Self::UpdateBlocked => "update-blocked",
            Self::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// Result of checking one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCheck {
    /// Status.
    pub status: UpdateStatus,
    /// Human-readable explanation.
    pub message: String,
    /// Repository page, when the registry has one.
    pub url: Option<String>,
}

impl UpdateCheck {
    fn new(status: UpdateStatus, message: impl Into<String>, url: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            url,
        }
    }

    /// An `unknown` result explaining why.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(UpdateStatus::Unknown, message, None)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Checks whether a newer build of an image's tag is available.
///
/// `live` is the reference derived from the engine, `declared` the one from
/// the compose file, if any. No retries are made.
///
/// # Errors
///
/// Returns an error if the token or manifest request fails.
pub async fn check_for_update(
    fetcher: &dyn CachedFetch,
    live: &ImageRef,
    declared: Option<&ImageRef>,
) -> Result<UpdateCheck, RegistryError> {
    if declared.is_some_and(|d| d.digest.is_some()) {
        return Ok(UpdateCheck::new(
            UpdateStatus::UpdateBlocked,
            "The image is pinned to a digest, update checks are skipped",
            None,
        ));
    }

    let (Some(host), Some(repository), Some(tag)) = (
        live.registry.as_deref(),
        live.repository.as_deref(),
        live.tag.as_deref(),
    ) else {
        return Ok(UpdateCheck::unknown(
            "The image was built locally and has no registry to compare against",
        ));
    };

    let Some(registry) = Registry::from_host(host) else {
        return Ok(UpdateCheck::unknown(format!(
            "Registry {host} is not supported for update checks"
        )));
    };
    let url = Some(registry.web_url(repository));

    let token = fetch_token(fetcher, registry, repository).await?;
    let manifest_url = registry.manifest_url(repository, tag);
    let options = FetchOptions::default()
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", MANIFEST_ACCEPT);
    let manifest = fetcher.fetch(&manifest_url, &options).await?;
    if !manifest.is_success() {
        return Err(RegistryError::Status {
            url: manifest_url,
            status: manifest.status,
        });
    }

    let (Some(remote), Some(local)) = (
        manifest.header(CONTENT_DIGEST_HEADER),
        live.digest.as_deref(),
    ) else {
        return Ok(UpdateCheck::new(
            UpdateStatus::Unknown,
            "No digest available to compare",
            url,
        ));
    };

    tracing::debug!(%registry, repository, tag, local, remote, "compared digests");
    if remote == local {
        Ok(UpdateCheck::new(
            UpdateStatus::UpToDate,
            format!("{repository}:{tag} is up to date"),
            url,
        ))
    } else {
        Ok(UpdateCheck::new(
            UpdateStatus::UpdateAvailable,
            format!("A newer build of {repository}:{tag} is available"),
            url,
        ))
    }
}

/// Like [`check_for_update`], but folds any error into an `unknown` result.
pub async fn check_or_unknown(
    fetcher: &dyn CachedFetch,
    live: &ImageRef,
    declared: Option<&ImageRef>,
) -> UpdateCheck {
    match check_for_update(fetcher, live, declared).await {
        Ok(check) => check,
        Err(e) => {
            tracing::warn!(image = %live, error = %e, "update check failed");
            UpdateCheck::unknown(e.to_string())
        }
    }
}

async fn fetch_token(
    fetcher: &dyn CachedFetch,
    registry: Registry,
    repository: &str,
) -> Result<String, RegistryError> {
    let url = registry.token_url(repository);
    // Tokens live for minutes, never serve one from the day-long cache.
    let response = fetcher
        .fetch(&url, &FetchOptions::default().skip_cache(true))
        .await?;
    if !response.is_success() {
        return Err(RegistryError::Token {
            registry: registry.to_string(),
            message: format!("status {}", response.status),
        });
    }
    let parsed: TokenResponse =
        serde_json::from_str(&response.body).map_err(|e| RegistryError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;
    parsed
        .token
        .or(parsed.access_token)
        .ok_or_else(|| RegistryError::Token {
            registry: registry.to_string(),
            message: "response carries no token".into(),
        })
}
