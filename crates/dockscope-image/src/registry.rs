//! Public registries that support anonymous update checks.

use std::fmt;

use crate::reference::ImageRef;

/// Media types accepted when asking for a manifest, index types first so
/// multi-platform images report the digest the engine stored at pull time.
pub const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.oci.image.manifest.v1+json";

/// Response header carrying the manifest digest.
pub const CONTENT_DIGEST_HEADER: &str = "docker-content-digest";

/// A registry the update checker knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    /// Docker Hub (`docker.io`).
    DockerHub,
    /// GitHub Container Registry (`ghcr.io`).
    Ghcr,
}

impl Registry {
    /// Resolves a registry host. Returns `None` for unsupported hosts.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        match host {
            "docker.io" | "index.docker.io" | "registry-1.docker.io" => Some(Self::DockerHub),
            "ghcr.io" => Some(Self::Ghcr),
            _ => None,
        }
    }

    /// URL of the anonymous pull-token endpoint for `repository`.
    #[must_use]
    pub fn token_url(self, repository: &str) -> String {
        match self {
            Self::DockerHub => format!(
                "https://auth.docker.io/token?service=registry.docker.io&scope=repository:{repository}:pull"
            ),
            Self::Ghcr => {
                format!("https://ghcr.io/token?service=ghcr.io&scope=repository:{repository}:pull")
            }
        }
    }

    /// URL of the manifest for `repository:tag`.
    #[must_use]
    pub fn manifest_url(self, repository: &str, tag: &str) -> String {
        match self {
            Self::DockerHub => {
                format!("https://registry-1.docker.io/v2/{repository}/manifests/{tag}")
            }
            Self::Ghcr => format!("https://ghcr.io/v2/{repository}/manifests/{tag}"),
        }
    }

    /// Browser URL of the repository page.
    #[must_use]
    pub fn web_url(self, repository: &str) -> String {
        match self {
            Self::DockerHub => match repository.strip_prefix("library/") {
                Some(official) => format!("https://hub.docker.com/_/{official}"),
                None => format!("https://hub.docker.com/r/{repository}"),
            },
            Self::Ghcr => format!("https://ghcr.io/{repository}"),
        }
    }

    /// Browser URL for a reference, if its registry is supported.
    #[must_use]
    pub fn web_url_for(reference: &ImageRef) -> Option<String> {
        let registry = Self::from_host(reference.registry.as_deref()?)?;
        Some(registry.web_url(reference.repository.as_deref()?))
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DockerHub => f.write_str("docker.io"),
            Self::Ghcr => f.write_str("ghcr.io"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::parse_image_ref;

    #[test]
    fn from_host_recognises_supported_registries() {
        assert_eq!(Registry::from_host("docker.io"), Some(Registry::DockerHub));
        assert_eq!(Registry::from_host("ghcr.io"), Some(Registry::Ghcr));
        assert_eq!(Registry::from_host("quay.io"), None);
    }

    #[test]
    fn docker_hub_urls() {
        let hub = Registry::DockerHub;
        assert_eq!(
            hub.manifest_url("library/nginx", "1.25"),
            "https://registry-1.docker.io/v2/library/nginx/manifests/1.25"
        );
        assert!(hub.token_url("library/nginx").contains("scope=repository:library/nginx:pull"));
    }

    #[test]
    fn web_url_uses_official_image_path() {
        assert_eq!(
            Registry::DockerHub.web_url("library/redis"),
            "https://hub.docker.com/_/redis"
        );
        assert_eq!(
            Registry::DockerHub.web_url("grafana/grafana"),
            "https://hub.docker.com/r/grafana/grafana"
        );
    }

    #[test]
    fn web_url_for_unsupported_registry_is_none() {
        assert!(Registry::web_url_for(&parse_image_ref("quay.io/a/b", false)).is_none());
        assert_eq!(
            Registry::web_url_for(&parse_image_ref("ghcr.io/acme/api", false)).as_deref(),
            Some("https://ghcr.io/acme/api")
        );
    }
}
