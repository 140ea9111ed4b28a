//! Image reference parsing and comparison.
//!
//! A reference such as `ghcr.io/acme/api:1.4@sha256:…` is split into
//! registry, repository, tag, and digest. Parsing never fails: anything
//! that is not recognisably a registry or a tag ends up in the repository.
//!
//! Equality between references is [`ImageRef::is_same`]. When both sides
//! carry a digest only the digests are compared, so a mirror serving the
//! same content under another registry or repository counts as the same
//! image, while a digest-pinned reference and a tag-pinned reference for
//! identical content do not. This is an approximation, not a
//! content-addressed guarantee.

use std::fmt;
use std::sync::LazyLock;

use dockscope_common::constants::{DEFAULT_NAMESPACE, DEFAULT_REGISTRY, DEFAULT_TAG};
use regex::Regex;
use serde::{Deserialize, Serialize};

static TRAILING_DIGEST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("@sha256:[a-f0-9]{64}$").ok());

/// Placeholder the engine reports for untagged images.
const NONE_PLACEHOLDER: &str = "<none>";

/// Structured form of an image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// The text the reference was parsed from, untouched.
    pub raw: String,
    /// Registry host, absent for local images.
    pub registry: Option<String>,
    /// Repository path, including any namespace.
    pub repository: Option<String>,
    /// Tag, `latest` when the text names none.
    pub tag: Option<String>,
    /// Content digest such as `sha256:…`.
    pub digest: Option<String>,
}

impl ImageRef {
    /// Returns whether this reference names no repository at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.repository.is_none()
    }

    /// Compares two references.
    ///
    /// If both carry a digest, only the digests are compared. Otherwise the
    /// registry, repository, and tag must all match.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (&self.digest, &other.digest) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.registry == other.registry
                    && self.repository == other.repository
                    && self.tag == other.tag
            }
        }
    }

    /// Short human-readable name such as `redis:7`.
    ///
    /// Drops the implicit Docker Hub registry and `library/` namespace.
    #[must_use]
    pub fn display_name(&self) -> String {
        let Some(repository) = &self.repository else {
            return format_image_name(&self.raw);
        };
        let mut name = match &self.registry {
            Some(registry) if registry != DEFAULT_REGISTRY => format!("{registry}/{repository}"),
            _ => normalize_compose_image(repository),
        };
        if let Some(tag) = &self.tag {
            name.push(':');
            name.push_str(tag);
        }
        name
    }

    /// Merges an instance reference with a compose-declared one for display.
    ///
    /// The instance side wins, except that an instance tag of `latest` gives
    /// way to a more specific compose tag.
    #[must_use]
    pub fn merged_for_display(instance: Option<&Self>, declared: Option<&Self>) -> Option<Self> {
        match (instance, declared) {
            (Some(instance), Some(declared)) => {
                let mut merged = instance.clone();
                let instance_is_default = instance.tag.as_deref().is_none_or(|t| t == DEFAULT_TAG);
                if instance_is_default && declared.tag.is_some() {
                    merged.tag.clone_from(&declared.tag);
                }
                Some(merged)
            }
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(repository) = &self.repository else {
            return f.write_str(&self.raw);
        };
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        f.write_str(repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

/// Parses an image reference.
///
/// `is_local` marks references of images built from a compose `build:`
/// section; those get no default registry.
#[must_use]
pub fn parse_image_ref(input: &str, is_local: bool) -> ImageRef {
    let mut rest = input.trim();
    let mut parsed = ImageRef {
        raw: input.to_string(),
        ..ImageRef::default()
    };
    if rest.is_empty() {
        return parsed;
    }

    if let Some(at) = rest.rfind('@') {
        parsed.digest = Some(rest[at + 1..].to_string()).filter(|d| !d.is_empty());
        rest = &rest[..at];
    }

    let last_slash = rest.rfind('/');
    let tag_colon = rest
        .rfind(':')
        .filter(|&colon| last_slash.is_none_or(|slash| colon > slash));
    let tag = match tag_colon {
        Some(colon) => {
            let tag = &rest[colon + 1..];
            rest = &rest[..colon];
            tag
        }
        None => "",
    };
    parsed.tag = Some(if tag.is_empty() { DEFAULT_TAG } else { tag }.to_string());

    let (registry, repository) = match rest.split_once('/') {
        Some((prefix, remainder)) if is_registry_host(prefix) => {
            (Some(prefix.to_string()), remainder.to_string())
        }
        _ => (
            (!is_local).then(|| DEFAULT_REGISTRY.to_string()),
            rest.to_string(),
        ),
    };
    let repository = if registry.as_deref() == Some(DEFAULT_REGISTRY) && !repository.contains('/')
    {
        format!("{DEFAULT_NAMESPACE}/{repository}")
    } else {
        repository
    };

    parsed.registry = registry;
    parsed.repository = Some(repository).filter(|r| !r.is_empty());
    parsed
}

fn is_registry_host(prefix: &str) -> bool {
    prefix.contains('.') || prefix.contains(':') || prefix == "localhost"
}

/// Derives the reference of a live image from its `RepoTags` and `RepoDigests`.
///
/// The digest entry is preferred as the primary reference, but the tag is
/// taken from the tag entry. Images without any repo digest were never
/// pulled from or pushed to a registry, so their tags are parsed as local.
#[must_use]
pub fn image_ref_from_repo(repo_tags: &[String], repo_digests: &[String]) -> ImageRef {
    let tags: Vec<&String> = repo_tags.iter().filter(|t| !is_placeholder(t)).collect();
    let digests: Vec<&String> = repo_digests.iter().filter(|d| !is_placeholder(d)).collect();

    let tagged = tags
        .first()
        .map(|tag| parse_image_ref(tag, digests.is_empty()));
    match digests.first() {
        Some(digest) => {
            let mut primary = parse_image_ref(digest, false);
            if let Some(tag) = tagged.and_then(|t| t.tag) {
                primary.tag = Some(tag);
            }
            primary
        }
        None => tagged.unwrap_or_default(),
    }
}

/// Builds the image reference a compose service resolves to.
///
/// An explicit `image:` is parsed, as local when a `build:` is also
/// present. A build-only service gets the name compose gives it,
/// `{project}-{service}:latest`. Anything else yields an empty reference.
#[must_use]
pub fn image_ref_from_compose(
    project: &str,
    service: &str,
    image: Option<&str>,
    has_build: bool,
) -> ImageRef {
    match image {
        Some(image) => parse_image_ref(image, has_build),
        None if has_build => {
            let repository = format!("{project}-{service}");
            ImageRef {
                raw: format!("{repository}:{DEFAULT_TAG}"),
                registry: None,
                repository: Some(repository),
                tag: Some(DEFAULT_TAG.to_string()),
                digest: None,
            }
        }
        None => ImageRef::default(),
    }
}

/// Strips the implicit `docker.io/` registry and `library/` namespace.
#[must_use]
pub fn normalize_compose_image(image: &str) -> String {
    let image = image.strip_prefix("docker.io/").unwrap_or(image);
    image.strip_prefix("library/").unwrap_or(image).to_string()
}

/// Strips a trailing `@sha256:<64 hex>` digest.
#[must_use]
pub fn format_image_name(name: &str) -> String {
    match TRAILING_DIGEST.as_ref() {
        Some(pattern) => pattern.replace(name, "").into_owned(),
        None => name.to_string(),
    }
}

fn is_placeholder(entry: &str) -> bool {
    entry.starts_with(NONE_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn parse_bare_name_defaults_registry_namespace_and_tag() {
        let r = parse_image_ref("nginx", false);
        assert_eq!(r.raw, "nginx");
        assert_eq!(r.registry.as_deref(), Some("docker.io"));
        assert_eq!(r.repository.as_deref(), Some("library/nginx"));
        assert_eq!(r.tag.as_deref(), Some("latest"));
        assert_eq!(r.digest, None);
    }

    #[test]
    fn parse_keeps_raw_untrimmed() {
        let r = parse_image_ref("  redis:7 ", false);
        assert_eq!(r.raw, "  redis:7 ");
        assert_eq!(r.tag.as_deref(), Some("7"));
    }

    #[test]
    fn parse_registry_with_port_is_not_a_tag() {
        let r = parse_image_ref("registry.local:5000/team/app", false);
        assert_eq!(r.registry.as_deref(), Some("registry.local:5000"));
        assert_eq!(r.repository.as_deref(), Some("team/app"));
        assert_eq!(r.tag.as_deref(), Some("latest"));
    }

    #[test]
    fn parse_localhost_is_a_registry() {
        let r = parse_image_ref("localhost/app:dev", false);
        assert_eq!(r.registry.as_deref(), Some("localhost"));
        assert_eq!(r.repository.as_deref(), Some("app"));
        assert_eq!(r.tag.as_deref(), Some("dev"));
    }

    #[test]
    fn parse_namespace_without_dot_stays_in_repository() {
        let r = parse_image_ref("grafana/grafana:10.2.0", false);
        assert_eq!(r.registry.as_deref(), Some("docker.io"));
        assert_eq!(r.repository.as_deref(), Some("grafana/grafana"));
        assert_eq!(r.tag.as_deref(), Some("10.2.0"));
    }

    #[test]
    fn parse_explicit_docker_io_adds_library() {
        let r = parse_image_ref("docker.io/redis", false);
        assert_eq!(r.repository.as_deref(), Some("library/redis"));
    }

    #[test]
    fn parse_digest_and_tag() {
        let r = parse_image_ref(&format!("ghcr.io/acme/api:1.4@{DIGEST}"), false);
        assert_eq!(r.registry.as_deref(), Some("ghcr.io"));
        assert_eq!(r.repository.as_deref(), Some("acme/api"));
        assert_eq!(r.tag.as_deref(), Some("1.4"));
        assert_eq!(r.digest.as_deref(), Some(DIGEST));
    }

    #[test]
    fn parse_local_has_no_registry_and_no_namespace() {
        let r = parse_image_ref("myapp:dev", true);
        assert_eq!(r.registry, None);
        assert_eq!(r.repository.as_deref(), Some("myapp"));
        assert_eq!(r.tag.as_deref(), Some("dev"));
    }

    #[test]
    fn parse_empty_input_is_empty_reference() {
        let r = parse_image_ref("   ", false);
        assert!(r.is_empty());
        assert_eq!(r.tag, None);
    }

    #[test]
    fn display_round_trips_under_is_same() {
        for input in [
            "nginx",
            "redis:7-alpine",
            "ghcr.io/acme/api:1.4",
            "registry.local:5000/team/app",
            "localhost/app:dev",
        ] {
            let parsed = parse_image_ref(input, false);
            let reparsed = parse_image_ref(&parsed.to_string(), false);
            assert!(parsed.is_same(&reparsed), "{input} -> {parsed}");
        }
    }

    #[test]
    fn is_same_is_reflexive_and_symmetric() {
        let a = parse_image_ref("nginx:1.25", false);
        let b = parse_image_ref("docker.io/library/nginx:1.25", false);
        let c = parse_image_ref("nginx:1.26", false);
        assert!(a.is_same(&a));
        assert!(a.is_same(&b) && b.is_same(&a));
        assert!(!a.is_same(&c) && !c.is_same(&a));
    }

    #[test]
    fn is_same_compares_only_digests_when_both_pinned() {
        let a = parse_image_ref(&format!("mirror.example.com/nginx@{DIGEST}"), false);
        let b = parse_image_ref(&format!("nginx:1.25@{DIGEST}"), false);
        assert!(a.is_same(&b));
    }

    #[test]
    fn is_same_ignores_digest_when_one_side_is_unpinned() {
        let pinned = parse_image_ref(&format!("nginx@{DIGEST}"), false);
        let tagged = parse_image_ref("nginx:1.25", false);
        assert!(!pinned.is_same(&tagged));
    }

    #[test]
    fn normalize_strips_default_registry_and_library() {
        assert_eq!(normalize_compose_image("docker.io/library/redis"), "redis");
        assert_eq!(normalize_compose_image("library/redis:7"), "redis:7");
        assert_eq!(normalize_compose_image("ghcr.io/acme/api"), "ghcr.io/acme/api");
    }

    #[test]
    fn format_image_name_strips_trailing_digest() {
        assert_eq!(format_image_name(&format!("redis@{DIGEST}")), "redis");
        assert_eq!(format_image_name("redis:7"), "redis:7");
    }

    #[test]
    fn repo_ref_prefers_digest_but_keeps_tag() {
        let r = image_ref_from_repo(
            &["nginx:1.25".to_string()],
            &[format!("nginx@{DIGEST}")],
        );
        assert_eq!(r.raw, format!("nginx@{DIGEST}"));
        assert_eq!(r.repository.as_deref(), Some("library/nginx"));
        assert_eq!(r.tag.as_deref(), Some("1.25"));
        assert_eq!(r.digest.as_deref(), Some(DIGEST));
    }

    #[test]
    fn repo_ref_without_digest_is_local() {
        let r = image_ref_from_repo(&["shop-web:latest".to_string()], &[]);
        assert_eq!(r.registry, None);
        assert_eq!(r.repository.as_deref(), Some("shop-web"));
    }

    #[test]
    fn repo_ref_ignores_none_placeholders() {
        let r = image_ref_from_repo(&["<none>:<none>".to_string()], &["<none>@<none>".to_string()]);
        assert!(r.is_empty());
    }

    #[test]
    fn compose_ref_synthesizes_build_only_name() {
        let r = image_ref_from_compose("shop", "web", None, true);
        assert_eq!(r.registry, None);
        assert_eq!(r.repository.as_deref(), Some("shop-web"));
        assert_eq!(r.tag.as_deref(), Some("latest"));
        assert!(r.is_same(&image_ref_from_repo(&["shop-web:latest".into()], &[])));
    }

    #[test]
    fn compose_ref_with_build_suppresses_default_registry() {
        let r = image_ref_from_compose("shop", "web", Some("acme/web:2"), true);
        assert_eq!(r.registry, None);
        assert_eq!(r.repository.as_deref(), Some("acme/web"));
    }

    #[test]
    fn compose_ref_without_image_or_build_is_empty() {
        assert!(image_ref_from_compose("shop", "web", None, false).is_empty());
    }

    #[test]
    fn merged_display_prefers_declared_tag_over_latest() {
        let instance = image_ref_from_repo(&["nginx:latest".into()], &[format!("nginx@{DIGEST}")]);
        let declared = parse_image_ref("nginx:1.25", false);
        let merged = ImageRef::merged_for_display(Some(&instance), Some(&declared)).expect("merged");
        assert_eq!(merged.tag.as_deref(), Some("1.25"));
        assert_eq!(merged.digest.as_deref(), Some(DIGEST));
    }

    #[test]
    fn merged_display_keeps_specific_instance_tag() {
        let instance = parse_image_ref("nginx:1.24", false);
        let declared = parse_image_ref("nginx:1.25", false);
        let merged = ImageRef::merged_for_display(Some(&instance), Some(&declared)).expect("merged");
        assert_eq!(merged.tag.as_deref(), Some("1.24"));
    }

    #[test]
    fn display_name_hides_docker_hub_defaults() {
        assert_eq!(parse_image_ref("redis:7", false).display_name(), "redis:7");
        assert_eq!(
            parse_image_ref("ghcr.io/acme/api:1", false).display_name(),
            "ghcr.io/acme/api:1"
        );
    }
}
