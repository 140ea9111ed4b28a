//! Attaching registry update checks to a finished snapshot.

use dockscope_image::cache::CachedFetch;
use dockscope_image::update::check_or_unknown;
use futures::future::join_all;

use crate::host::Host;

/// Checks every pulled image of `host` for updates, concurrently.
///
/// Returns the host with each pulled image's `update` set. A failed check
/// yields an `unknown` status for that image alone. Unpulled images are
/// left unchecked.
pub async fn annotate_updates(mut host: Host, fetcher: &dyn CachedFetch) -> Host {
    let checks = join_all(host.images.iter().map(|image| async move {
        let live = image.instance_ref.as_ref()?;
        Some(check_or_unknown(fetcher, live, image.declared_ref.as_ref()).await)
    }))
    .await;

    for (image, check) in host.images.iter_mut().zip(checks) {
        image.update = check;
    }
    host
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use dockscope_common::error::RegistryError;
    use dockscope_engine::inventory::InventoryImage;
    use dockscope_engine::records::{ImageDetail, ImageSummary};
    use dockscope_image::cache::{CachedResponse, FetchOptions};
    use dockscope_image::reference::{image_ref_from_repo, parse_image_ref};
    use dockscope_image::update::UpdateStatus;

    use super::*;
    use crate::entity::Image;

    const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    /// Every request fails as if the registry were unreachable.
    struct Offline;

    #[async_trait]
    impl CachedFetch for Offline {
        async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<CachedResponse, RegistryError> {
            Err(RegistryError::Transport {
                url: url.to_string(),
                message: "connection refused".into(),
            })
        }
    }

    fn pulled(id: &str, tag: &str, repo_digest: &str) -> Image {
        let summary = ImageSummary {
            id: id.into(),
            repo_tags: vec![tag.to_string()],
            repo_digests: vec![repo_digest.to_string()],
            ..ImageSummary::default()
        };
        let instance = image_ref_from_repo(&summary.repo_tags, &summary.repo_digests);
        Image::pulled(
            InventoryImage {
                summary,
                detail: ImageDetail::default(),
            },
            instance,
        )
    }

    #[tokio::test]
    async fn failures_stay_on_their_image() {
        let mut pinned = pulled("sha256:app", "app:1", &format!("app@{DIGEST}"));
        pinned.declared_ref = Some(parse_image_ref(&format!("app@{DIGEST}"), false));
        let host = Host {
            images: vec![
                pinned,
                pulled("sha256:redis", "redis:7", &format!("redis@{DIGEST}")),
                Image::unpulled(parse_image_ref("nginx:1.25", false)),
            ],
            ..Host::default()
        };

        let host = annotate_updates(host, &Offline).await;

        let status = |id: &str| host.image(id).and_then(|i| i.update.as_ref()).map(|u| u.status);
        assert_eq!(status("sha256:app"), Some(UpdateStatus::UpdateBlocked));
        assert_eq!(status("sha256:redis"), Some(UpdateStatus::Unknown));
        assert_eq!(status("nginx:1.25"), None);
        let redis = host.image("sha256:redis").and_then(|i| i.update.as_ref()).expect("check");
        assert!(redis.message.contains("connection refused"), "got: {}", redis.message);
    }
}
