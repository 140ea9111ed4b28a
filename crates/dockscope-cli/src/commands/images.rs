//! `dscope images`: list images, pulled and declared.

use clap::Args;
use dockscope_common::config::DockscopeConfig;
use dockscope_common::constants::CACHE_TTL;
use dockscope_image::cache::HttpCache;
use dockscope_topology::updates::annotate_updates;

use crate::output::{elide, format_bytes, since};

/// Arguments for the `images` command.
#[derive(Args, Debug)]
pub struct ImagesArgs {
    /// Ask Docker Hub and GHCR whether newer builds exist.
    #[arg(long)]
    pub check_updates: bool,
}

/// Executes the `images` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built or the cache file
/// cannot be opened.
pub async fn execute(args: ImagesArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let mut host = super::snapshot(config).await?;

    if args.check_updates {
        let cache = HttpCache::open(&config.cache_file, CACHE_TTL, config.registry_timeout)?;
        host = annotate_updates(host, &cache).await;
    }

    if host.images.is_empty() {
        println!("No images found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<20} {:<12} {:<15} {:<5} {:<16} {}",
        "IMAGE", "ID", "SIZE", "CREATED", "USED", "UPDATE", "URL"
    );
    for image in &host.images {
        let id = if image.is_pulled() {
            short_id(&image.id)
        } else {
            "not pulled".to_string()
        };
        let update = image
            .update
            .as_ref()
            .map_or_else(|| "-".to_string(), |check| check.status.to_string());
        println!(
            "{:<36} {:<20} {:<12} {:<15} {:<5} {:<16} {}",
            elide(&image.display_name()),
            id,
            format_bytes(image.size()),
            since(image.created()),
            image.containers.len(),
            update,
            image.web_url().unwrap_or_default()
        );
    }
    Ok(())
}

/// First 12 hex digits of an image ID.
fn short_id(id: &str) -> String {
    let hex = id.strip_prefix("sha256:").unwrap_or(id);
    hex.chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_drops_algorithm() {
        assert_eq!(short_id("sha256:0123456789abcdef"), "0123456789ab");
        assert_eq!(short_id("abc"), "abc");
    }
}
