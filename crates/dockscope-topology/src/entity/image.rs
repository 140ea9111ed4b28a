//! Images, live on the engine or declared by compose but not yet pulled.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use dockscope_engine::inventory::InventoryImage;
use dockscope_engine::records::Labels;
use dockscope_image::reference::{ImageRef, parse_image_ref};
use dockscope_image::registry::Registry;
use dockscope_image::update::UpdateCheck;
use serde::Serialize;

/// An image.
///
/// Identified by the engine ID when pulled, else by the raw declared
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    /// Engine ID or raw declared reference.
    pub id: String,
    /// Engine summary and inspect detail.
    pub live: Option<InventoryImage>,
    /// Reference derived from `RepoDigests` and `RepoTags`.
    pub instance_ref: Option<ImageRef>,
    /// Reference from the first compose service that uses this image.
    pub declared_ref: Option<ImageRef>,
    /// Names of containers using this image.
    pub containers: BTreeSet<String>,
    /// ID of the build producing this image.
    pub build: Option<String>,
    /// Registry update check, filled in by `annotate_updates`.
    pub update: Option<UpdateCheck>,
}

impl Image {
    /// An image the engine reports.
    #[must_use]
    pub fn pulled(live: InventoryImage, instance_ref: ImageRef) -> Self {
        Self {
            id: live.summary.id.clone(),
            instance_ref: (!instance_ref.is_empty()).then_some(instance_ref),
            live: Some(live),
            declared_ref: None,
            containers: BTreeSet::new(),
            build: None,
            update: None,
        }
    }

    /// An image compose declares but the engine does not have.
    #[must_use]
    pub fn unpulled(declared_ref: ImageRef) -> Self {
        Self {
            id: declared_ref.raw.clone(),
            live: None,
            instance_ref: None,
            declared_ref: Some(declared_ref),
            containers: BTreeSet::new(),
            build: None,
            update: None,
        }
    }

    /// Whether the engine has the image.
    #[must_use]
    pub const fn is_pulled(&self) -> bool {
        self.live.is_some()
    }

    /// Reference to show, preferring a declared tag over an instance `latest`.
    #[must_use]
    pub fn display_ref(&self) -> Option<ImageRef> {
        ImageRef::merged_for_display(self.instance_ref.as_ref(), self.declared_ref.as_ref())
    }

    /// Human-readable name, falling back to the ID.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.display_ref()
            .map_or_else(|| self.id.clone(), |reference| reference.display_name())
    }

    /// Tags of the live image, the text after `:` of each `RepoTag`.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.repo_tags()
            .filter_map(|tag| tag.rsplit_once(':').map(|(_, tag)| tag.to_string()))
            .collect()
    }

    /// Ports the image exposes, e.g. `80/tcp`.
    #[must_use]
    pub fn exposed_ports(&self) -> Vec<String> {
        self.live
            .as_ref()
            .map(|live| live.detail.exposed_ports())
            .unwrap_or_default()
    }

    /// Size in bytes; zero when not pulled.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.live
            .as_ref()
            .map_or(0, |live| u64::try_from(live.summary.size).unwrap_or(0))
    }

    /// Creation time.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        let live = self.live.as_ref()?;
        live.detail
            .created
            .as_deref()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|time| time.with_timezone(&Utc))
            .or_else(|| DateTime::from_timestamp(live.summary.created, 0))
    }

    /// Labels from the image config.
    #[must_use]
    pub fn labels(&self) -> Labels {
        self.live
            .as_ref()
            .map(|live| {
                let mut labels = live.summary.labels.clone();
                labels.extend(live.detail.labels());
                labels
            })
            .unwrap_or_default()
    }

    /// Registry page for this image: the one found by the update check,
    /// else one derived from the display reference.
    #[must_use]
    pub fn web_url(&self) -> Option<String> {
        self.update
            .as_ref()
            .and_then(|check| check.url.clone())
            .or_else(|| Registry::web_url_for(&self.display_ref()?))
    }

    /// Whether `reference` names this image.
    ///
    /// Checks the primary instance reference, then every `RepoTag`, then
    /// the declared reference. Tags of an image with no repo digest match
    /// both as local names and under the default registry. An empty
    /// reference never matches.
    #[must_use]
    pub fn matches(&self, reference: &ImageRef) -> bool {
        if reference.is_empty() {
            return false;
        }
        if self.instance_ref.as_ref().is_some_and(|own| own.is_same(reference)) {
            return true;
        }
        let untracked = self
            .live
            .as_ref()
            .is_none_or(|live| live.summary.repo_digests.is_empty());
        if self.repo_tags().any(|tag| {
            parse_image_ref(tag, false).is_same(reference)
                || (untracked && parse_image_ref(tag, true).is_same(reference))
        }) {
            return true;
        }
        self.declared_ref.as_ref().is_some_and(|own| own.is_same(reference))
    }

    fn repo_tags(&self) -> impl Iterator<Item = &String> {
        self.live
            .iter()
            .flat_map(|live| &live.summary.repo_tags)
            .filter(|tag| !tag.starts_with("<none>"))
    }
}
