//! End-to-end snapshot tests: real compose files on disk, an in-memory engine.

#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dockscope_common::constants::COMPOSE_PROJECT_LABEL;
use dockscope_common::error::{ConfigError, EngineError};
use dockscope_compose::discovery::LocalFileSystem;
use dockscope_compose::loader::ComposeLoader;
use dockscope_engine::inventory::InventoryFetcher;
use dockscope_engine::records::{
    ContainerRecord, ImageDetail, ImageSummary, NetworkRecord, PluginRecord, SystemInfo,
    VolumeRecord,
};
use dockscope_topology::snapshot::SnapshotBuilder;

const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

#[derive(Default)]
struct FakeEngine {
    containers: Vec<ContainerRecord>,
    images: Vec<ImageSummary>,
    down: bool,
}

impl FakeEngine {
    fn check(&self, endpoint: &str) -> Result<(), EngineError> {
        if self.down {
            return Err(EngineError::Unreachable {
                url: format!("http://engine{endpoint}"),
                message: "connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryFetcher for FakeEngine {
    async fn list_containers(&self, _all: bool) -> Result<Vec<ContainerRecord>, EngineError> {
        self.check("/containers/json")?;
        Ok(self.containers.clone())
    }

    async fn list_networks(&self) -> Result<Vec<NetworkRecord>, EngineError> {
        self.check("/networks")?;
        Ok(Vec::new())
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>, EngineError> {
        self.check("/volumes")?;
        Ok(Vec::new())
    }

    async fn list_images(&self, _all: bool) -> Result<Vec<ImageSummary>, EngineError> {
        self.check("/images/json")?;
        Ok(self.images.clone())
    }

    async fn inspect_image(&self, id: &str) -> Result<ImageDetail, EngineError> {
        Ok(ImageDetail {
            id: id.into(),
            ..ImageDetail::default()
        })
    }

    async fn list_plugins(&self) -> Result<Vec<PluginRecord>, EngineError> {
        Ok(Vec::new())
    }

    async fn system_info(&self) -> Result<SystemInfo, EngineError> {
        self.check("/info")?;
        Ok(SystemInfo {
            name: "box".into(),
            ..SystemInfo::default()
        })
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn services_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a/compose.yml",
        "services:\n  web:\n    image: nginx:1.25\n    ports:\n      - \"${PORT:-8080}:80\"\n",
    );
    write(
        dir.path(),
        "c/docker-compose.yml",
        "services:\n  api:\n    image: \"${SECRET:?missing}\"\n",
    );
    dir
}

fn builder(root: &Path, engine: FakeEngine) -> SnapshotBuilder {
    let loader = ComposeLoader::new(Arc::new(LocalFileSystem));
    SnapshotBuilder::new(loader, Arc::new(engine), root)
}

fn labelled_container(name: &str, project: &str) -> ContainerRecord {
    ContainerRecord {
        id: format!("id-{name}"),
        names: vec![format!("/{name}")],
        state: "exited".into(),
        labels: BTreeMap::from([(COMPOSE_PROJECT_LABEL.to_string(), project.to_string())]),
        ..ContainerRecord::default()
    }
}

#[tokio::test]
async fn declared_and_label_only_projects_reconcile() {
    let dir = services_tree();
    let engine = FakeEngine {
        containers: vec![labelled_container("b-worker-1", "b")],
        ..FakeEngine::default()
    };

    let host = builder(dir.path(), engine).build().await.expect("snapshot");

    assert_eq!(host.name, "box");
    let names: Vec<&str> = host.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let a = host.project("a").expect("project a");
    assert!(a.config().is_some());
    assert!(a.networks.contains("a_default"));
    let network = host.network("a_default").expect("default network");
    assert!(network.containers.contains("a-web-1"));

    let web = host.container("a-web-1").expect("web");
    assert_eq!(web.ports(), vec!["8080"]);
    let image = host.container_image(web).expect("image");
    assert!(!image.is_pulled());
    assert_eq!(image.display_name(), "nginx:1.25");

    let b = host.project("b").expect("project b");
    assert!(b.compose.is_none());
    assert!(!b.is_running(&host));
}

#[tokio::test]
async fn missing_required_variable_fails_one_project_only() {
    let dir = services_tree();
    let host = builder(dir.path(), FakeEngine::default()).build().await.expect("snapshot");

    let c = host.project("c").expect("project c");
    assert!(
        matches!(c.config_error(), Some(ConfigError::MissingVariable { variable, .. }) if variable == "SECRET"),
        "got: {:?}",
        c.config_error()
    );
    assert!(c.containers.is_empty());
    assert_eq!(c.lint().len(), 1);
    assert!(host.project("a").and_then(|a| a.config()).is_some());
}

#[tokio::test]
async fn pulled_image_is_matched_by_reference() {
    let dir = services_tree();
    let engine = FakeEngine {
        images: vec![ImageSummary {
            id: "sha256:nginx".into(),
            repo_tags: vec!["nginx:1.25".into()],
            repo_digests: vec![format!("nginx@{DIGEST}")],
            ..ImageSummary::default()
        }],
        ..FakeEngine::default()
    };

    let host = builder(dir.path(), engine).build().await.expect("snapshot");

    let image = host.image("sha256:nginx").expect("image");
    assert!(image.is_pulled());
    assert!(image.containers.contains("a-web-1"));
    assert!(host.image("nginx:1.25").is_none());
}

#[tokio::test]
async fn unreachable_engine_aborts_the_snapshot() {
    let dir = services_tree();
    let engine = FakeEngine {
        down: true,
        ..FakeEngine::default()
    };
    let err = builder(dir.path(), engine).build().await.unwrap_err();
    assert!(matches!(err, EngineError::Unreachable { .. }), "got: {err}");
}
