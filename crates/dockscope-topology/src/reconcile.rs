//! Merges compose projects and the engine inventory into one [`Host`].
//!
//! Entities are built side by side in name-keyed maps, declared and live
//! halves meeting under the same identity, then cross-linked in a final
//! pass. The whole fold is synchronous and never touches the engine.

use std::collections::{BTreeMap, BTreeSet};

use dockscope_common::constants::DEFAULT_NETWORK_KEY;
use dockscope_common::types::EntityKind;
use dockscope_compose::loader::{Dockerfile, LoadedProject};
use dockscope_compose::schema::{ComposeConfig, Service, VolumeConfig};
use dockscope_engine::inventory::{Inventory, InventoryImage};
use dockscope_engine::records::{ContainerRecord, NetworkRecord, VolumeRecord};
use dockscope_image::reference::{ImageRef, image_ref_from_compose, image_ref_from_repo, parse_image_ref};

use crate::diagnostics::Diagnostic;
use crate::entity::build::build_id;
use crate::entity::{Build, Container, Image, Network, Plugin, Project, Volume};
use crate::host::Host;

/// Builds the host graph from loaded compose projects and a fetched
/// inventory.
///
/// Problems local to one entity become [`Diagnostic`]s on the result.
#[must_use]
pub fn reconcile(loaded: Vec<LoadedProject>, inventory: Inventory) -> Host {
    let Inventory {
        host_name,
        containers,
        networks,
        volumes,
        images,
        plugins,
    } = inventory;

    let mut graph = Graph::default();
    graph.add_projects(loaded);
    let configs = graph.declared_configs();

    for (project, config) in &configs {
        graph.add_declared_containers(project, config);
    }
    graph.add_live_containers(containers);

    graph.add_live_networks(networks);
    for (project, config) in &configs {
        graph.add_declared_networks(project, config);
    }

    graph.add_live_volumes(volumes);
    for (project, config) in &configs {
        graph.add_declared_volumes(project, config);
    }

    graph.add_live_images(images);
    for (project, config) in &configs {
        graph.add_builds(project, config);
    }

    graph.link_networks();
    graph.link_images();
    graph.link_builds();

    let host = graph.finish(host_name, plugins.into_iter().map(Plugin::from).collect());
    tracing::info!(
        host = %host.name,
        projects = host.projects.len(),
        containers = host.containers.len(),
        networks = host.networks.len(),
        volumes = host.volumes.len(),
        images = host.images.len(),
        diagnostics = host.diagnostics.len(),
        "reconciled host"
    );
    host
}

/// Identity of the container a service runs as.
#[must_use]
pub fn container_name(project: &str, service_key: &str, service: &Service) -> String {
    service
        .container_name
        .clone()
        .unwrap_or_else(|| format!("{project}-{service_key}-1"))
}

/// Name a compose network key resolves to.
///
/// An explicit `name:` wins. External networks keep their key, everything
/// else is prefixed with the project name.
#[must_use]
pub fn network_name(project: &str, config: &ComposeConfig, key: &str) -> String {
    match config.networks.get(key) {
        Some(network) => match &network.name {
            Some(name) => name.clone(),
            None if network.is_external() => key.to_string(),
            None => format!("{project}_{key}"),
        },
        None => format!("{project}_{key}"),
    }
}

/// Name a compose volume key resolves to.
#[must_use]
pub fn volume_name(project: &str, key: &str, volume: &VolumeConfig) -> String {
    match &volume.name {
        Some(name) => name.clone(),
        None if volume.is_external() => key.to_string(),
        None => format!("{project}_{key}"),
    }
}

fn service_network_keys(service: &Service) -> Vec<String> {
    service
        .network_keys()
        .unwrap_or_else(|| vec![DEFAULT_NETWORK_KEY.to_string()])
}

/// Reference of the image a live container was started from.
///
/// The engine reports a bare image ID when the tag has since moved.
fn live_image_ref(record: &ContainerRecord) -> ImageRef {
    if record.image.is_empty() || record.image.starts_with("sha256:") {
        return ImageRef::default();
    }
    parse_image_ref(&record.image, false)
}

#[derive(Default)]
struct Graph {
    projects: BTreeMap<String, Project>,
    containers: BTreeMap<String, Container>,
    networks: BTreeMap<String, Network>,
    volumes: BTreeMap<String, Volume>,
    images: Vec<Image>,
    builds: BTreeMap<String, Build>,
    dockerfiles: BTreeMap<String, BTreeMap<String, Dockerfile>>,
    diagnostics: Vec<Diagnostic>,
}

impl Graph {
    fn add_projects(&mut self, loaded: Vec<LoadedProject>) {
        for project in loaded {
            let LoadedProject {
                name,
                compose,
                env_files,
                dockerfiles,
            } = project;

            if self.projects.contains_key(&name) {
                tracing::warn!(project = %name, path = %compose.path.display(), "duplicate project name");
                self.diagnostics.push(Diagnostic::error(
                    EntityKind::Project,
                    &name,
                    format!(
                        "{} resolves to a project name already in use and was ignored",
                        compose.path.display()
                    ),
                ));
                continue;
            }
            if let Some(error) = compose.state.error() {
                self.diagnostics
                    .push(Diagnostic::error(EntityKind::Project, &name, error.to_string()));
            }

            let _ = self.dockerfiles.insert(name.clone(), dockerfiles);
            let mut entry = Project::label_only(name.clone());
            entry.compose = Some(compose);
            entry.env_files = env_files;
            let _ = self.projects.insert(name, entry);
        }
    }

    fn declared_configs(&self) -> Vec<(String, ComposeConfig)> {
        self.projects
            .values()
            .filter_map(|project| Some((project.name.clone(), project.config()?.clone())))
            .collect()
    }

    fn project_mut(&mut self, name: &str) -> &mut Project {
        self.projects
            .entry(name.to_string())
            .or_insert_with(|| Project::label_only(name))
    }

    fn add_declared_containers(&mut self, project: &str, config: &ComposeConfig) {
        for (key, service) in &config.services {
            let name = container_name(project, key, service);
            if self.containers.contains_key(&name) {
                self.diagnostics.push(Diagnostic::error(
                    EntityKind::Container,
                    &name,
                    format!("service {key} of project {project} resolves to a container name already in use"),
                ));
                continue;
            }
            let networks = service_network_keys(service)
                .iter()
                .map(|network| network_name(project, config, network))
                .collect();
            let container = Container {
                name: name.clone(),
                project: Some(project.to_string()),
                service: Some(key.clone()),
                declared: Some(service.clone()),
                live: None,
                image_ref: image_ref_from_compose(project, key, service.image.as_deref(), service.build.is_some()),
                image: None,
                networks,
            };
            let _ = self.containers.insert(name.clone(), container);
            let _ = self.project_mut(project).containers.insert(name);
        }
    }

    fn add_live_containers(&mut self, records: Vec<ContainerRecord>) {
        for record in records {
            let name = record.name().to_string();
            if let Some(project) = record.project() {
                let _ = self.project_mut(project).containers.insert(name.clone());
            }

            match self.containers.get_mut(&name) {
                Some(existing) if existing.live.is_some() => {
                    self.diagnostics.push(Diagnostic::error(
                        EntityKind::Container,
                        &name,
                        format!("engine reports a second container named {name} ({})", record.id),
                    ));
                }
                Some(existing) => {
                    existing.networks.extend(record.network_names());
                    existing.live = Some(record);
                }
                None => {
                    let container = Container {
                        name: name.clone(),
                        project: record.project().map(str::to_string),
                        service: record.service().map(str::to_string),
                        declared: None,
                        image_ref: live_image_ref(&record),
                        image: None,
                        networks: record.network_names().into_iter().collect(),
                        live: Some(record),
                    };
                    let _ = self.containers.insert(name, container);
                }
            }
        }
    }

    fn add_live_networks(&mut self, records: Vec<NetworkRecord>) {
        for record in records {
            let name = record.name.clone();
            let project = record.project().map(str::to_string);
            if let Some(project) = &project {
                let _ = self.project_mut(project).networks.insert(name.clone());
            }
            let network = Network {
                name: name.clone(),
                project,
                key: None,
                declared: None,
                live: Some(record),
                containers: BTreeSet::new(),
            };
            let _ = self.networks.insert(name, network);
        }
    }

    fn add_declared_networks(&mut self, project: &str, config: &ComposeConfig) {
        for (key, declared) in &config.networks {
            let name = network_name(project, config, key);
            if declared.is_external() && !self.networks.contains_key(&name) {
                continue;
            }
            let network = self.networks.entry(name.clone()).or_insert_with(|| Network {
                name: name.clone(),
                project: None,
                key: None,
                declared: None,
                live: None,
                containers: BTreeSet::new(),
            });
            if !declared.is_external() && network.project.is_none() {
                network.project = Some(project.to_string());
            }
            if network.key.is_none() {
                network.key = Some(key.clone());
                network.declared = Some(declared.clone());
            }
            let _ = self.project_mut(project).networks.insert(name);
        }

        let uses_default = config
            .services
            .values()
            .any(|service| service_network_keys(service).iter().any(|k| k == DEFAULT_NETWORK_KEY));
        if uses_default && !config.networks.contains_key(DEFAULT_NETWORK_KEY) {
            let name = network_name(project, config, DEFAULT_NETWORK_KEY);
            let network = self.networks.entry(name.clone()).or_insert_with(|| Network {
                name: name.clone(),
                project: None,
                key: None,
                declared: None,
                live: None,
                containers: BTreeSet::new(),
            });
            if network.project.is_none() {
                network.project = Some(project.to_string());
            }
            if network.key.is_none() {
                network.key = Some(DEFAULT_NETWORK_KEY.to_string());
            }
            let _ = self.project_mut(project).networks.insert(name);
        }
    }

    fn add_live_volumes(&mut self, records: Vec<VolumeRecord>) {
        for record in records {
            let name = record.name.clone();
            let project = record.project().map(str::to_string);
            if let Some(project) = &project {
                let _ = self.project_mut(project).volumes.insert(name.clone());
            }
            let volume = Volume {
                name: name.clone(),
                project,
                key: None,
                declared: None,
                live: Some(record),
            };
            let _ = self.volumes.insert(name, volume);
        }
    }

    fn add_declared_volumes(&mut self, project: &str, config: &ComposeConfig) {
        for (key, declared) in &config.volumes {
            let name = volume_name(project, key, declared);
            if declared.is_external() && !self.volumes.contains_key(&name) {
                continue;
            }
            let volume = self.volumes.entry(name.clone()).or_insert_with(|| Volume {
                name: name.clone(),
                project: None,
                key: None,
                declared: None,
                live: None,
            });
            if !declared.is_external() && volume.project.is_none() {
                volume.project = Some(project.to_string());
            }
            if volume.key.is_none() {
                volume.key = Some(key.clone());
                volume.declared = Some(declared.clone());
            }
            let _ = self.project_mut(project).volumes.insert(name);
        }
    }

    fn add_live_images(&mut self, images: Vec<InventoryImage>) {
        for live in images {
            let instance = image_ref_from_repo(&live.summary.repo_tags, &live.summary.repo_digests);
            self.images.push(Image::pulled(live, instance));
        }
    }

    fn add_builds(&mut self, project: &str, config: &ComposeConfig) {
        for (key, service) in &config.services {
            if service.build.is_none() {
                continue;
            }
            let dockerfile = self
                .dockerfiles
                .get(project)
                .and_then(|files| files.get(key))
                .cloned();
            let build = Build {
                project: project.to_string(),
                service: key.clone(),
                image_ref: image_ref_from_compose(project, key, service.image.as_deref(), true),
                dockerfile,
                image: None,
            };
            let _ = self.builds.insert(build_id(project, key), build);
        }
    }

    /// Attaches each container to the networks it names.
    fn link_networks(&mut self) {
        for container in self.containers.values() {
            for name in &container.networks {
                if let Some(network) = self.networks.get_mut(name) {
                    let _ = network.containers.insert(container.name.clone());
                } else {
                    tracing::warn!(container = %container.name, network = %name, "network not found");
                    self.diagnostics.push(Diagnostic::warning(
                        EntityKind::Container,
                        &container.name,
                        format!("network {name} not found"),
                    ));
                }
            }
        }
    }

    /// Gives every declared reference an image, unpulled when nothing
    /// matches it, then links each container by live image ID first and by
    /// reference otherwise.
    fn link_images(&mut self) {
        for container in self.containers.values() {
            if container.declared.is_none() || container.image_ref.is_empty() {
                continue;
            }
            let reference = &container.image_ref;
            match self.images.iter_mut().find(|image| image.matches(reference)) {
                Some(image) => {
                    if image.declared_ref.is_none() {
                        image.declared_ref = Some(reference.clone());
                    }
                }
                None => self.images.push(Image::unpulled(reference.clone())),
            }
        }

        for container in self.containers.values_mut() {
            let by_id = container
                .live
                .as_ref()
                .map(|live| live.image_id.as_str())
                .filter(|id| !id.is_empty())
                .and_then(|id| self.images.iter().position(|image| image.id == id));
            let found = by_id.or_else(|| {
                self.images
                    .iter()
                    .position(|image| image.matches(&container.image_ref))
            });
            let Some(image) = found.and_then(|index| self.images.get_mut(index)) else {
                continue;
            };
            let _ = image.containers.insert(container.name.clone());
            container.image = Some(image.id.clone());
        }
    }

    fn link_builds(&mut self) {
        for build in self.builds.values_mut() {
            if let Some(image) = self.images.iter_mut().find(|image| image.matches(&build.image_ref)) {
                image.build = Some(build.id());
                build.image = Some(image.id.clone());
            }
        }
    }

    fn finish(self, name: String, mut plugins: Vec<Plugin>) -> Host {
        let mut images = self.images;
        images.sort_by(|a, b| a.id.cmp(&b.id));
        plugins.sort_by(|a, b| a.name.cmp(&b.name));
        Host {
            name,
            projects: self.projects.into_values().collect(),
            containers: self.containers.into_values().collect(),
            networks: self.networks.into_values().collect(),
            volumes: self.volumes.into_values().collect(),
            images,
            builds: self.builds.into_values().collect(),
            plugins,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use dockscope_common::constants::COMPOSE_PROJECT_LABEL;
    use dockscope_common::types::Severity;
    use dockscope_compose::loader::{ComposeFile, ComposeState};
    use dockscope_compose::parser::parse_compose;
    use dockscope_engine::records::{
        EndpointSettings, ImageDetail, ImageSummary, NetworkSettings, PluginRecord,
    };

    use super::*;

    fn loaded(name: &str, yaml: &str) -> LoadedProject {
        let state = match parse_compose(yaml) {
            Ok(config) => ComposeState::Valid(config),
            Err(e) => ComposeState::Invalid(e),
        };
        LoadedProject {
            name: name.into(),
            compose: ComposeFile {
                path: PathBuf::from(format!("/s/{name}/compose.yml")),
                working_dir: PathBuf::from(format!("/s/{name}")),
                content: yaml.into(),
                state,
            },
            env_files: Vec::new(),
            dockerfiles: BTreeMap::new(),
        }
    }

    fn live_container(name: &str, project: Option<&str>, networks: &[&str]) -> ContainerRecord {
        ContainerRecord {
            id: format!("id-{name}"),
            names: vec![format!("/{name}")],
            state: "running".into(),
            labels: project
                .map(|p| BTreeMap::from([(COMPOSE_PROJECT_LABEL.to_string(), p.to_string())]))
                .unwrap_or_default(),
            network_settings: Some(NetworkSettings {
                networks: networks
                    .iter()
                    .map(|n| ((*n).to_string(), EndpointSettings::default()))
                    .collect(),
            }),
            ..ContainerRecord::default()
        }
    }

    fn live_network(name: &str) -> NetworkRecord {
        NetworkRecord {
            name: name.into(),
            id: format!("net-{name}"),
            driver: "bridge".into(),
            ..NetworkRecord::default()
        }
    }

    const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn live_image(id: &str, tags: &[&str], digests: &[&str]) -> InventoryImage {
        InventoryImage {
            summary: ImageSummary {
                id: id.into(),
                repo_tags: tags.iter().map(|t| (*t).to_string()).collect(),
                repo_digests: digests.iter().map(|d| (*d).to_string()).collect(),
                ..ImageSummary::default()
            },
            detail: ImageDetail::default(),
        }
    }

    #[test]
    fn services_without_networks_land_on_default() {
        let project = loaded("a", "services:\n  web:\n    image: nginx:1.25\n");
        let host = reconcile(vec![project], Inventory::default());

        let web = host.container("a-web-1").expect("container");
        assert_eq!(web.networks, BTreeSet::from(["a_default".to_string()]));
        let network = host.network("a_default").expect("default network");
        assert_eq!(network.key.as_deref(), Some("default"));
        assert!(network.containers.contains("a-web-1"));
        assert!(!network.is_instantiated());
        assert!(host.project("a").expect("project").networks.contains("a_default"));
    }

    #[test]
    fn live_container_merges_with_declared_one() {
        let project = loaded("shop", "services:\n  web:\n    image: nginx:1.25\n");
        let inventory = Inventory {
            containers: vec![live_container("shop-web-1", Some("shop"), &["shop_default"])],
            networks: vec![live_network("shop_default")],
            ..Inventory::default()
        };
        let host = reconcile(vec![project], inventory);

        assert_eq!(host.containers.len(), 1);
        let web = host.container("shop-web-1").expect("container");
        assert!(web.declared.is_some());
        assert!(web.is_running());
        assert_eq!(host.networks.len(), 1);
        assert!(host.network("shop_default").expect("network").is_instantiated());
    }

    #[test]
    fn container_name_overrides_identity() {
        let project = loaded("shop", "services:\n  web:\n    container_name: storefront\n");
        let host = reconcile(vec![project], Inventory::default());
        assert!(host.container("storefront").is_some());
        assert!(host.container("shop-web-1").is_none());
    }

    #[test]
    fn labels_create_projects_without_compose_files() {
        let inventory = Inventory {
            containers: vec![live_container("b-worker-1", Some("b"), &[])],
            volumes: vec![VolumeRecord {
                name: "c_data".into(),
                labels: BTreeMap::from([(COMPOSE_PROJECT_LABEL.to_string(), "c".to_string())]),
                ..VolumeRecord::default()
            }],
            ..Inventory::default()
        };
        let host = reconcile(Vec::new(), inventory);

        let b = host.project("b").expect("project b");
        assert!(b.compose.is_none());
        assert!(b.containers.contains("b-worker-1"));
        assert!(b.is_running(&host));
        assert!(host.project("c").expect("project c").volumes.contains("c_data"));
    }

    #[test]
    fn declared_image_without_live_match_is_unpulled() {
        let project = loaded("a", "services:\n  web:\n    image: nginx:1.25\n  api:\n    image: nginx:1.25\n");
        let host = reconcile(vec![project], Inventory::default());

        assert_eq!(host.images.len(), 1);
        let image = host.image("nginx:1.25").expect("image");
        assert!(!image.is_pulled());
        assert_eq!(image.containers.len(), 2);
        let web = host.container("a-web-1").expect("container");
        assert_eq!(host.container_image(web).map(|i| i.id.as_str()), Some("nginx:1.25"));
    }

    #[test]
    fn declared_image_matches_live_image_by_reference() {
        let project = loaded("a", "services:\n  web:\n    image: nginx:1.25\n");
        let inventory = Inventory {
            images: vec![live_image("sha256:n", &["nginx:1.25"], &[&format!("nginx@{DIGEST}")])],
            ..Inventory::default()
        };
        let host = reconcile(vec![project], inventory);

        assert_eq!(host.images.len(), 1);
        let image = host.image("sha256:n").expect("image");
        assert!(image.is_pulled());
        assert!(image.declared_ref.is_some());
        assert!(image.containers.contains("a-web-1"));
    }

    #[test]
    fn live_image_id_wins_over_reference() {
        let mut record = live_container("tool", None, &[]);
        record.image = "busybox".into();
        record.image_id = "sha256:b2".into();
        let inventory = Inventory {
            containers: vec![record],
            images: vec![
                live_image("sha256:b1", &["busybox:latest"], &[]),
                live_image("sha256:b2", &[], &[]),
            ],
            ..Inventory::default()
        };
        let host = reconcile(Vec::new(), inventory);
        let tool = host.container("tool").expect("container");
        assert_eq!(tool.image.as_deref(), Some("sha256:b2"));
        assert!(host.image("sha256:b1").expect("image").containers.is_empty());
    }

    #[test]
    fn running_an_older_image_leaves_the_declared_one_unpulled() {
        let project = loaded("a", "services:\n  web:\n    image: nginx:1.26\n");
        let mut record = live_container("a-web-1", Some("a"), &[]);
        record.image = "nginx:1.25".into();
        record.image_id = "sha256:old".into();
        let inventory = Inventory {
            containers: vec![record],
            images: vec![live_image("sha256:old", &["nginx:1.25"], &[&format!("nginx@{DIGEST}")])],
            ..Inventory::default()
        };
        let host = reconcile(vec![project], inventory);

        assert_eq!(host.images.len(), 2);
        let old = host.image("sha256:old").expect("live image");
        assert!(old.declared_ref.is_none());
        assert!(old.containers.contains("a-web-1"));
        let wanted = host.image("nginx:1.26").expect("declared image");
        assert!(!wanted.is_pulled());
        assert!(wanted.containers.is_empty());
        let web = host.container("a-web-1").expect("container");
        assert_eq!(web.image.as_deref(), Some("sha256:old"));
    }

    #[test]
    fn locally_tagged_image_satisfies_a_plain_reference() {
        let project = loaded("a", "services:\n  api:\n    image: myorg/api:1\n");
        let inventory = Inventory {
            images: vec![live_image("sha256:api", &["myorg/api:1"], &[])],
            ..Inventory::default()
        };
        let host = reconcile(vec![project], inventory);

        assert_eq!(host.images.len(), 1);
        let image = host.image("sha256:api").expect("image");
        assert!(image.is_pulled());
        assert!(image.declared_ref.is_some());
        assert!(image.containers.contains("a-api-1"));
    }

    #[test]
    fn missing_network_is_a_warning() {
        let yaml = "\
services:
  web:
    networks: [proxy]
networks:
  proxy:
    external: true
";
        let host = reconcile(vec![loaded("a", yaml)], Inventory::default());

        assert!(host.network("proxy").is_none());
        let warnings: Vec<_> = host.diagnostics_for(EntityKind::Container, "a-web-1").collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, Severity::Warning);
        assert!(warnings[0].message.contains("proxy"));
    }

    #[test]
    fn external_network_resolves_to_live_instance() {
        let yaml = "\
services:
  web:
    networks: [proxy]
networks:
  proxy:
    external: true
";
        let inventory = Inventory {
            networks: vec![live_network("proxy")],
            ..Inventory::default()
        };
        let host = reconcile(vec![loaded("a", yaml)], inventory);

        let proxy = host.network("proxy").expect("network");
        assert!(proxy.containers.contains("a-web-1"));
        assert!(proxy.project.is_none());
        assert!(host.diagnostics.is_empty());
        assert!(host.network("a_default").is_none());
    }

    #[test]
    fn named_networks_and_volumes_resolve() {
        let yaml = "\
services:
  db:
    networks: [back]
    volumes: [data:/var/lib/db]
networks:
  back:
    name: backend
volumes:
  data:
  logs:
    name: shared-logs
";
        let host = reconcile(vec![loaded("shop", yaml)], Inventory::default());

        assert!(host.network("backend").expect("network").containers.contains("shop-db-1"));
        assert!(host.volume("shop_data").is_some());
        assert!(host.volume("shared-logs").is_some());
        let project = host.project("shop").expect("project");
        assert_eq!(project.volumes.len(), 2);
    }

    #[test]
    fn builds_link_to_their_image() {
        let yaml = "services:\n  api:\n    build: ./api\n";
        let mut project = loaded("shop", yaml);
        let _ = project.dockerfiles.insert(
            "api".into(),
            Dockerfile {
                working_dir: PathBuf::from("/s/shop/api"),
                path: PathBuf::from("/s/shop/api/Dockerfile"),
                content: Some("FROM alpine\n".into()),
            },
        );
        let inventory = Inventory {
            images: vec![live_image("sha256:api", &["shop-api:latest"], &[])],
            ..Inventory::default()
        };
        let host = reconcile(vec![project], inventory);

        let build = host.build("shop/api").expect("build");
        assert_eq!(build.image.as_deref(), Some("sha256:api"));
        assert!(build.dockerfile.is_some());
        assert_eq!(host.image("sha256:api").and_then(|i| i.build.as_deref()), Some("shop/api"));
    }

    #[test]
    fn invalid_compose_is_reported_on_the_project() {
        let host = reconcile(
            vec![loaded("bad", "services:\n  web:\n    bogus: 1\n"), loaded("good", "services:\n  web: {}\n")],
            Inventory::default(),
        );
        let bad = host.project("bad").expect("project");
        assert!(bad.config_error().is_some());
        assert!(bad.containers.is_empty());
        assert_eq!(host.diagnostics_for(EntityKind::Project, "bad").count(), 1);
        assert!(host.container("good-web-1").is_some());
    }

    #[test]
    fn colliding_names_are_diagnosed() {
        let host = reconcile(
            vec![
                loaded("a", "services:\n  web:\n    container_name: shared\n"),
                loaded("b", "services:\n  api:\n    container_name: shared\n"),
            ],
            Inventory::default(),
        );
        assert_eq!(host.containers.len(), 1);
        assert_eq!(host.container("shared").and_then(|c| c.project.as_deref()), Some("a"));
        assert_eq!(host.diagnostics_for(EntityKind::Container, "shared").count(), 1);
    }

    #[test]
    fn plugins_are_carried_over_sorted() {
        let inventory = Inventory {
            host_name: "box".into(),
            plugins: vec![
                PluginRecord {
                    id: "2".into(),
                    name: "z/plugin:latest".into(),
                    enabled: true,
                },
                PluginRecord {
                    id: "1".into(),
                    name: "a/plugin:latest".into(),
                    enabled: false,
                },
            ],
            ..Inventory::default()
        };
        let host = reconcile(Vec::new(), inventory);
        assert_eq!(host.name, "box");
        assert_eq!(host.plugins[0].name, "a/plugin:latest");
        assert!(!host.plugin("a/plugin:latest").expect("plugin").enabled);
    }
}
