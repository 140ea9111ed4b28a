//! Loads compose projects from disk.
//!
//! For each compose file the loader reads the sibling `.env`, interpolates
//! the raw text, parses and validates it, then reads the env files and
//! Dockerfiles it references. Failures are recorded on the project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dockscope_common::constants::{DEFAULT_DOCKERFILE, DOTENV_FILE_NAME};
use dockscope_common::error::ConfigError;
use futures::future::join_all;
use serde::Serialize;

use crate::discovery::FileSystem;
use crate::dotenv::parse_dotenv;
use crate::env_files::{EnvFile, collect_service_env_files};
use crate::interpolate::{Environment, interpolate};
use crate::parser::{from_document, parse_document};
use crate::schema::ComposeConfig;

/// Outcome of loading a compose file. Exactly one of the two is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum ComposeState {
    /// The file parsed and validated.
    Valid(ComposeConfig),
    /// The file could not be turned into a valid configuration.
    Invalid(ConfigError),
}

impl ComposeState {
    /// The configuration, when valid.
    #[must_use]
    pub const fn config(&self) -> Option<&ComposeConfig> {
        match self {
            Self::Valid(config) => Some(config),
            Self::Invalid(_) => None,
        }
    }

    /// The error, when invalid.
    #[must_use]
    pub const fn error(&self) -> Option<&ConfigError> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(error) => Some(error),
        }
    }
}

/// A compose file and its load result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeFile {
    /// Path of the compose file.
    pub path: PathBuf,
    /// Directory relative paths are resolved against.
    pub working_dir: PathBuf,
    /// Raw text, before interpolation. Empty when unreadable.
    pub content: String,
    /// Parse result.
    pub state: ComposeState,
}

/// A Dockerfile resolved for a service with a local build context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dockerfile {
    /// Build context directory.
    pub working_dir: PathBuf,
    /// Dockerfile path.
    pub path: PathBuf,
    /// Content, `None` when unreadable.
    pub content: Option<String>,
}

/// Everything read from disk for one compose project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedProject {
    /// Project name derived from the compose file's directory.
    pub name: String,
    /// The compose file.
    pub compose: ComposeFile,
    /// Root `.env` first, then service env files.
    pub env_files: Vec<EnvFile>,
    /// Dockerfiles keyed by service name.
    pub dockerfiles: BTreeMap<String, Dockerfile>,
}

impl LoadedProject {
    /// The configuration, when valid.
    #[must_use]
    pub const fn config(&self) -> Option<&ComposeConfig> {
        self.compose.state.config()
    }
}

/// Derives a project name from a compose file path: the parent directory
/// name with every `.` removed.
#[must_use]
pub fn project_name_from_path(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().replace('.', ""))
        .unwrap_or_default()
}

/// Returns whether a build context points at the local filesystem.
#[must_use]
pub fn is_local_context(context: &str) -> bool {
    !(context.contains("://") || context.starts_with("git@"))
}

/// Loads compose projects through a [`FileSystem`].
#[derive(Clone)]
pub struct ComposeLoader {
    fs: Arc<dyn FileSystem>,
    base_env: Environment,
}

impl std::fmt::Debug for ComposeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeLoader")
            .field("base_env", &self.base_env.len())
            .finish_non_exhaustive()
    }
}

impl ComposeLoader {
    /// Creates a loader with an empty base environment.
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            base_env: Environment::new(),
        }
    }

    /// Adds variables that take precedence over every project's `.env`.
    #[must_use]
    pub fn with_base_env(mut self, env: Environment) -> Self {
        self.base_env = env;
        self
    }

    /// Discovers and loads every compose project under `root`.
    pub async fn load_all(&self, root: &Path, max_depth: usize) -> Vec<LoadedProject> {
        let files = self.fs.discover(root, max_depth).await;
        tracing::info!(root = %root.display(), files = files.len(), "loading compose projects");
        join_all(files.iter().map(|path| self.load_project(path))).await
    }

    /// Loads the compose project at `path`.
    pub async fn load_project(&self, path: &Path) -> LoadedProject {
        let working_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = project_name_from_path(path);
        let dotenv_path = working_dir.join(DOTENV_FILE_NAME);

        let (content, dotenv) = tokio::join!(
            self.fs.read_to_string(path),
            self.fs.read_to_string(&dotenv_path)
        );

        let dotenv = dotenv.ok();
        let mut env = dotenv.as_deref().map(parse_dotenv).unwrap_or_default();
        env.extend(self.base_env.clone());

        let (content, state, document) = match content {
            Ok(content) => {
                let (state, document) = evaluate(&content, &env);
                (content, state, document)
            }
            Err(e) => {
                let error = ConfigError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                (String::new(), ComposeState::Invalid(error), None)
            }
        };

        if let ComposeState::Invalid(error) = &state {
            tracing::warn!(project = %name, path = %path.display(), %error, "compose file is invalid");
        }

        let mut env_files = Vec::new();
        if dotenv.is_some() {
            env_files.push(EnvFile::project(dotenv_path, dotenv));
        }
        let service_files = document
            .as_ref()
            .map(|doc| collect_service_env_files(doc, &working_dir))
            .unwrap_or_default();

        let (service_files, dockerfiles) = tokio::join!(
            self.read_env_files(service_files),
            self.read_dockerfiles(state.config(), &working_dir)
        );
        env_files.extend(service_files);

        tracing::debug!(project = %name, env_files = env_files.len(), dockerfiles = dockerfiles.len(), "loaded compose project");
        LoadedProject {
            name,
            compose: ComposeFile {
                path: path.to_path_buf(),
                working_dir,
                content,
                state,
            },
            env_files,
            dockerfiles,
        }
    }

    async fn read_env_files(&self, files: Vec<EnvFile>) -> Vec<EnvFile> {
        join_all(files.into_iter().map(|mut file| async move {
            file.content = self.fs.read_to_string(&file.path).await.ok();
            file
        }))
        .await
    }

    async fn read_dockerfiles(
        &self,
        config: Option<&ComposeConfig>,
        working_dir: &Path,
    ) -> BTreeMap<String, Dockerfile> {
        let Some(config) = config else {
            return BTreeMap::new();
        };
        let pending = config.services.iter().filter_map(|(service, definition)| {
            let build = definition.build.as_ref()?;
            if !is_local_context(build.context()) {
                return None;
            }
            let context_dir = working_dir.join(build.context().trim_start_matches("./"));
            let path = context_dir.join(build.dockerfile().unwrap_or(DEFAULT_DOCKERFILE));
            Some(async move {
                let content = self.fs.read_to_string(&path).await.ok();
                (
                    service.clone(),
                    Dockerfile {
                        working_dir: context_dir,
                        path,
                        content,
                    },
                )
            })
        });
        join_all(pending).await.into_iter().collect()
    }
}

/// Interpolates, parses, and validates compose text.
///
/// Also returns the untyped document when one could be produced, falling
/// back to the uninterpolated text so env files are still discoverable
/// when interpolation fails.
fn evaluate(content: &str, env: &Environment) -> (ComposeState, Option<serde_yaml::Value>) {
    let document = match interpolate(content, env).and_then(|text| parse_document(&text)) {
        Ok(document) => document,
        Err(error) => {
            let fallback = parse_document(content).ok();
            return (ComposeState::Invalid(error), fallback);
        }
    };
    let state = match from_document(document.clone()) {
        Ok(config) => ComposeState::Valid(config),
        Err(error) => ComposeState::Invalid(error),
    };
    (state, Some(document))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::env_files::EnvFileScope;

    /// In-memory filesystem keyed by absolute path.
    #[derive(Default)]
    struct MemoryFs {
        files: HashMap<PathBuf, String>,
    }

    impl MemoryFs {
        fn with(mut self, path: &str, content: &str) -> Self {
            let _ = self.files.insert(PathBuf::from(path), content.to_string());
            self
        }
    }

    #[async_trait]
    impl FileSystem for MemoryFs {
        async fn discover(&self, root: &Path, _max_depth: usize) -> Vec<PathBuf> {
            let mut found: Vec<PathBuf> = self
                .files
                .keys()
                .filter(|p| p.starts_with(root))
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(crate::discovery::is_compose_file_name)
                })
                .cloned()
                .collect();
            found.sort();
            found
        }

        async fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        async fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }
    }

    fn loader(fs: MemoryFs) -> ComposeLoader {
        ComposeLoader::new(Arc::new(fs))
    }

    #[test]
    fn project_name_strips_dots() {
        assert_eq!(
            project_name_from_path(Path::new("/services/my.site/docker-compose.yml")),
            "mysite"
        );
    }

    #[test]
    fn remote_build_contexts_are_not_local() {
        assert!(is_local_context("./app"));
        assert!(!is_local_context("https://github.com/acme/app.git"));
        assert!(!is_local_context("git@github.com:acme/app.git"));
    }

    #[tokio::test]
    async fn dotenv_default_and_override() {
        let fs = MemoryFs::default()
            .with(
                "/services/a/compose.yml",
                "services:\n  web:\n    image: nginx:${TAG:-1.25}\n    ports: [\"${PORT:-8080}:80\"]\n",
            )
            .with("/services/a/.env", "TAG=1.27\n");
        let project = loader(fs)
            .load_project(Path::new("/services/a/compose.yml"))
            .await;
        let config = project.config().expect("valid");
        assert_eq!(config.services["web"].image.as_deref(), Some("nginx:1.27"));
        assert_eq!(config.services["web"].published_ports(), vec!["8080"]);
        assert_eq!(project.env_files.len(), 1);
        assert_eq!(project.env_files[0].scope, EnvFileScope::Project);
    }

    #[tokio::test]
    async fn base_env_wins_over_dotenv() {
        let fs = MemoryFs::default()
            .with("/s/a/compose.yml", "services:\n  web:\n    image: app:${TAG}\n")
            .with("/s/a/.env", "TAG=dotenv\n");
        let mut base = Environment::new();
        let _ = base.insert("TAG".into(), "shell".into());
        let project = loader(fs)
            .with_base_env(base)
            .load_project(Path::new("/s/a/compose.yml"))
            .await;
        assert_eq!(
            project.config().expect("valid").services["web"].image.as_deref(),
            Some("app:shell")
        );
    }

    #[tokio::test]
    async fn missing_required_variable_is_recorded() {
        let fs = MemoryFs::default().with(
            "/s/a/compose.yml",
            "services:\n  web:\n    image: app\n    env_file: web.env\n    environment:\n      KEY: ${SECRET:?missing}\n",
        );
        let project = loader(fs).load_project(Path::new("/s/a/compose.yml")).await;
        assert!(matches!(
            project.compose.state.error(),
            Some(ConfigError::MissingVariable { variable, .. }) if variable == "SECRET"
        ));
        assert_eq!(project.env_files.len(), 1, "env files still collected");
        assert!(!project.compose.content.is_empty());
    }

    #[tokio::test]
    async fn unreadable_file_is_an_io_error() {
        let project = loader(MemoryFs::default())
            .load_project(Path::new("/s/gone/compose.yml"))
            .await;
        assert!(matches!(
            project.compose.state,
            ComposeState::Invalid(ConfigError::Io { .. })
        ));
        assert_eq!(project.name, "gone");
    }

    #[tokio::test]
    async fn schema_failure_keeps_env_files() {
        let fs = MemoryFs::default()
            .with(
                "/s/a/compose.yml",
                "services:\n  web:\n    bogus: 1\n    env_file: [web.env]\n",
            )
            .with("/s/a/web.env", "A=1\n");
        let project = loader(fs).load_project(Path::new("/s/a/compose.yml")).await;
        assert!(matches!(
            project.compose.state,
            ComposeState::Invalid(ConfigError::Schema { .. })
        ));
        assert_eq!(project.env_files[0].content.as_deref(), Some("A=1\n"));
        assert_eq!(project.env_files[0].services(), ["web"]);
    }

    #[tokio::test]
    async fn dockerfiles_resolved_for_local_contexts() {
        let fs = MemoryFs::default()
            .with(
                "/s/shop/compose.yml",
                "services:\n  web:\n    build: ./web\n  api:\n    build:\n      context: ./api\n      dockerfile: Dockerfile.prod\n  remote:\n    build: https://example.com/repo.git\n",
            )
            .with("/s/shop/web/Dockerfile", "FROM nginx\n");
        let project = loader(fs).load_project(Path::new("/s/shop/compose.yml")).await;
        assert_eq!(project.dockerfiles.len(), 2);
        let web = &project.dockerfiles["web"];
        assert_eq!(web.content.as_deref(), Some("FROM nginx\n"));
        let api = &project.dockerfiles["api"];
        assert_eq!(api.path, PathBuf::from("/s/shop/api/Dockerfile.prod"));
        assert!(api.content.is_none());
    }

    #[tokio::test]
    async fn load_all_isolates_failures() {
        let fs = MemoryFs::default()
            .with("/s/good/compose.yml", "services:\n  web:\n    image: nginx\n")
            .with("/s/bad/compose.yml", "services:\n  web:\n    image: ${SECRET:?missing}\n");
        let projects = loader(fs).load_all(Path::new("/s"), 3).await;
        assert_eq!(projects.len(), 2);
        let good = projects.iter().find(|p| p.name == "good").expect("good");
        let bad = projects.iter().find(|p| p.name == "bad").expect("bad");
        assert!(good.config().is_some());
        assert!(bad.config().is_none());
    }
}
