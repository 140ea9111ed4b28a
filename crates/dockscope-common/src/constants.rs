//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Label the compose CLI stamps on every container, network, and volume it creates.
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

/// Label carrying the compose service key of a container.
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// Engine API base URL used when nothing else is configured.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:2375";

/// Directory scanned for compose projects by default.
pub const DEFAULT_SERVICES_ROOT: &str = "/services";

/// Maximum directory depth for compose file discovery.
pub const DISCOVERY_MAX_DEPTH: usize = 3;

/// File names recognised as compose files.
pub const COMPOSE_FILE_NAMES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Directories never descended into during discovery.
pub const IGNORED_DIRECTORIES: &[&str] = &[".git", "node_modules"];

/// Project-scoped environment file read next to each compose file.
pub const DOTENV_FILE_NAME: &str = ".env";

/// Network key services land on when they declare no networks.
pub const DEFAULT_NETWORK_KEY: &str = "default";

/// Dockerfile name assumed when `build.dockerfile` is absent.
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Tag assumed for references that carry none.
pub const DEFAULT_TAG: &str = "latest";

/// Registry assumed for references that name none.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Implicit namespace for single-segment Docker Hub repositories.
pub const DEFAULT_NAMESPACE: &str = "library";

/// SHA-256 digest length in hex characters.
pub const SHA256_HEX_LENGTH: usize = 64;

/// Freshness window of the registry response cache.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Default timeout for engine API calls.
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for registry calls, which are best-effort.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Application name used in CLI output and data paths.
pub const APP_NAME: &str = "dockscope";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "dscope";

/// Returns the data directory, preferring `$HOME/.dockscope`, falling back
/// to `/var/lib/dockscope`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        let user_dir = PathBuf::from(home).join(format!(".{APP_NAME}"));
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from("/var/lib").join(APP_NAME)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default location of the registry response cache.
pub fn default_cache_file() -> PathBuf {
    data_dir().join("cache").join("requests.json")
}
