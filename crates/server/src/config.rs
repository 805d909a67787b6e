use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use toolgate_core::{RedbSessionStore, SessionStore};
use toolgate_mcp::{Dispatcher, ToolRegistry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(skip)]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub server: ServerIdentity,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Name and version reported by the initialize handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerIdentity {
    #[serde(default = "default_server_name")]
    pub name: String,

    #[serde(default = "default_server_version")]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared bearer token; every request is rejected while unset.
    /// The TOOLGATE_AUTH_TOKEN environment variable takes precedence.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_server_name() -> String {
    "toolgate".to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_session_file() -> String {
    "sessions.redb".to_string()
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &PathBuf, data_dir: PathBuf) -> Result<Self> {
        // Create data directory if it doesn't exist
        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        // Load config file if it exists, otherwise use defaults
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self {
                data_dir: data_dir.clone(),
                server: Default::default(),
                auth: Default::default(),
                storage: Default::default(),
            }
        };

        config.data_dir = data_dir;

        if let Ok(token) = std::env::var("TOOLGATE_AUTH_TOKEN") {
            config.auth.token = Some(token);
        }

        Ok(config)
    }

    /// Get the session database path
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.session_file)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<dyn SessionStore>,
    pub auth_token: Option<String>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let sessions: Arc<dyn SessionStore> = Arc::new(
            RedbSessionStore::new(config.session_path())
                .context("Failed to create session store")?,
        );

        let mut registry = ToolRegistry::new();
        crate::tools::register_builtin_tools(&mut registry, sessions.clone())
            .context("Failed to register tools")?;

        let dispatcher = Arc::new(Dispatcher::new(
            config.server.name.clone(),
            config.server.version.clone(),
            registry,
        ));

        if config.auth.token.is_none() {
            tracing::warn!("No auth token configured; all requests will be rejected");
        }

        Ok(Self {
            dispatcher,
            sessions,
            auth_token: config.auth.token.clone(),
        })
    }
}
