//! Configuration for the `todo-sync` client.
//!
//! Layered with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`./todo-sync.toml` or `--config`)
//! 4. Compiled defaults

use std::path::{Path, PathBuf};

use crate::engine::EngineOptions;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "todo-sync.toml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    sync: SyncFileConfig,
    log_level: Option<String>,
}

/// `[server]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    base_url: Option<String>,
    api_key: Option<String>,
}

/// `[sync]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    fetch_tasks_on_load: Option<bool>,
    fail_entity_on_network_error: Option<bool>,
}

// ---------------------------------------------------------------------------
// CLI arguments shared with the binary
// ---------------------------------------------------------------------------

/// Connection and logging flags.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to config file (default: `./todo-sync.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the todolist API.
    #[arg(long, env = "TODO_SYNC_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API key sent in the `API-KEY` header.
    #[arg(long, env = "TODO_SYNC_API_KEY", global = true)]
    pub api_key: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, env = "TODO_SYNC_LOG", global = true)]
    pub log_level: Option<String>,

    /// Load every todolist's tasks after fetching todolists.
    #[arg(long, env = "TODO_SYNC_FETCH_TASKS_ON_LOAD", global = true)]
    pub fetch_tasks_on_load: Option<bool>,

    /// Mark a row failed when its request gets no usable response.
    #[arg(long, env = "TODO_SYNC_FAIL_ENTITY_ON_NETWORK_ERROR", global = true)]
    pub fail_entity_on_network_error: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub log_level: String,
    pub fetch_tasks_on_load: bool,
    pub fail_entity_on_network_error: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let options = EngineOptions::default();
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            api_key: None,
            log_level: "info".to_string(),
            fetch_tasks_on_load: options.fetch_tasks_on_load,
            fail_entity_on_network_error: options.fail_entity_on_network_error,
        }
    }
}

impl SyncConfig {
    /// Merge CLI args and env vars over the TOML file and defaults.
    ///
    /// An explicit `--config` that cannot be read is an error; a missing
    /// default file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(args.config.as_deref())?;
        Ok(Self::resolve(args, file))
    }

    fn resolve(args: &ConfigArgs, file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            base_url: args
                .base_url
                .clone()
                .or(file.server.base_url)
                .unwrap_or(defaults.base_url),
            api_key: args.api_key.clone().or(file.server.api_key),
            log_level: args
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            fetch_tasks_on_load: args
                .fetch_tasks_on_load
                .or(file.sync.fetch_tasks_on_load)
                .unwrap_or(defaults.fetch_tasks_on_load),
            fail_entity_on_network_error: args
                .fail_entity_on_network_error
                .or(file.sync.fail_entity_on_network_error)
                .unwrap_or(defaults.fail_entity_on_network_error),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            fetch_tasks_on_load: self.fetch_tasks_on_load,
            fail_entity_on_network_error: self.fail_entity_on_network_error,
        }
    }
}

fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_config(&contents),
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}

fn parse_config(contents: &str) -> Result<ConfigFile, ConfigError> {
    Ok(toml::from_str(contents)?)
}
