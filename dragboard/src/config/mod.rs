//! Configuration for the `dragboard` command-line driver.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/dragboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};

use dragboard_proto::document::DEFAULT_COLLECTION;

use crate::drag::DragItem;
use crate::sync::{BootstrapPolicy, SyncMode, SyncOptions};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    store: StoreFileConfig,
    sync: SyncFileConfig,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    store_dir: Option<PathBuf>,
    collection: Option<String>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    mode: Option<SyncMode>,
    bootstrap: Option<BootstrapPolicy>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved driver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Directory holding one `<collection>.board` file per collection.
    pub store_dir: PathBuf,
    /// Collection holding the board document.
    pub collection: String,
    /// Dispatch strategy for positional writes.
    pub sync_mode: SyncMode,
    /// Behavior when no board document exists yet.
    pub bootstrap: BootstrapPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            collection: DEFAULT_COLLECTION.to_string(),
            sync_mode: SyncMode::default(),
            bootstrap: BootstrapPolicy::default(),
        }
    }
}

impl BoardConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or if any config file present cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            store_dir: cli
                .store_dir
                .clone()
                .or_else(|| file.store.store_dir.clone())
                .unwrap_or(defaults.store_dir),
            collection: cli
                .collection
                .clone()
                .or_else(|| file.store.collection.clone())
                .unwrap_or(defaults.collection),
            sync_mode: cli
                .sync_mode
                .or(file.sync.mode)
                .unwrap_or(defaults.sync_mode),
            bootstrap: cli
                .bootstrap
                .or(file.sync.bootstrap)
                .unwrap_or(defaults.bootstrap),
        }
    }

    /// Options for loading and synchronizing the board.
    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            collection: self.collection.clone(),
            mode: self.sync_mode,
            bootstrap: self.bootstrap,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Kanban board with drag-reorder and document-store sync")]
pub struct CliArgs {
    /// Directory holding the board store files.
    #[arg(long, env = "DRAGBOARD_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Collection holding the board document.
    #[arg(long, env = "DRAGBOARD_COLLECTION")]
    pub collection: Option<String>,

    /// Remote write strategy (fire-and-forget, coalesce).
    #[arg(long)]
    pub sync_mode: Option<SyncMode>,

    /// Behavior on an empty collection (lazy, eager).
    #[arg(long)]
    pub bootstrap: Option<BootstrapPolicy>,

    /// Path to config file (default: `~/.config/dragboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "DRAGBOARD_LOG")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the board as JSON.
    #[arg(long)]
    pub json: bool,

    /// Operation to run (default: show).
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Board operations available from the command line.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the board (default).
    Show,
    /// Append a new column.
    AddColumn,
    /// Append a new task to a column.
    AddTask {
        /// Column id.
        column: String,
    },
    /// Rename a column.
    RenameColumn {
        /// Column id.
        id: String,
        /// New title.
        title: String,
    },
    /// Replace a task's content.
    RenameTask {
        /// Task id.
        id: String,
        /// New content.
        content: String,
    },
    /// Delete a column and its tasks.
    DeleteColumn {
        /// Column id.
        id: String,
    },
    /// Delete a task.
    DeleteTask {
        /// Task id.
        id: String,
    },
    /// Drag an entity and drop it (`column:<id>` or `task:<id>`).
    Drag {
        /// Dragged entity.
        active: DragItem,
        /// Entity hovered and dropped on.
        #[arg(long)]
        over: Option<DragItem>,
        /// Abandon the drag after hovering instead of dropping.
        #[arg(long)]
        cancel: bool,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_store_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".dragboard"), |d| d.join("dragboard"))
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("dragboard").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
