//! Configuration file handling
//!
//! Lookup order for the TOML file:
//! 1. `--config <path>`
//! 2. `recvfill.toml` in the working directory
//! 3. `$RECVFILL_CONFIG` (may be set in `.env`)
//! 4. `<config dir>/recvfill/config.toml`
//!
//! When none exists, built-in defaults are used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::form::{FormSelectors, PageWait, WebDriverConfig};
use crate::records::TransformOptions;
use crate::sheet::{ColumnLabels, ColumnSelection, ReadOptions, SheetRef, parse_column_letters};

pub const CONFIG_ENV: &str = "RECVFILL_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "recvfill.toml";
const APP_DIR: &str = "recvfill";
const USER_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub transform: TransformOptions,
    pub output: OutputConfig,
    pub form: FormConfig,
    pub timing: TimingConfig,
}

/// Source workbook and the part of it that holds the billing lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Raw billing workbook
    pub path: Option<PathBuf>,
    /// Previously exported processed file
    pub processed: Option<PathBuf>,
    pub sheet: SheetRef,
    /// Column letters, e.g. "C,T,U" or "A:C"
    pub columns: String,
    pub header_row: usize,
    pub skip_rows: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            processed: None,
            sheet: SheetRef::Index(2),
            columns: "C,T,U".to_string(),
            header_row: 0,
            skip_rows: 0,
        }
    }
}

impl InputConfig {
    pub fn read_options(&self) -> Result<ReadOptions> {
        let columns = self.columns.trim();
        let selection = if columns.is_empty() {
            None
        } else {
            parse_column_letters(columns)
                .with_context(|| format!("Invalid [input] columns '{}'", columns))?;
            Some(ColumnSelection::Letters(columns.to_string()))
        };

        Ok(ReadOptions {
            header: Some(self.header_row),
            skip_rows: self.skip_rows,
            columns: selection,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for processed_data_*.xlsx exports
    pub dir: PathBuf,
    pub labels: ColumnLabels,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            labels: ColumnLabels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Receiving form URL
    pub url: String,
    pub headless: bool,
    /// Element whose presence means the grid is loaded; defaults to the first row label
    pub ready_element: Option<String>,
    pub selectors: FormSelectors,
    pub webdriver: WebDriverConfig,
}

impl FormConfig {
    pub fn ready_element(&self) -> String {
        self.ready_element
            .clone()
            .unwrap_or_else(|| self.selectors.label_id(0))
    }
}

/// Waits and pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed wait after opening the URL, before the operator logs in
    pub page_settle_ms: u64,
    /// Upper bound on waiting for the ready element after login
    pub ready_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Pause between rows
    pub row_delay_ms: u64,
    /// Pause after both fields of a row are typed
    pub field_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            page_settle_ms: 10_000,
            ready_timeout_secs: 30,
            poll_interval_ms: 250,
            row_delay_ms: 500,
            field_settle_ms: 300,
        }
    }
}

impl TimingConfig {
    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn row_delay(&self) -> Duration {
        Duration::from_millis(self.row_delay_ms)
    }

    pub fn field_settle(&self) -> Duration {
        Duration::from_millis(self.field_settle_ms)
    }

    /// Poll for `element` until it appears or the ready timeout runs out
    pub fn ready_wait(&self, element: impl Into<String>) -> PageWait {
        PageWait::element(
            element,
            Duration::from_secs(self.ready_timeout_secs),
            Duration::from_millis(self.poll_interval_ms.max(1)),
        )
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load the first existing configuration file, or the defaults
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            info!("Loading config from {}", path.display());
            return Ok((Self::load_from(path)?, ConfigSource::File(path.to_path_buf())));
        }

        match existing_config_path() {
            Some(path) => {
                info!("Loading config from {}", path.display());
                let config = Self::load_from(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            None => {
                debug!("No config file found, using defaults");
                Ok((Self::default(), ConfigSource::Defaults))
            }
        }
    }

    /// Write this configuration, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

/// `<config dir>/recvfill/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(USER_CONFIG_FILE))
}

fn env_config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// The path `config init` writes to when no `--config` is given
pub fn default_config_path() -> PathBuf {
    env_config_path()
        .or_else(user_config_path)
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
}

pub fn existing_config_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    first_existing(&cwd, env_config_path(), user_config_path())
}

fn first_existing(cwd: &Path, from_env: Option<PathBuf>, user: Option<PathBuf>) -> Option<PathBuf> {
    std::iter::once(Some(cwd.join(LOCAL_CONFIG_FILE)))
        .chain([from_env, user])
        .flatten()
        .find(|path| path.is_file())
}
