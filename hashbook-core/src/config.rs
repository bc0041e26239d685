//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "hashbook.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the hashbook.yml schema
///
/// Every field has a default, so an empty file (or no file at all) builds
/// `./content` into `./public`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_site_title")]
    pub site_title: String,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Absolute site URL used for sitemap locations
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,

    #[serde(default = "default_true")]
    pub hard_wraps: bool,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_site_title() -> String {
    String::from("Documentation")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_base_url() -> String {
    String::from("https://mysite.com")
}

fn default_highlight_theme() -> String {
    String::from(crate::markdown::highlight::DEFAULT_THEME)
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_title: default_site_title(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            base_url: default_base_url(),
            highlight_theme: default_highlight_theme(),
            hard_wraps: true,
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Defaults with explicit input and output directories
    pub fn with_dirs(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load the file when it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}; using defaults", path);
            Ok(Self::default())
        }
    }

    /// Get the input directory, resolved relative to config file
    pub fn input_dir(&self) -> PathBuf {
        self.resolve_path(&self.input_dir)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.output_dir)
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_deref().and_then(Path::parent) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}
