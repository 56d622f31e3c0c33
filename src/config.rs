//! User configuration
//!
//! Per-user defaults for the build toolchain, read from TOML. Manifest
//! settings and command-line flags override these.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Local config file name, checked in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".simdstr.toml";

/// Application configuration loaded from TOML files
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// `CMake` executable
    #[serde(default)]
    pub cmake: Option<String>,

    /// C compiler for direct builds
    #[serde(default)]
    pub compiler: Option<String>,

    /// Interpreter the extensions are built for
    #[serde(default)]
    pub interpreter: Option<String>,

    /// Parallel build jobs
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Temporary build directory
    #[serde(default)]
    pub build_temp: Option<String>,

    /// Output directory for built extensions
    #[serde(default)]
    pub build_lib: Option<String>,
}

impl Config {
    /// Load configuration from TOML files.
    /// Priority: ./.simdstr.toml -> ~/.config/simdstr/config.toml
    pub fn load() -> Result<Self> {
        Self::load_with_options(None, false)
    }

    /// Load configuration with custom options.
    ///
    /// # Arguments
    /// * `custom_path` - Optional custom path to config file (overrides defaults)
    /// * `skip_rc` - If true, skip loading config files (return default config)
    ///
    /// A config file that exists but doesn't parse is an error; a missing one
    /// is skipped.
    pub fn load_with_options(custom_path: Option<&str>, skip_rc: bool) -> Result<Self> {
        if skip_rc {
            return Ok(Self::default());
        }

        if let Some(path) = custom_path {
            return Self::load_from(path);
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load_from(local);
        }

        if let Some(config_dir) = Self::user_config_dir() {
            let config_path = config_dir.join("config.toml");
            if config_path.is_file() {
                return Self::load_from(&config_path);
            }
        }

        Ok(Self::default())
    }

    fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        crate::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn user_config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join("simdstr"));
        }

        dirs::home_dir().map(|home| home.join(".config").join("simdstr"))
    }
}
