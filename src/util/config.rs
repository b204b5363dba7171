//! Configuration file support for covharness.
//!
//! Two configuration file locations are read:
//! - Global: `<config dir>/covharness/config.toml` - User-wide defaults
//! - Project: `.covharness/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! options take precedence over both.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::CoverMode;
use crate::ops::cover::CoverOptions;
use crate::ops::instrument::CommitMode;

/// covharness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrumentation settings
    pub cover: CoverConfig,

    /// Go toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Instrumentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Counter mode passed to `go tool cover` (set, count, atomic)
    pub mode: Option<CoverMode>,

    /// Prefix of the generated coverage variables (e.g. `GoCover`)
    pub var_prefix: Option<String>,

    /// Entry-point file of the entry package (e.g. `main.go`)
    pub entry_file: Option<String>,

    /// Path segment marking vendored packages (e.g. `/vendor/`)
    pub vendor_segment: Option<String>,

    /// Stage all rewrites and commit them only after every file succeeded
    #[serde(default)]
    pub transactional: bool,
}

/// Go toolchain settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the `go` binary (e.g. /usr/local/go/bin/go)
    pub go: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(ref prefix) = config.cover.var_prefix {
            validate_var_prefix(prefix)
                .with_context(|| format!("invalid config file: {}", path.display()))?;
        }
        Ok(config)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.cover.mode.is_some() {
            self.cover.mode = other.cover.mode;
        }
        if other.cover.var_prefix.is_some() {
            self.cover.var_prefix = other.cover.var_prefix;
        }
        if other.cover.entry_file.is_some() {
            self.cover.entry_file = other.cover.entry_file;
        }
        if other.cover.vendor_segment.is_some() {
            self.cover.vendor_segment = other.cover.vendor_segment;
        }
        if other.cover.transactional {
            self.cover.transactional = true;
        }

        if other.toolchain.go.is_some() {
            self.toolchain.go = other.toolchain.go;
        }
    }

    /// Pipeline options with every unset value at its default.
    pub fn cover_options(&self) -> CoverOptions {
        let mut opts = CoverOptions::default();
        if let Some(mode) = self.cover.mode {
            opts.mode = mode;
        }
        if let Some(ref prefix) = self.cover.var_prefix {
            opts.var_prefix = prefix.clone();
        }
        if let Some(ref entry_file) = self.cover.entry_file {
            opts.entry_file = entry_file.clone();
        }
        if let Some(ref segment) = self.cover.vendor_segment {
            opts.vendor_segment = segment.clone();
        }
        if self.cover.transactional {
            opts.commit = CommitMode::Staged;
        }
        opts
    }
}

/// Exported Go identifier.
static VAR_PREFIX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$"));

/// Check that generated identifiers `<prefix><N>` are exported Go names.
pub fn validate_var_prefix(prefix: &str) -> Result<()> {
    let pattern = VAR_PREFIX.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?;
    if !pattern.is_match(prefix) {
        bail!(
            "`{}` is not a valid coverage variable prefix (expected an exported Go identifier such as `GoCover`)",
            prefix
        );
    }
    Ok(())
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.covharness/config.toml)
/// 2. Global config (<config dir>/covharness/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
