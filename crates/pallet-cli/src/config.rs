//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only ever sees the
//! [`HostDefaults`] built from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--cache-dir`, `--no-color`, `--output-format`)
//! 2. Environment variables, e.g. `PALLET_CACHE__ROOT` or
//!    `PALLET_DEFAULTS__PACKAGE_PATTERNS="*.hpp,*.h"`
//! 3. Config file (`--config FILE`, else the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use pallet_core::application::{DEFAULT_PACKAGE_PATTERN, HostDefaults};
use pallet_core::domain::PatternSet;

use crate::cli::{GlobalArgs, OutputFormat};
use crate::error::{CliError, CliResult};

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "PALLET";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where export and package roots live.
    pub cache: CacheConfig,
    /// Host-wide recipe defaults.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Package patterns for recipes whose `[package]` section is absent.
    pub package_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig {
                root: Self::default_cache_root(),
            },
            defaults: Defaults {
                package_patterns: vec![DEFAULT_PACKAGE_PATTERN.into()],
            },
            output: OutputConfig {
                no_color: false,
                format: OutputFormat::Auto,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: built-in defaults, then the config file, then
    /// `PALLET_*` environment variables.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to encode built-in defaults")?;

        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::config_path()).required(false),
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("defaults.package_patterns")
            .try_parsing(true);

        Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Apply CLI flag overrides on top of the loaded configuration.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(dir) = &args.cache_dir {
            self.cache.root = dir.clone();
        }
        if args.no_color {
            self.output.no_color = true;
        }
        if let Some(format) = args.output_format {
            self.output.format = format;
        }
        self
    }

    /// Host defaults handed to the lifecycle controller.
    pub fn host_defaults(&self) -> CliResult<HostDefaults> {
        let package_patterns =
            PatternSet::parse(&self.defaults.package_patterns).map_err(|e| {
                CliError::ConfigError {
                    message: format!("defaults.package_patterns: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;
        Ok(HostDefaults { package_patterns })
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.pallet.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "pallet", "pallet")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".pallet.toml"))
    }

    /// Platform cache directory, falling back to `.pallet/cache`.
    fn default_cache_root() -> PathBuf {
        directories::ProjectDirs::from("dev", "pallet", "pallet")
            .map(|d| d.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".pallet/cache"))
    }
}
