// Configuration loading and parsing (lineup.toml).

use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::formation::{Formation, UnknownFormationPolicy};

pub const CONFIG_FILE: &str = "lineup.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// lineup.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub lineup: LineupConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnUnknownFormation {
    Reject,
    Fallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineupConfig {
    /// Formation code the roster starts in, e.g. "4-3-3".
    pub formation: String,
    pub on_unknown_formation: OnUnknownFormation,
    /// Used when `on_unknown_formation = "fallback"`.
    #[serde(default = "default_fallback")]
    pub fallback_formation: String,
}

fn default_fallback() -> String {
    Formation::DEFAULT.code().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Squad sheet (CSV), relative to the working directory.
    pub squads: String,
    pub league: String,
    pub team: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "lineup=info,lineup_core=info,warn".into(),
            file: "logs/lineup.log".into(),
        }
    }
}

impl Config {
    /// The policy applied to formation codes that are not supported.
    pub fn formation_policy(&self) -> UnknownFormationPolicy {
        match self.lineup.on_unknown_formation {
            OnUnknownFormation::Reject => UnknownFormationPolicy::Reject,
            OnUnknownFormation::Fallback => UnknownFormationPolicy::Fallback(
                self.lineup
                    .fallback_formation
                    .parse()
                    .unwrap_or(Formation::DEFAULT),
            ),
        }
    }

    /// The configured starting formation, resolved through the policy.
    pub fn formation(&self) -> Option<Formation> {
        self.formation_policy().resolve(&self.lineup.formation).ok()
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/lineup.toml` relative to
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join("config").join(CONFIG_FILE))
}

/// Load and validate a single config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` on first run, as (name under `defaults/`,
/// destination relative to the base directory).
pub const SEED_FILES: &[(&str, &str)] = &[
    (CONFIG_FILE, "config/lineup.toml"),
    ("squads.csv", "data/squads.csv"),
];

/// Seed the working copies of the config and the squad sheet from
/// `defaults/`. Existing files are left alone so user edits survive; a seed
/// missing from `defaults/` is skipped. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");

    if !defaults_dir.is_dir() {
        if !base_dir.join("config").is_dir() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    let mut seeded = Vec::new();
    for (name, dest) in SEED_FILES {
        let source = defaults_dir.join(name);
        let target = base_dir.join(dest);
        if !source.is_file() {
            debug!("no default for {}, skipping", target.display());
            continue;
        }
        if seed_file(&source, &target)? {
            info!("seeded {} from {}", target.display(), source.display());
            seeded.push(target);
        }
    }

    Ok(seeded)
}

/// Copy `source` to `target` unless `target` already exists.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let copy_err = |what: &str, path: &Path, e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to {what} {}: {e}", path.display()),
    };

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| copy_err("create", dir, e))?;
    }
    // create_new so an existing user file is never overwritten
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_err("create", target, e)),
    };
    let content = std::fs::read(source).map_err(|e| copy_err("read", source, e))?;
    dest.write_all(&content)
        .map_err(|e| copy_err("write", target, e))?;
    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working directory,
/// copying defaults first. When the working directory has neither `config/`
/// nor `defaults/`, falls back to the per-user config directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("defaults").exists() || cwd.join("config").exists() {
        ensure_config_files(&cwd)?;
        return load_config_from(&cwd);
    }
    match user_config_file() {
        Some(path) => load_config_file(&path),
        None => Err(ConfigError::FileNotFound {
            path: cwd.join("config").join(CONFIG_FILE),
        }),
    }
}

/// `lineup.toml` in the platform config directory
/// (e.g. `~/.config/lineup/lineup.toml` on Linux).
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lineup").map(|d| d.config_dir().join(CONFIG_FILE))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.lineup.fallback_formation.parse::<Formation>().is_err() {
        return Err(ConfigError::ValidationError {
            field: "lineup.fallback_formation".into(),
            message: format!(
                "unsupported formation `{}`",
                config.lineup.fallback_formation
            ),
        });
    }

    if let Err(e) = config.formation_policy().resolve(&config.lineup.formation) {
        return Err(ConfigError::ValidationError {
            field: "lineup.formation".into(),
            message: e.to_string(),
        });
    }

    let data_fields: &[(&str, &str)] = &[
        ("data.squads", config.data.squads.as_str()),
        ("data.league", config.data.league.as_str()),
        ("data.team", config.data.team.as_str()),
    ];
    for (name, val) in data_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.logging.file.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.file".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
