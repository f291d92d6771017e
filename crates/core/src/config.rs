//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::{ledger::SeatLedger, reference::ReferenceGenerator};

/// Directory under `~/.config` holding the configuration file.
pub const CONFIG_DIR: &str = "seatbook";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `SEATBOOK_LOG_FILTER=debug`.
pub const ENV_PREFIX: &str = "SEATBOOK";

const DEFAULT_CONFIG: &str = r#"# Seatbook configuration

# Directory receiving seatbook.log, relative to the working directory.
log_dir = "logs"

# tracing filter directive; RUST_LOG takes precedence when set.
log_filter = "info"

# Fix the booking reference sequence, e.g. for demos.
# reference_seed = 42
"#;

/// Runtime settings for the shell and ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory receiving the log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Default `tracing` filter directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Optional seed for booking references.
    #[serde(default)]
    pub reference_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_filter: default_log_filter(),
            reference_seed: None,
        }
    }
}

impl AppConfig {
    /// Default config file location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific file plus environment overrides.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Build a fresh ledger, honouring `reference_seed` when present.
    pub fn build_ledger(&self) -> SeatLedger {
        let references = match self.reference_seed {
            Some(seed) => ReferenceGenerator::seeded(seed),
            None => ReferenceGenerator::from_entropy(),
        };
        SeatLedger::with_references(references)
    }
}

/// Write the default config file if none exists and return its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::default_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write the default config file to `path` unless it already exists.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default config to {}", path.display());
    Ok(())
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::{const_mutex, Mutex};
    use tempfile::tempdir;

    // Environment overrides are process-wide; every test here reads them.
    static ENV_LOCK: Mutex<()> = const_mutex(());

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let _env = ENV_LOCK.lock();
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);

        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.reference_seed, None);
        Ok(())
    }

    #[test]
    fn existing_file_is_not_overwritten() -> Result<()> {
        let _env = ENV_LOCK.lock();
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "reference_seed = 7\n")?;

        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "reference_seed = 7\n");
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let _env = ENV_LOCK.lock();
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.log_dir, AppConfig::default().log_dir);
        assert_eq!(config.reference_seed, None);
        Ok(())
    }

    #[test]
    fn seeded_config_builds_reproducible_ledgers() -> Result<()> {
        let _env = ENV_LOCK.lock();
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "log_dir = \"/tmp/seatbook\"\nreference_seed = 42\n")?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.log_dir, PathBuf::from("/tmp/seatbook"));
        assert_eq!(config.reference_seed, Some(42));

        let mut left = config.build_ledger();
        let mut right = config.build_ledger();
        let passenger = crate::models::Passenger::new("P1", "Ann", "Lee");
        assert_eq!(
            left.book_seat("1A", passenger.clone())?,
            right.book_seat("1A", passenger)?
        );
        Ok(())
    }

    #[test]
    fn environment_overrides_file_and_defaults() -> Result<()> {
        let _env = ENV_LOCK.lock();
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "log_filter = \"warn\"\nreference_seed = 7\n")?;

        std::env::set_var("SEATBOOK_LOG_FILTER", "debug");
        std::env::set_var("SEATBOOK_REFERENCE_SEED", "42");
        let from_missing = AppConfig::load_from(dir.path().join("absent.toml"));
        let from_file = AppConfig::load_from(&path);
        std::env::remove_var("SEATBOOK_LOG_FILTER");
        std::env::remove_var("SEATBOOK_REFERENCE_SEED");

        let config = from_missing?;
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.reference_seed, Some(42));

        let config = from_file?;
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.reference_seed, Some(42));

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.reference_seed, Some(7));
        Ok(())
    }
}
