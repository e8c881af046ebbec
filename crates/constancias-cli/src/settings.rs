//! Layered configuration: TOML file, then `CONSTANCIAS_*` environment
//! variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

const DEFAULT_DATABASE_PATH: &str = "constancias.db";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite file holding all records. A leading `~/` is expanded.
  pub database_path: PathBuf,
}

impl Settings {
  /// Read `config_path` (if it exists) and the environment, then apply the
  /// `--database` override.
  pub fn load(config_path: &Path, database: Option<&Path>) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .set_default("database_path", DEFAULT_DATABASE_PATH)?
      .add_source(config::File::from(config_path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("CONSTANCIAS"))
      .build()
      .with_context(|| format!("failed to read config file {}", config_path.display()))?;

    let mut settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;

    if let Some(path) = database {
      settings.database_path = path.to_path_buf();
    }
    settings.database_path = expand_tilde(&settings.database_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
