use std::path::{Path, PathBuf};

use pathdiff::diff_paths;
use postcraft_filesystem::search::find_ancestor_file;
use postcraft_filesystem::FileSystemRef;
use serde_json5::Location;

use crate::{Config, ConfigError};

/// Names searched for, closest directory first, then in this order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["postcraft.config.json", ".postcraftrc"];

#[derive(Debug, PartialEq, Eq)]
pub struct LoadedConfig {
  pub config: Config,
  /// File the config was read from, `None` when the defaults are used
  pub path: Option<PathBuf>,
}

/// Locates and parses the postcraft config file
pub struct ConfigLoader {
  fs: FileSystemRef,
}

impl ConfigLoader {
  pub fn new(fs: FileSystemRef) -> Self {
    ConfigLoader { fs }
  }

  /// Loads `explicit` when given, otherwise the closest config file above the
  /// working directory. Without either the defaults are returned.
  pub fn load(&self, explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let cwd = self.fs.cwd().map_err(|source| ConfigError::Read {
      path: PathBuf::from("."),
      source,
    })?;

    let path = match explicit {
      Some(path) => Some(cwd.join(path)),
      None => find_ancestor_file(&*self.fs, &CONFIG_FILE_NAMES, &cwd, None),
    };

    let Some(path) = path else {
      tracing::debug!(cwd = %cwd.display(), "No config file found, using defaults");
      return Ok(LoadedConfig {
        config: Config::default(),
        path: None,
      });
    };

    let config = self.load_file(&path)?;
    tracing::debug!(
      path = %diff_paths(&path, &cwd).unwrap_or_else(|| path.clone()).display(),
      plugins = ?config.plugins,
      "Loaded config"
    );

    Ok(LoadedConfig {
      config,
      path: Some(path),
    })
  }

  fn load_file(&self, path: &Path) -> Result<Config, ConfigError> {
    let raw = self
      .fs
      .read_to_string(path)
      .map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
      })?;

    serde_json5::from_str(&raw).map_err(|error| parse_error(error, path))
  }
}

fn parse_error(error: serde_json5::Error, path: &Path) -> ConfigError {
  match error {
    serde_json5::Error::Message { msg, location } => {
      let location = location.unwrap_or(Location { line: 1, column: 1 });

      ConfigError::Parse {
        path: path.to_path_buf(),
        line: location.line,
        column: location.column,
        message: msg,
      }
    }
  }
}
