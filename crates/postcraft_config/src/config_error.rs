use std::path::PathBuf;

use postcraft_plugin_autoprefixer::AutoprefixerError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read {}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse {}:{line}:{column}: {message}", path.display())]
  Parse {
    path: PathBuf,
    line: usize,
    column: usize,
    message: String,
  },
  #[error("Unknown plugin '{0}'")]
  UnknownPlugin(String),
  #[error("Plugin '{0}' is listed more than once")]
  DuplicatePlugin(String),
  #[error(transparent)]
  Browserslist(#[from] AutoprefixerError),
}
