use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

/// In-memory file-system for testing
pub mod in_memory_file_system;

/// File-system implementation using std::fs
pub mod os_file_system;

pub mod search;

/// FileSystem abstraction instance
///
/// This should be `OsFileSystem` for non-testing environments and `InMemoryFileSystem` for testing.
pub type FileSystemRef = Arc<dyn FileSystem + Send + Sync>;

/// Trait abstracting the file-system operations needed to resolve imports and
/// locate configuration files.
#[mockall::automock]
pub trait FileSystem: std::fmt::Debug {
  fn cwd(&self) -> std::io::Result<PathBuf>;

  /// Absolute form of `path` with `.` and `..` segments resolved.
  fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf>;

  fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

  fn write(&self, _path: &Path, _contents: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
      std::io::ErrorKind::Unsupported,
      "Not implemented: FileSystem::write",
    ))
  }

  fn is_file(&self, path: &Path) -> bool;
  fn is_dir(&self, path: &Path) -> bool;
}
