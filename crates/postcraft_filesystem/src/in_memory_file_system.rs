use std::collections::HashMap;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::FileSystem;

#[cfg(not(target_os = "windows"))]
fn root_dir() -> PathBuf {
  PathBuf::from("/")
}

#[cfg(target_os = "windows")]
fn root_dir() -> PathBuf {
  PathBuf::from("C:/")
}

#[derive(Debug)]
enum InMemoryFileSystemEntry {
  File { contents: String },
  Directory,
}

/// In memory implementation of the `FileSystem` trait, for testing purposes.
#[derive(Debug)]
pub struct InMemoryFileSystem {
  files: RwLock<HashMap<PathBuf, InMemoryFileSystemEntry>>,
  current_working_directory: RwLock<PathBuf>,
}

impl Default for InMemoryFileSystem {
  fn default() -> Self {
    Self {
      files: Default::default(),
      current_working_directory: RwLock::new(root_dir()),
    }
  }
}

impl InMemoryFileSystem {
  /// Change the current working directory. Used for resolving relative paths.
  pub fn set_current_working_directory(&self, cwd: &Path) {
    let cwd = self.normalize(cwd);
    *self.current_working_directory.write() = cwd;
  }

  /// Adds a file, registering every ancestor as a directory.
  pub fn write_file(&self, path: &Path, contents: impl Into<String>) {
    let path = self.normalize(path);
    let mut files = self.files.write();

    let mut dir = path.parent();
    while let Some(parent) = dir {
      files.insert(parent.to_path_buf(), InMemoryFileSystemEntry::Directory);
      dir = parent.parent();
    }

    files.insert(
      path,
      InMemoryFileSystemEntry::File {
        contents: contents.into(),
      },
    );
  }

  fn normalize(&self, path: &Path) -> PathBuf {
    let cwd = self.current_working_directory.read();
    let mut result: Vec<Component<'_>> = if path.is_absolute() {
      vec![]
    } else {
      cwd.components().collect()
    };

    for component in path.components() {
      match component {
        Component::Prefix(prefix) => result = vec![Component::Prefix(prefix)],
        Component::RootDir => result.push(Component::RootDir),
        Component::CurDir => {}
        Component::ParentDir => {
          result.pop();
        }
        Component::Normal(segment) => result.push(Component::Normal(segment)),
      }
    }

    PathBuf::from_iter(result)
  }
}

impl FileSystem for InMemoryFileSystem {
  fn cwd(&self) -> io::Result<PathBuf> {
    Ok(self.current_working_directory.read().clone())
  }

  fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
    let path = self.normalize(path);
    if self.files.read().contains_key(&path) {
      Ok(path)
    } else {
      Err(io::Error::new(io::ErrorKind::NotFound, "File not found"))
    }
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let path = self.normalize(path);
    match self.files.read().get(&path) {
      None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
      Some(InMemoryFileSystemEntry::File { contents }) => Ok(contents.clone()),
      Some(InMemoryFileSystemEntry::Directory) => Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "Path is a directory",
      )),
    }
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    self.write_file(path, contents);
    Ok(())
  }

  fn is_file(&self, path: &Path) -> bool {
    let path = self.normalize(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::File { .. })
    )
  }

  fn is_dir(&self, path: &Path) -> bool {
    let path = self.normalize(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::Directory)
    )
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn should_read_written_files() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/styles/card.css"), "a {}");

    assert_eq!(
      fs.read_to_string(Path::new("/styles/card.css")).unwrap(),
      "a {}"
    );
    assert!(fs.is_file(Path::new("/styles/card.css")));
    assert!(fs.is_dir(Path::new("/styles")));
  }

  #[test]
  fn should_resolve_relative_paths_against_cwd() {
    let fs = InMemoryFileSystem::default();
    fs.set_current_working_directory(Path::new("/project/src"));
    fs.write_file(Path::new("../theme.css"), ":root {}");

    assert!(fs.is_file(Path::new("/project/theme.css")));
    assert_eq!(
      fs.canonicalize(Path::new("./../theme.css")).unwrap(),
      PathBuf::from("/project/theme.css")
    );
  }

  #[test]
  fn should_fail_reading_missing_files_and_directories() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/a/b.css"), "");

    assert_eq!(
      fs.read_to_string(Path::new("/missing.css")).unwrap_err().kind(),
      io::ErrorKind::NotFound
    );
    assert_eq!(
      fs.read_to_string(Path::new("/a")).unwrap_err().kind(),
      io::ErrorKind::InvalidInput
    );
  }
}
