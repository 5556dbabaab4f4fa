use std::path::Path;
use std::path::PathBuf;

use crate::FileSystem;

/// Finds the closest file named one of `names`, starting at `from` and walking
/// up to `root` (inclusive). Without a `root` the walk stops at the file-system
/// root.
pub fn find_ancestor_file<P: AsRef<str>>(
  fs: &dyn FileSystem,
  names: &[P],
  from: &Path,
  root: Option<&Path>,
) -> Option<PathBuf> {
  for dir in from.ancestors() {
    for name in names {
      let candidate = dir.join(name.as_ref());
      if fs.is_file(&candidate) {
        return Some(candidate);
      }
    }

    if root.is_some_and(|root| dir == root) {
      break;
    }
  }

  None
}
