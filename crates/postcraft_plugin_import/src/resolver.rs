use std::path::{Path, PathBuf};

use postcraft_filesystem::FileSystemRef;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
  style: Option<String>,
}

/// Finds the file an `@import` url points at.
///
/// Lookup order: the importing file's directory, every configured path, then
/// `node_modules` folders from the importing directory upwards (bare
/// specifiers only). Each base tries `url`, `url.css`, the `style` entry of a
/// package and `url/index.css`.
#[derive(Debug)]
pub struct ImportResolver {
  fs: FileSystemRef,
  paths: Vec<PathBuf>,
}

impl ImportResolver {
  pub fn new(fs: FileSystemRef, paths: Vec<PathBuf>) -> Self {
    Self { fs, paths }
  }

  pub fn resolve(&self, url: &str, from_dir: &Path) -> Option<PathBuf> {
    let url = url.split(|ch: char| ch == '?' || ch == '#').next().unwrap_or(url);
    if url.is_empty() {
      return None;
    }

    if Path::new(url).is_absolute() {
      return self.resolve_in(Path::new("/"), url.trim_start_matches('/'));
    }

    if let Some(found) = self.resolve_in(from_dir, url) {
      return Some(found);
    }

    let cwd = self.fs.cwd().ok();
    for path in &self.paths {
      let base = match &cwd {
        Some(cwd) if path.is_relative() => cwd.join(path),
        _ => path.clone(),
      };
      if let Some(found) = self.resolve_in(&base, url) {
        return Some(found);
      }
    }

    if url.starts_with('.') {
      return None;
    }

    from_dir
      .ancestors()
      .map(|dir| dir.join("node_modules"))
      .filter(|dir| self.fs.is_dir(dir))
      .find_map(|dir| self.resolve_in(&dir, url))
  }

  fn resolve_in(&self, base: &Path, url: &str) -> Option<PathBuf> {
    let target = base.join(url);

    let mut candidates = vec![target.clone(), PathBuf::from(format!("{}.css", target.display()))];
    if self.fs.is_dir(&target) {
      if let Some(style) = self.package_style(&target) {
        candidates.push(target.join(style));
      }
      candidates.push(target.join("index.css"));
    }

    candidates
      .into_iter()
      .find(|candidate| self.fs.is_file(candidate))
      .map(|found| self.fs.canonicalize(&found).unwrap_or(found))
  }

  fn package_style(&self, dir: &Path) -> Option<String> {
    let contents = self.fs.read_to_string(&dir.join("package.json")).ok()?;
    match serde_json::from_str::<PackageJson>(&contents) {
      Ok(package) => package.style,
      Err(error) => {
        tracing::debug!(dir = %dir.display(), %error, "Ignoring invalid package.json");
        None
      }
    }
  }
}
