use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use postcraft_ast::{parse, AtRule, CssSyntaxError, Node, Root};
use postcraft_core::{ProcessResult, Stage};
use postcraft_filesystem::FileSystemRef;
use serde::Deserialize;

use crate::import_statement::ImportStatement;
use crate::resolver::ImportResolver;

const PLUGIN: &str = "import";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
  /// Extra directories searched for imports, relative to the working directory
  pub paths: Vec<PathBuf>,
  /// Inline a file only the first time it is imported
  pub skip_duplicates: bool,
}

impl Default for ImportOptions {
  fn default() -> Self {
    Self {
      paths: Vec::new(),
      skip_duplicates: true,
    }
  }
}

/// Replaces local `@import` statements with the contents of the imported file.
#[derive(Debug)]
pub struct ImportStage {
  fs: FileSystemRef,
  resolver: ImportResolver,
  skip_duplicates: bool,
}

/// Per-file bookkeeping while imports are inlined.
#[derive(Default)]
struct ImportState {
  inlined: HashSet<PathBuf>,
  stack: Vec<PathBuf>,
}

impl ImportStage {
  pub fn new(fs: FileSystemRef, options: ImportOptions) -> Self {
    Self {
      resolver: ImportResolver::new(fs.clone(), options.paths),
      fs,
      skip_duplicates: options.skip_duplicates,
    }
  }

  /// Absolute path of the file being processed, without any query string.
  fn importer_path(&self, id: &str) -> Option<PathBuf> {
    let path = id.split('?').next().unwrap_or_default();
    if path.is_empty() {
      return None;
    }

    let path = PathBuf::from(path);
    if path.is_absolute() {
      return Some(path);
    }

    self.fs.cwd().ok().map(|cwd| cwd.join(path))
  }

  fn inline(
    &self,
    nodes: Vec<Node>,
    importer: Option<&Path>,
    state: &mut ImportState,
    result: &mut ProcessResult,
  ) -> anyhow::Result<Vec<Node>> {
    let from_dir = match importer.and_then(Path::parent) {
      Some(dir) => dir.to_path_buf(),
      None => self.fs.cwd()?,
    };
    let file = importer.map(|importer| importer.display().to_string());

    let mut output = Vec::with_capacity(nodes.len());
    let mut allow_imports = true;

    for node in nodes {
      let at_rule = match node {
        Node::AtRule(at_rule) if is_import(&at_rule) => at_rule,
        Node::AtRule(at_rule) if is_preamble(&at_rule) => {
          output.push(at_rule.into());
          continue;
        }
        Node::Comment(comment) => {
          output.push(comment.into());
          continue;
        }
        other => {
          allow_imports = false;
          output.push(other);
          continue;
        }
      };

      if !allow_imports {
        result.warn(
          PLUGIN,
          format!(
            "@import {} must precede all other statements (besides @charset or empty @layer)",
            at_rule.params
          ),
        );
        output.push(at_rule.into());
        continue;
      }

      let Some(statement) = ImportStatement::parse(&at_rule.params) else {
        return Err(
          CssSyntaxError::new(
            format!("Unable to find uri in '@import {}'", at_rule.params),
            file.as_deref(),
            at_rule.source,
          )
          .into(),
        );
      };

      if statement.is_remote() {
        tracing::debug!(url = %statement.url, "Leaving remote import in place");
        output.push(at_rule.into());
        continue;
      }

      let Some(path) = self.resolver.resolve(&statement.url, &from_dir) else {
        return Err(
          CssSyntaxError::new(
            format!("Failed to find '{}'", statement.url),
            file.as_deref(),
            at_rule.source,
          )
          .into(),
        );
      };

      if state.stack.contains(&path) {
        tracing::debug!(path = %path.display(), "Skipping circular import");
        continue;
      }
      if self.skip_duplicates && state.inlined.contains(&path) {
        continue;
      }

      let imported = self.load(&path, state, result)?;
      output.extend(statement.wrap(imported));
    }

    Ok(output)
  }

  fn load(
    &self,
    path: &Path,
    state: &mut ImportState,
    result: &mut ProcessResult,
  ) -> anyhow::Result<Vec<Node>> {
    let contents = self
      .fs
      .read_to_string(path)
      .with_context(|| format!("Failed to read {}", path.display()))?;
    let file = path.display().to_string();
    let root = parse(&contents, Some(file.as_str()))?;

    state.inlined.insert(path.to_path_buf());
    state.stack.push(path.to_path_buf());
    let nodes = self.inline(root.nodes, Some(path), state, result);
    state.stack.pop();

    result.add_dependency(PLUGIN, path.to_path_buf());

    Ok(
      nodes?
        .into_iter()
        .filter(|node| !node.is_at_rule_named("charset"))
        .collect(),
    )
  }
}

fn is_import(at_rule: &AtRule) -> bool {
  at_rule.nodes.is_none() && at_rule.name.eq_ignore_ascii_case("import")
}

/// Statements allowed before `@import`.
fn is_preamble(at_rule: &AtRule) -> bool {
  at_rule.name.eq_ignore_ascii_case("charset")
    || (at_rule.nodes.is_none() && at_rule.name.eq_ignore_ascii_case("layer"))
}

impl Stage for ImportStage {
  fn name(&self) -> &'static str {
    PLUGIN
  }

  #[tracing::instrument(level = "debug", skip_all, fields(plugin = "import"))]
  fn run(&self, root: &mut Root, result: &mut ProcessResult) -> anyhow::Result<()> {
    let importer = self.importer_path(result.from());
    let mut state = ImportState::default();
    if let Some(importer) = &importer {
      state.stack.push(importer.clone());
    }

    let nodes = std::mem::take(&mut root.nodes);
    root.nodes = self.inline(nodes, importer.as_deref(), &mut state, result)?;

    tracing::debug!(inlined = state.inlined.len(), "Inlined imports");
    Ok(())
  }
}
