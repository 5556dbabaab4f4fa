use postcraft_ast::Root;
use postcraft_core::{ProcessResult, Stage};

use crate::StripDirectiveOptions;

/// Whether `id` names a file of the dialect identified by `extension`.
///
/// Matches plain paths (`card.less`) and virtual module ids whose path part
/// carries the extension (`card.less?vue&type=style`). A query such as
/// `Card.vue?vue&type=style&lang=less` does not match.
pub fn is_secondary_dialect(id: &str, extension: &str) -> bool {
  if id.is_empty() || extension.is_empty() {
    return false;
  }

  id.ends_with(extension) || id.contains(&format!("{extension}?"))
}

/// Removes every `@apply` (or the configured directive) from files of the
/// secondary dialect so the utilities stage never sees them.
#[derive(Debug, Default)]
pub struct SelectiveDirectiveStripper {
  options: StripDirectiveOptions,
}

impl SelectiveDirectiveStripper {
  pub fn new(options: StripDirectiveOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &StripDirectiveOptions {
    &self.options
  }

  /// Strips the directive from `root` when `id` belongs to the dialect and
  /// returns the number of removed at-rules.
  pub fn strip(&self, root: &mut Root, id: &str) -> usize {
    if !is_secondary_dialect(id, &self.options.extension) {
      return 0;
    }

    root.remove_at_rules(&self.options.directive)
  }
}

impl Stage for SelectiveDirectiveStripper {
  fn name(&self) -> &'static str {
    "strip-directive"
  }

  #[tracing::instrument(level = "debug", skip_all, fields(plugin = "strip-directive"))]
  fn run(&self, root: &mut Root, result: &mut ProcessResult) -> anyhow::Result<()> {
    let id = result.from();
    let removed = self.strip(root, id);

    if removed > 0 {
      tracing::debug!(
        id,
        removed,
        directive = %self.options.directive,
        "Removed directives"
      );
    }

    Ok(())
  }
}
