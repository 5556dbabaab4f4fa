use std::fmt::Debug;

use postcraft_ast::Root;

use crate::result::ProcessResult;

/// A single step of the pipeline.
///
/// Stages receive the tree produced by the previous stage and mutate it in
/// place. They must not keep per-file state, the same instance is shared by
/// every file of a run.
#[cfg_attr(test, mockall::automock)]
pub trait Stage: Debug + Send + Sync {
  /// Stable name used in diagnostics and configuration
  fn name(&self) -> &'static str;

  fn run(&self, root: &mut Root, result: &mut ProcessResult) -> anyhow::Result<()>;
}
