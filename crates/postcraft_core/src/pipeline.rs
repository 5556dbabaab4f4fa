use std::sync::Arc;

use postcraft_ast::{parse, stringify, CssSyntaxError, Root};

use crate::minify::minify_css;
use crate::result::{Message, ProcessOptions, ProcessResult};
use crate::stage::Stage;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  #[error(transparent)]
  Syntax(#[from] CssSyntaxError),
  #[error("[{stage}] {source}")]
  Stage {
    stage: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
  #[error("Failed to minify {file}: {message}")]
  Minify { file: String, message: String },
}

/// Everything produced by one [`Pipeline::process`] call.
#[derive(Debug)]
pub struct ProcessOutput {
  pub css: String,
  pub root: Root,
  pub messages: Vec<Message>,
}

/// An ordered list of stages applied to every stylesheet.
///
/// The order is fixed at construction; stage `n + 1` always observes the tree
/// left behind by stage `n`.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
  stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
    self.push(Arc::new(stage));
    self
  }

  pub fn push(&mut self, stage: Arc<dyn Stage>) {
    self.stages.push(stage);
  }

  pub fn stage_names(&self) -> Vec<&'static str> {
    self.stages.iter().map(|stage| stage.name()).collect()
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  /// Parses `css`, runs every stage in order and serializes the result.
  #[tracing::instrument(level = "debug", skip_all, fields(from = options.from.as_deref().unwrap_or_default()))]
  pub fn process(&self, css: &str, options: ProcessOptions) -> Result<ProcessOutput, PipelineError> {
    let options = Arc::new(options);
    let mut root = parse(css, options.from.as_deref())?;
    let mut result = ProcessResult::new(options.clone());

    self.run(&mut root, &mut result)?;

    let mut css = stringify(&root);
    if options.minify {
      let file = result.from().to_string();
      css = minify_css(&css, &file).map_err(|message| PipelineError::Minify { file, message })?;
    }

    Ok(ProcessOutput {
      css,
      root,
      messages: result.messages,
    })
  }

  /// Runs the stages over an already parsed tree. The first failing stage
  /// stops the run.
  pub fn run(&self, root: &mut Root, result: &mut ProcessResult) -> Result<(), PipelineError> {
    for stage in &self.stages {
      let name = stage.name();
      let _span = tracing::debug_span!("stage", name).entered();

      stage
        .run(root, result)
        .map_err(|error| PipelineError::Stage {
          stage: name,
          source: error.into(),
        })?;

      tracing::trace!(nodes = root.node_count(), "Stage finished");
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use mockall::Sequence;
  use postcraft_ast::{decl, rule};
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::stage::MockStage;

  fn named_stage(name: &'static str) -> MockStage {
    let mut stage = MockStage::new();
    stage.expect_name().return_const(name);
    stage
  }

  #[test]
  fn runs_stages_in_order_on_the_same_tree() {
    let mut sequence = Sequence::new();

    let mut first = named_stage("first");
    first
      .expect_run()
      .times(1)
      .in_sequence(&mut sequence)
      .returning(|root, _| {
        root.append(rule(".a").append(decl("color", "red")));
        Ok(())
      });

    let mut second = named_stage("second");
    second
      .expect_run()
      .times(1)
      .in_sequence(&mut sequence)
      .returning(|root, _| {
        assert_eq!(root.nodes.len(), 1);
        root.append(rule(".b"));
        Ok(())
      });

    let pipeline = Pipeline::new().with_stage(first).with_stage(second);
    let output = pipeline.process("", ProcessOptions::new()).unwrap();

    assert_eq!(pipeline.stage_names(), vec!["first", "second"]);
    assert_eq!(
      output.css,
      indoc! {"
        .a {
          color: red;
        }
        .b {}
      "}
    );
  }

  #[test]
  fn stops_at_the_first_failing_stage() {
    let mut failing = named_stage("failing");
    failing
      .expect_run()
      .returning(|_, _| Err(anyhow::anyhow!("boom")));

    let mut never = named_stage("never");
    never.expect_run().never();

    let pipeline = Pipeline::new().with_stage(failing).with_stage(never);
    let error = pipeline
      .process(".a {}", ProcessOptions::new().from_path("a.css"))
      .unwrap_err();

    assert_eq!(error.to_string(), "[failing] boom");
  }

  #[test]
  fn stages_see_the_source_identifier() {
    let mut stage = named_stage("inspect");
    stage.expect_run().returning(|_, result| {
      assert_eq!(result.from(), "src/card.less?vue&type=style");
      result.warn("inspect", "seen");
      Ok(())
    });

    let output = Pipeline::new()
      .with_stage(stage)
      .process(
        ".a {}",
        ProcessOptions::new().from_path("src/card.less?vue&type=style"),
      )
      .unwrap();

    assert_eq!(
      output.messages,
      vec![Message::Warning {
        plugin: "inspect".into(),
        text: "seen".into(),
      }]
    );
  }

  #[test]
  fn syntax_errors_are_reported_before_any_stage_runs() {
    let mut stage = named_stage("never");
    stage.expect_run().never();

    let error = Pipeline::new()
      .with_stage(stage)
      .process(".a {", ProcessOptions::new().from_path("a.css"))
      .unwrap_err();

    assert!(matches!(error, PipelineError::Syntax(_)));
  }

  #[test]
  fn empty_pipeline_normalizes_formatting() {
    let output = Pipeline::new()
      .process(".a{color:red}", ProcessOptions::new())
      .unwrap();

    assert_eq!(output.css, ".a {\n  color: red;\n}\n");
  }

  #[test]
  fn minifies_when_requested() {
    let output = Pipeline::new()
      .process(".a { color: red; }", ProcessOptions::new().minify(true))
      .unwrap();

    assert_eq!(output.css, ".a{color:red}");
  }
}
