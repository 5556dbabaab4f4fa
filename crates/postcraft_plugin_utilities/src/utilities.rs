use std::sync::Arc;

use indexmap::IndexMap;
use postcraft_ast::{list, AtRule, CssSyntaxError, Declaration, Node, Root};
use postcraft_core::{ProcessResult, Stage};
use serde::Deserialize;

use crate::utility_lookup::{UtilityLookup, UtilityRegistry};

const PLUGIN: &str = "utilities";
const APPLY: &str = "apply";
const LAYERS: &[&str] = &["base", "components", "utilities"];

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UtilitiesOptions {
  /// Extra classes, `class -> { property: value }`
  pub classes: IndexMap<String, IndexMap<String, String>>,
}

/// Expands `@apply` into the declarations of the listed classes.
#[derive(Debug)]
pub struct UtilitiesStage {
  lookup: Arc<dyn UtilityLookup>,
}

impl Default for UtilitiesStage {
  fn default() -> Self {
    Self::new(Arc::new(UtilityRegistry::new()))
  }
}

/// Classes defined by the stylesheet being processed.
type LocalClasses = IndexMap<String, Vec<Node>>;

struct ApplyContext<'a> {
  file: &'a str,
  local: &'a LocalClasses,
  stack: Vec<String>,
}

impl ApplyContext<'_> {
  fn error(&self, reason: impl Into<String>, at_rule: &AtRule) -> CssSyntaxError {
    CssSyntaxError::new(reason, Some(self.file), at_rule.source)
  }
}

impl UtilitiesStage {
  pub fn new(lookup: Arc<dyn UtilityLookup>) -> Self {
    Self { lookup }
  }

  pub fn from_options(options: &UtilitiesOptions) -> Self {
    Self::new(Arc::new(UtilityRegistry::from_classes(&options.classes)))
  }

  /// Replaces each `@apply` child of `nodes`. `in_rule` is false for the root
  /// and at-rule blocks, where declarations cannot live.
  fn expand(
    &self,
    nodes: &mut Vec<Node>,
    in_rule: bool,
    ctx: &mut ApplyContext<'_>,
  ) -> Result<usize, CssSyntaxError> {
    let mut expanded = 0;
    let mut output = Vec::with_capacity(nodes.len());

    for node in std::mem::take(nodes) {
      match node {
        Node::AtRule(at_rule) if at_rule.name == APPLY => {
          if !in_rule {
            return Err(ctx.error("`@apply` must be used inside a rule", &at_rule));
          }

          let declarations = self.resolve_params(&at_rule, ctx)?;
          output.extend(
            declarations
              .into_iter()
              .map(|decl| Node::from(decl.with_source(at_rule.source))),
          );
          expanded += 1;
        }
        Node::Rule(mut rule) => {
          expanded += self.expand(&mut rule.nodes, true, ctx)?;
          output.push(rule.into());
        }
        Node::AtRule(mut at_rule) => {
          if let Some(children) = at_rule.nodes.as_mut() {
            expanded += self.expand(children, false, ctx)?;
          }
          output.push(at_rule.into());
        }
        other => output.push(other),
      }
    }

    *nodes = output;
    Ok(expanded)
  }

  /// `@apply a !b c !important`
  fn resolve_params(
    &self,
    at_rule: &AtRule,
    ctx: &mut ApplyContext<'_>,
  ) -> Result<Vec<Declaration>, CssSyntaxError> {
    let mut classes = list::space(&at_rule.params);
    let important_all = classes.last().is_some_and(|last| last == "!important");
    if important_all {
      classes.pop();
    }

    let mut declarations = Vec::new();
    for class in classes {
      let (class, important) = match class.strip_prefix('!') {
        Some(class) => (class.to_string(), true),
        None => (class, important_all),
      };

      if is_variant(&class) {
        return Err(ctx.error(
          format!("The `{class}` class uses a variant, variants are not supported in `@apply`."),
          at_rule,
        ));
      }

      for decl in self.resolve_class(&class, at_rule, ctx)? {
        let marked = decl.important || important;
        declarations.push(decl.important(marked));
      }
    }

    Ok(declarations)
  }

  fn resolve_class(
    &self,
    class: &str,
    at_rule: &AtRule,
    ctx: &mut ApplyContext<'_>,
  ) -> Result<Vec<Declaration>, CssSyntaxError> {
    let local = ctx.local;
    let Some(children) = local.get(class) else {
      return self
        .lookup
        .lookup(class)
        .ok_or_else(|| ctx.error(format!("The `{class}` class does not exist."), at_rule));
    };

    if ctx.stack.iter().any(|seen| seen == class) {
      return Err(ctx.error(
        format!("You cannot `@apply` the `{class}` utility here because it creates a circular dependency."),
        at_rule,
      ));
    }

    ctx.stack.push(class.to_string());
    let mut declarations = Vec::new();
    for child in children {
      match child {
        Node::Declaration(decl) => declarations.push(decl.clone()),
        Node::AtRule(inner) if inner.name == APPLY => {
          declarations.extend(self.resolve_params(inner, ctx)?);
        }
        _ => {}
      }
    }
    ctx.stack.pop();

    Ok(declarations)
  }
}

/// Name of the class a rule defines when its selector is a single plain class.
fn single_class(selector: &str) -> Option<&str> {
  let class = selector.trim().strip_prefix('.')?;
  let valid = !class.is_empty()
    && class
      .chars()
      .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
  valid.then_some(class)
}

/// `hover:text-lg`, `md:flex`. Escaped colons belong to the class name.
fn is_variant(class: &str) -> bool {
  let mut escaped = false;
  for ch in class.chars() {
    match ch {
      _ if escaped => escaped = false,
      '\\' => escaped = true,
      ':' => return true,
      _ => {}
    }
  }
  false
}

fn is_utility_layer(at_rule: &AtRule) -> bool {
  at_rule.name == "layer" && at_rule.nodes.is_some() && LAYERS.contains(&at_rule.params.trim())
}

fn collect_local_classes(nodes: &[Node], local: &mut LocalClasses) {
  for node in nodes {
    match node {
      Node::Rule(rule) => {
        if let Some(class) = single_class(&rule.selector) {
          local
            .entry(class.to_string())
            .or_default()
            .extend(rule.nodes.iter().cloned());
        }
      }
      Node::AtRule(at_rule) if is_utility_layer(at_rule) => {
        if let Some(children) = &at_rule.nodes {
          collect_local_classes(children, local);
        }
      }
      _ => {}
    }
  }
}

/// Replaces `@layer base|components|utilities { ... }` with its contents.
fn unwrap_layers(nodes: Vec<Node>) -> Vec<Node> {
  let mut output = Vec::with_capacity(nodes.len());
  for node in nodes {
    match node {
      Node::AtRule(at_rule) if is_utility_layer(&at_rule) => {
        output.extend(unwrap_layers(at_rule.nodes.unwrap_or_default()));
      }
      other => output.push(other),
    }
  }
  output
}

impl Stage for UtilitiesStage {
  fn name(&self) -> &'static str {
    PLUGIN
  }

  #[tracing::instrument(level = "debug", skip_all, fields(plugin = "utilities"))]
  fn run(&self, root: &mut Root, result: &mut ProcessResult) -> anyhow::Result<()> {
    let mut directives = Vec::new();
    root.walk_at_rules("tailwind", |at_rule| directives.push(at_rule.params.clone()));
    for params in directives {
      result.warn(
        PLUGIN,
        format!("`@tailwind {params}` is not supported and was left in place"),
      );
    }

    let mut local = LocalClasses::new();
    collect_local_classes(&root.nodes, &mut local);

    let file = result.from().to_string();
    let mut ctx = ApplyContext {
      file: &file,
      local: &local,
      stack: Vec::new(),
    };

    let expanded = self.expand(&mut root.nodes, false, &mut ctx)?;
    root.nodes = unwrap_layers(std::mem::take(&mut root.nodes));

    tracing::debug!(expanded, local = local.len(), "Expanded @apply");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use postcraft_ast::{parse, stringify};
  use postcraft_core::{Message, ProcessOptions};
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::utility_lookup::MockUtilityLookup;

  fn run_stage(stage: &UtilitiesStage, css: &str) -> (anyhow::Result<String>, ProcessResult) {
    let mut root = parse(css, Some("card.css")).unwrap();
    let mut result = ProcessResult::new(Arc::new(ProcessOptions::new().from_path("card.css")));
    let output = stage.run(&mut root, &mut result).map(|_| stringify(&root));
    (output, result)
  }

  fn expand(css: &str) -> String {
    run_stage(&UtilitiesStage::default(), css).0.unwrap()
  }

  fn expand_err(css: &str) -> CssSyntaxError {
    let error = run_stage(&UtilitiesStage::default(), css).0.unwrap_err();
    error.downcast::<CssSyntaxError>().unwrap()
  }

  #[test]
  fn expands_apply_in_place() {
    assert_eq!(
      expand(".card { color: red; @apply flex items-center; margin: 0; }"),
      indoc! {"
        .card {
          color: red;
          display: flex;
          align-items: center;
          margin: 0;
        }
      "}
    );
  }

  #[test]
  fn marks_important_declarations() {
    assert_eq!(
      expand(".a { @apply hidden p-1 !important; } .b { @apply !block; }"),
      indoc! {"
        .a {
          display: none !important;
          padding: 0.25rem !important;
        }
        .b {
          display: block !important;
        }
      "}
    );
  }

  #[test]
  fn applies_classes_from_the_stylesheet_and_unwraps_layers() {
    assert_eq!(
      expand(indoc! {"
        @layer components {
          .btn { @apply px-4 rounded; }
        }
        .card-title { font-weight: 600; }
        .save { @apply btn card-title; }
      "}),
      indoc! {"
        .btn {
          padding-left: 1rem;
          padding-right: 1rem;
          border-radius: 0.25rem;
        }
        .card-title {
          font-weight: 600;
        }
        .save {
          padding-left: 1rem;
          padding-right: 1rem;
          border-radius: 0.25rem;
          font-weight: 600;
        }
      "}
    );
  }

  #[test]
  fn other_layers_are_kept() {
    assert_eq!(
      expand("@layer reset { .a { @apply block; } }"),
      "@layer reset {\n  .a {\n    display: block;\n  }\n}\n"
    );
  }

  #[test]
  fn unknown_class_is_an_error_with_position() {
    assert_eq!(
      expand_err(".card {\n  @apply flex bg-brand;\n}"),
      CssSyntaxError {
        reason: String::from("The `bg-brand` class does not exist."),
        file: Some(String::from("card.css")),
        line: 2,
        column: 3,
      }
    );
  }

  #[test]
  fn variants_are_rejected() {
    assert_eq!(
      expand_err(".a { @apply hover:flex; }").reason,
      "The `hover:flex` class uses a variant, variants are not supported in `@apply`."
    );
  }

  #[test]
  fn apply_outside_a_rule_is_rejected() {
    assert_eq!(
      expand_err("@apply flex;").reason,
      "`@apply` must be used inside a rule"
    );
  }

  #[test]
  fn circular_local_classes_are_rejected() {
    assert_eq!(
      expand_err(".a { @apply b; } .b { @apply a; }").reason,
      "You cannot `@apply` the `b` utility here because it creates a circular dependency."
    );
  }

  #[test]
  fn warns_about_tailwind_directives() {
    let (output, result) = run_stage(&UtilitiesStage::default(), "@tailwind utilities;");

    assert_eq!(output.unwrap(), "@tailwind utilities;\n");
    assert_eq!(
      result.messages,
      vec![Message::Warning {
        plugin: String::from("utilities"),
        text: String::from("`@tailwind utilities` is not supported and was left in place"),
      }]
    );
  }

  #[test]
  fn uses_the_provided_lookup() {
    let mut lookup = MockUtilityLookup::new();
    lookup
      .expect_lookup()
      .withf(|class| class == "brand")
      .times(1)
      .returning(|_| Some(vec![Declaration::new("color", "rebeccapurple")]));

    let stage = UtilitiesStage::new(Arc::new(lookup));
    let (output, _) = run_stage(&stage, ".a { @apply brand; }");

    assert_eq!(output.unwrap(), ".a {\n  color: rebeccapurple;\n}\n");
  }

  #[test]
  fn configured_classes() {
    let options: UtilitiesOptions =
      serde_json5::from_str("{ classes: { btn: { padding: '1rem', cursor: 'pointer' } } }").unwrap();
    let stage = UtilitiesStage::from_options(&options);

    let (output, _) = run_stage(&stage, ".a { @apply btn; }");

    assert_eq!(
      output.unwrap(),
      ".a {\n  padding: 1rem;\n  cursor: pointer;\n}\n"
    );
  }
}
