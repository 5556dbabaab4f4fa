use indexmap::IndexSet;
use postcraft_ast::{AtRule, Node, Root, Rule};
use postcraft_core::{ProcessResult, Stage};
use serde::Deserialize;

use crate::selectors::merge_selectors;

const DEFAULT_BUBBLE_AT_RULES: &[&str] = &[
  "media",
  "supports",
  "container",
  "-moz-document",
  "layer",
  "else",
  "when",
  "starting-style",
];
const DEFAULT_UNWRAP_AT_RULES: &[&str] = &[
  "document",
  "font-face",
  "keyframes",
  "-webkit-keyframes",
  "-moz-keyframes",
  "color-profile",
  "counter-style",
  "font-palette-values",
  "page",
  "property",
];
const AT_ROOT: &str = "at-root";
const NEST: &str = "nest";

/// Configuration as read from the `nesting` key.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct NestingOptions {
  /// Extra at-rules that bubble out of a rule, wrapping a copy of it
  pub bubble: Vec<String>,
  /// Extra at-rules that are moved out of a rule unchanged
  pub unwrap: Vec<String>,
  /// Keep a parent rule that ends up without children
  pub preserve_empty: bool,
}

#[derive(Debug)]
pub struct NestingStage {
  bubble: IndexSet<String>,
  unwrap: IndexSet<String>,
  preserve_empty: bool,
}

impl Default for NestingStage {
  fn default() -> Self {
    Self::new(NestingOptions::default())
  }
}

impl NestingStage {
  pub fn new(options: NestingOptions) -> Self {
    let bubble = DEFAULT_BUBBLE_AT_RULES
      .iter()
      .map(|name| name.to_string())
      .chain(options.bubble.iter().map(|name| name.to_ascii_lowercase()))
      .collect();
    let unwrap = DEFAULT_UNWRAP_AT_RULES
      .iter()
      .map(|name| name.to_string())
      .chain(options.unwrap.iter().map(|name| name.to_ascii_lowercase()))
      .collect();

    Self {
      bubble,
      unwrap,
      preserve_empty: options.preserve_empty,
    }
  }

  fn is_bubble(&self, at_rule: &AtRule) -> bool {
    at_rule.nodes.is_some() && self.bubble.contains(&at_rule.name.to_ascii_lowercase())
  }

  fn is_unwrap(&self, at_rule: &AtRule) -> bool {
    at_rule.nodes.is_some() && self.unwrap.contains(&at_rule.name.to_ascii_lowercase())
  }

  fn is_named(at_rule: &AtRule, name: &str) -> bool {
    at_rule.nodes.is_some() && at_rule.name.eq_ignore_ascii_case(name)
  }

  /// Whether a direct child of a rule has to leave it.
  fn is_nested(&self, node: &Node) -> bool {
    match node {
      Node::Rule(_) => true,
      Node::AtRule(at_rule) => {
        self.is_bubble(at_rule)
          || self.is_unwrap(at_rule)
          || Self::is_named(at_rule, AT_ROOT)
          || Self::is_named(at_rule, NEST)
      }
      _ => false,
    }
  }

  /// Flattens a list of siblings (the root or an at-rule block).
  pub fn process_nodes(&self, nodes: Vec<Node>) -> Vec<Node> {
    let mut output = Vec::with_capacity(nodes.len());

    for node in nodes {
      match node {
        Node::Rule(rule) => output.extend(self.process_rule(rule)),
        Node::AtRule(mut at_rule) => {
          if let Some(children) = at_rule.nodes.take() {
            at_rule.nodes = Some(self.process_nodes(children));
          }
          output.push(at_rule.into());
        }
        other => output.push(other),
      }
    }

    output
  }

  /// Returns the rule, unless it was emptied, followed by everything that was
  /// moved out of it, in source order.
  fn process_rule(&self, mut rule: Rule) -> Vec<Node> {
    if !rule.nodes.iter().any(|child| self.is_nested(child)) {
      return vec![rule.into()];
    }

    let children = std::mem::take(&mut rule.nodes);
    let mut kept = Vec::new();
    let mut after = Vec::new();
    let mut declarations = Vec::new();
    let mut copy_declarations = false;
    let mut unwrapped = false;

    for child in children {
      let at_rule = match child {
        Node::Rule(mut child_rule) => {
          self.pick_declarations(&rule, &mut declarations, &mut after);
          copy_declarations = true;
          unwrapped = true;
          child_rule.selector = merge_selectors(&rule.selector, &child_rule.selector);
          after.extend(self.process_rule(child_rule));
          continue;
        }
        Node::AtRule(at_rule) => at_rule,
        other => {
          if copy_declarations {
            declarations.push(other);
          } else {
            kept.push(other);
          }
          continue;
        }
      };

      if Self::is_named(&at_rule, NEST) {
        self.pick_declarations(&rule, &mut declarations, &mut after);
        copy_declarations = true;
        unwrapped = true;
        let nested = Rule::new(merge_selectors(&rule.selector, &at_rule.params))
          .with_nodes(at_rule.nodes.unwrap_or_default())
          .with_source(at_rule.source);
        after.extend(self.process_rule(nested));
      } else if Self::is_named(&at_rule, AT_ROOT) {
        self.pick_declarations(&rule, &mut declarations, &mut after);
        unwrapped = true;
        after.extend(self.unwrap_at_root(&rule, at_rule));
      } else if self.is_bubble(&at_rule) {
        self.pick_declarations(&rule, &mut declarations, &mut after);
        copy_declarations = true;
        unwrapped = true;
        after.push(self.bubble(&rule, at_rule).into());
      } else if self.is_unwrap(&at_rule) {
        self.pick_declarations(&rule, &mut declarations, &mut after);
        copy_declarations = true;
        unwrapped = true;
        after.push(self.unwrap(at_rule).into());
      } else {
        let mut at_rule = at_rule;
        if let Some(children) = at_rule.nodes.take() {
          at_rule.nodes = Some(self.process_nodes(children));
        }
        if copy_declarations {
          declarations.push(at_rule.into());
        } else {
          kept.push(at_rule.into());
        }
      }
    }

    self.pick_declarations(&rule, &mut declarations, &mut after);
    rule.nodes = kept;

    let mut output = Vec::with_capacity(after.len() + 1);
    if !(unwrapped && !self.preserve_empty && rule.nodes.is_empty()) {
      output.push(rule.into());
    }
    output.extend(after);
    output
  }

  /// Moves pending declarations into a fresh copy of `parent`.
  fn pick_declarations(&self, parent: &Rule, declarations: &mut Vec<Node>, after: &mut Vec<Node>) {
    if declarations.is_empty() {
      return;
    }

    let mut clone = parent.clone_empty();
    clone.nodes = std::mem::take(declarations);
    after.push(clone.into());
  }

  /// `.a { @media x { color: red } }` becomes `@media x { .a { color: red } }`.
  fn bubble(&self, parent: &Rule, mut at_rule: AtRule) -> AtRule {
    let children = at_rule.nodes.take().unwrap_or_default();
    let mut block = Vec::with_capacity(children.len());
    let mut collected = Vec::new();

    for child in children {
      match child {
        Node::Rule(mut rule) => {
          rule.selector = merge_selectors(&parent.selector, &rule.selector);
          block.extend(self.process_rule(rule));
        }
        Node::AtRule(inner) if self.is_bubble(&inner) => {
          block.push(self.bubble(parent, inner).into());
        }
        other => collected.push(other),
      }
    }

    if !collected.is_empty() {
      let mut clone = parent.clone_empty();
      clone.nodes = collected;
      block.splice(0..0, self.process_rule(clone));
    }

    at_rule.nodes = Some(block);
    at_rule
  }

  /// `@font-face`, `@keyframes` and friends leave the rule as they are.
  fn unwrap(&self, mut at_rule: AtRule) -> AtRule {
    if let Some(children) = at_rule.nodes.take() {
      at_rule.nodes = Some(self.process_nodes(children));
    }
    at_rule
  }

  /// Hoists the contents of `@at-root` without prefixing the parent selector.
  ///
  /// `@at-root .x { ... }` is shorthand for a single rule. Declarations
  /// directly inside `@at-root` stay attached to the parent selector.
  fn unwrap_at_root(&self, parent: &Rule, at_rule: AtRule) -> Vec<Node> {
    let AtRule {
      params,
      nodes,
      source,
      ..
    } = at_rule;
    let children = nodes.unwrap_or_default();

    if !params.is_empty() && !params.starts_with('(') {
      let rule = Rule::new(params).with_nodes(children).with_source(source);
      return self.process_rule(rule);
    }

    let mut hoisted = Vec::new();
    let mut collected = Vec::new();
    for child in children {
      match child {
        Node::Rule(rule) => hoisted.extend(self.process_rule(rule)),
        Node::AtRule(mut inner) if inner.nodes.is_some() => {
          if let Some(children) = inner.nodes.take() {
            inner.nodes = Some(self.process_nodes(children));
          }
          hoisted.push(inner.into());
        }
        other => collected.push(other),
      }
    }

    if !collected.is_empty() {
      let mut clone = parent.clone_empty();
      clone.nodes = collected;
      hoisted.splice(0..0, self.process_rule(clone));
    }

    hoisted
  }
}

impl Stage for NestingStage {
  fn name(&self) -> &'static str {
    "nesting"
  }

  #[tracing::instrument(level = "debug", skip_all, fields(plugin = "nesting"))]
  fn run(&self, root: &mut Root, _result: &mut ProcessResult) -> anyhow::Result<()> {
    let nodes = std::mem::take(&mut root.nodes);
    root.nodes = self.process_nodes(nodes);
    Ok(())
  }
}
