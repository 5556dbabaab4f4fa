use lightningcss::targets::Browsers;
use postcraft_ast::{AtRule, Declaration, Node, Root, Rule};
use postcraft_core::{ProcessResult, Stage};
use serde::Deserialize;

use crate::prefix_data::{FeatureKind, FEATURES};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoprefixerOptions {
  /// Browserslist queries, e.g. `["defaults"]` or `["safari >= 12"]`
  pub browsers: Vec<String>,
}

impl Default for AutoprefixerOptions {
  fn default() -> Self {
    Self {
      browsers: vec![String::from("defaults")],
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum AutoprefixerError {
  #[error("Invalid browserslist query '{query}': {message}")]
  Browserslist { query: String, message: String },
}

/// Inserts vendor-prefixed copies of declarations, selectors and at-rules
/// the configured browsers need.
///
/// Prefixed copies go before the original and nothing is ever removed, so
/// running the stage twice gives the same output.
#[derive(Debug, Default)]
pub struct AutoprefixerStage {
  browsers: Option<Browsers>,
}

impl AutoprefixerStage {
  pub fn new(options: &AutoprefixerOptions) -> Result<Self, AutoprefixerError> {
    let browsers = Browsers::from_browserslist(&options.browsers).map_err(|error| {
      AutoprefixerError::Browserslist {
        query: options.browsers.join(", "),
        message: error.to_string(),
      }
    })?;

    tracing::debug!(?browsers, "Resolved autoprefixer targets");
    Ok(Self { browsers })
  }

  /// Stage for already resolved targets, `None` meaning no prefixes at all.
  pub fn with_browsers(browsers: Option<Browsers>) -> Self {
    Self { browsers }
  }

  pub fn browsers(&self) -> Option<&Browsers> {
    self.browsers.as_ref()
  }

  /// Prefixes `nodes` and everything below them, returning how many
  /// prefixed nodes were inserted.
  pub fn prefix_nodes(&self, nodes: &mut Vec<Node>) -> usize {
    let Some(browsers) = &self.browsers else {
      return 0;
    };

    prefix_nodes(browsers, nodes)
  }
}

fn prefix_nodes(browsers: &Browsers, nodes: &mut Vec<Node>) -> usize {
  let mut inserted = 0;
  for node in nodes.iter_mut() {
    if let Some(children) = node.children_mut() {
      inserted += prefix_nodes(browsers, children);
    }
  }

  let original = std::mem::take(nodes);
  let mut output = Vec::with_capacity(original.len());
  for node in &original {
    for copy in prefixed_copies(browsers, node) {
      let exists = original.iter().chain(output.iter()).any(|n| same_slot(n, &copy));
      if !exists {
        output.push(copy);
        inserted += 1;
      }
    }
    output.push(node.clone());
  }

  *nodes = output;
  inserted
}

fn prefixed_copies(browsers: &Browsers, node: &Node) -> Vec<Node> {
  match node {
    Node::Declaration(decl) => declaration_copies(browsers, decl),
    Node::Rule(rule) => selector_copies(browsers, rule),
    Node::AtRule(at_rule) => at_rule_copies(browsers, at_rule),
    Node::Comment(_) => Vec::new(),
  }
}

fn declaration_copies(browsers: &Browsers, decl: &Declaration) -> Vec<Node> {
  let prop = decl.prop.to_ascii_lowercase();
  let mut copies = Vec::new();

  for feature in FEATURES {
    match &feature.kind {
      FeatureKind::Property(props) if props.contains(&prop.as_str()) => {
        for prefix in feature.prefixes(browsers) {
          let mut copy = decl.clone();
          copy.prop = format!("{prefix}{}", decl.prop);
          copies.push(copy.into());
        }
      }
      FeatureKind::Value { props, value }
        if props.contains(&prop.as_str()) && decl.value.trim().eq_ignore_ascii_case(value) =>
      {
        for prefixed in feature.prefixes(browsers) {
          let mut copy = decl.clone();
          copy.value = prefixed.to_string();
          copies.push(copy.into());
        }
      }
      _ => {}
    }
  }

  copies
}

fn selector_copies(browsers: &Browsers, rule: &Rule) -> Vec<Node> {
  let mut copies = Vec::new();

  for feature in FEATURES {
    let FeatureKind::Selector(pseudo) = feature.kind else {
      continue;
    };
    if !rule.selector.contains(pseudo) {
      continue;
    }

    // Each variant needs its own rule, an unknown pseudo-element drops the
    // whole selector list.
    for variant in feature.prefixes(browsers) {
      let mut copy = rule.clone();
      copy.selector = rule.selector.replace(pseudo, variant);
      copies.push(copy.into());
    }
  }

  copies
}

fn at_rule_copies(browsers: &Browsers, at_rule: &AtRule) -> Vec<Node> {
  let name = at_rule.name.to_ascii_lowercase();
  let mut copies = Vec::new();

  for feature in FEATURES {
    let FeatureKind::AtRule(feature_name) = feature.kind else {
      continue;
    };
    if name != feature_name {
      continue;
    }

    for prefix in feature.prefixes(browsers) {
      let mut copy = at_rule.clone();
      copy.name = format!("{prefix}{}", at_rule.name);
      copies.push(copy.into());
    }
  }

  copies
}

/// Whether `existing` already provides what `copy` would add.
fn same_slot(existing: &Node, copy: &Node) -> bool {
  match (existing, copy) {
    (Node::Declaration(existing), Node::Declaration(copy)) => {
      // A prefixed property counts whatever its value, a prefixed value
      // only when it matches.
      existing.prop.eq_ignore_ascii_case(&copy.prop)
        && (copy.prop.starts_with('-') || existing.value.eq_ignore_ascii_case(&copy.value))
    }
    (Node::Rule(existing), Node::Rule(copy)) => existing.selector == copy.selector,
    (Node::AtRule(existing), Node::AtRule(copy)) => {
      existing.name.eq_ignore_ascii_case(&copy.name) && existing.params == copy.params
    }
    _ => false,
  }
}

impl Stage for AutoprefixerStage {
  fn name(&self) -> &'static str {
    "autoprefixer"
  }

  #[tracing::instrument(level = "debug", skip_all, fields(plugin = "autoprefixer"))]
  fn run(&self, root: &mut Root, _result: &mut ProcessResult) -> anyhow::Result<()> {
    let inserted = self.prefix_nodes(&mut root.nodes);
    if inserted > 0 {
      tracing::debug!(inserted, "Added vendor prefixes");
    }

    Ok(())
  }
}
