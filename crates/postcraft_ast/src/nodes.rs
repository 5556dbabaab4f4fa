use serde::Serialize;

/// Location of the first character of a node in its source text.
///
/// `line` and `column` are 1-based, `offset` is the byte offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Position {
  pub line: u32,
  pub column: u32,
  pub offset: usize,
}

impl Position {
  pub fn new(line: u32, column: u32, offset: usize) -> Self {
    Self {
      line,
      column,
      offset,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
  Rule,
  AtRule,
  Declaration,
  Comment,
}

/// A child of a [`Root`], [`Rule`] or block [`AtRule`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
  Rule(Rule),
  AtRule(AtRule),
  #[serde(rename = "decl")]
  Declaration(Declaration),
  Comment(Comment),
}

impl Node {
  pub fn kind(&self) -> NodeKind {
    match self {
      Node::Rule(_) => NodeKind::Rule,
      Node::AtRule(_) => NodeKind::AtRule,
      Node::Declaration(_) => NodeKind::Declaration,
      Node::Comment(_) => NodeKind::Comment,
    }
  }

  pub fn source(&self) -> Option<Position> {
    match self {
      Node::Rule(rule) => rule.source,
      Node::AtRule(at_rule) => at_rule.source,
      Node::Declaration(decl) => decl.source,
      Node::Comment(comment) => comment.source,
    }
  }

  /// Child nodes, `None` for declarations, comments and statement at-rules.
  pub fn children(&self) -> Option<&Vec<Node>> {
    match self {
      Node::Rule(rule) => Some(&rule.nodes),
      Node::AtRule(at_rule) => at_rule.nodes.as_ref(),
      Node::Declaration(_) | Node::Comment(_) => None,
    }
  }

  pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
    match self {
      Node::Rule(rule) => Some(&mut rule.nodes),
      Node::AtRule(at_rule) => at_rule.nodes.as_mut(),
      Node::Declaration(_) | Node::Comment(_) => None,
    }
  }

  pub fn as_rule(&self) -> Option<&Rule> {
    match self {
      Node::Rule(rule) => Some(rule),
      _ => None,
    }
  }

  pub fn as_at_rule(&self) -> Option<&AtRule> {
    match self {
      Node::AtRule(at_rule) => Some(at_rule),
      _ => None,
    }
  }

  pub fn as_declaration(&self) -> Option<&Declaration> {
    match self {
      Node::Declaration(decl) => Some(decl),
      _ => None,
    }
  }

  pub fn is_at_rule_named(&self, name: &str) -> bool {
    self.as_at_rule().is_some_and(|at_rule| at_rule.name == name)
  }
}

impl From<Rule> for Node {
  fn from(value: Rule) -> Self {
    Node::Rule(value)
  }
}

impl From<AtRule> for Node {
  fn from(value: AtRule) -> Self {
    Node::AtRule(value)
  }
}

impl From<Declaration> for Node {
  fn from(value: Declaration) -> Self {
    Node::Declaration(value)
  }
}

impl From<Comment> for Node {
  fn from(value: Comment) -> Self {
    Node::Comment(value)
  }
}

/// Top of a parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Root {
  pub nodes: Vec<Node>,
}

impl Root {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_nodes(nodes: Vec<Node>) -> Self {
    Self { nodes }
  }

  pub fn append(&mut self, node: impl Into<Node>) -> &mut Self {
    self.nodes.push(node.into());
    self
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Visits every node depth-first, parents before their children.
  pub fn walk<F>(&self, mut callback: F)
  where
    F: FnMut(&Node),
  {
    walk_nodes(&self.nodes, &mut callback);
  }

  pub fn walk_rules<F>(&self, mut callback: F)
  where
    F: FnMut(&Rule),
  {
    self.walk(|node| {
      if let Node::Rule(rule) = node {
        callback(rule);
      }
    });
  }

  /// Visits every at-rule named `name` (without the leading `@`).
  pub fn walk_at_rules<F>(&self, name: &str, mut callback: F)
  where
    F: FnMut(&AtRule),
  {
    self.walk(|node| {
      if let Node::AtRule(at_rule) = node {
        if at_rule.name == name {
          callback(at_rule);
        }
      }
    });
  }

  pub fn walk_decls<F>(&self, mut callback: F)
  where
    F: FnMut(&Declaration),
  {
    self.walk(|node| {
      if let Node::Declaration(decl) = node {
        callback(decl);
      }
    });
  }

  /// Removes every node, at any depth, for which `keep` returns false.
  ///
  /// A removed node takes its descendants with it; they are not visited.
  /// Returns the number of removed nodes.
  pub fn retain_deep<F>(&mut self, mut keep: F) -> usize
  where
    F: FnMut(&Node) -> bool,
  {
    retain_nodes_deep(&mut self.nodes, &mut keep)
  }

  /// Removes every at-rule named `name` at any depth.
  pub fn remove_at_rules(&mut self, name: &str) -> usize {
    self.retain_deep(|node| !node.is_at_rule_named(name))
  }

  /// Total number of nodes in the tree, the root excluded.
  pub fn node_count(&self) -> usize {
    let mut count = 0;
    self.walk(|_| count += 1);
    count
  }
}

pub fn walk_nodes<F>(nodes: &[Node], callback: &mut F)
where
  F: FnMut(&Node),
{
  for node in nodes {
    callback(node);
    if let Some(children) = node.children() {
      walk_nodes(children, callback);
    }
  }
}

pub fn retain_nodes_deep<F>(nodes: &mut Vec<Node>, keep: &mut F) -> usize
where
  F: FnMut(&Node) -> bool,
{
  let before = nodes.len();
  nodes.retain(|node| keep(node));
  let mut removed = before - nodes.len();

  for node in nodes.iter_mut() {
    if let Some(children) = node.children_mut() {
      removed += retain_nodes_deep(children, keep);
    }
  }

  removed
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rule {
  pub selector: String,
  pub nodes: Vec<Node>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source: Option<Position>,
}

impl Rule {
  pub fn new(selector: impl Into<String>) -> Self {
    Self {
      selector: selector.into(),
      nodes: Vec::new(),
      source: None,
    }
  }

  pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
    self.nodes = nodes;
    self
  }

  pub fn with_source(mut self, source: Option<Position>) -> Self {
    self.source = source;
    self
  }

  pub fn append(mut self, node: impl Into<Node>) -> Self {
    self.nodes.push(node.into());
    self
  }

  /// Copy of this rule with the same selector and source but no children.
  pub fn clone_empty(&self) -> Self {
    Self {
      selector: self.selector.clone(),
      nodes: Vec::new(),
      source: self.source,
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRule {
  /// Name without the leading `@`
  pub name: String,
  pub params: String,
  /// `None` for statements such as `@apply flex;`, `Some` for block at-rules
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nodes: Option<Vec<Node>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source: Option<Position>,
}

impl AtRule {
  pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      params: params.into(),
      nodes: None,
      source: None,
    }
  }

  pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
    self.nodes = Some(nodes);
    self
  }

  pub fn with_source(mut self, source: Option<Position>) -> Self {
    self.source = source;
    self
  }

  pub fn append(mut self, node: impl Into<Node>) -> Self {
    self.nodes.get_or_insert_with(Vec::new).push(node.into());
    self
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Declaration {
  pub prop: String,
  pub value: String,
  pub important: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source: Option<Position>,
}

impl Declaration {
  pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      prop: prop.into(),
      value: value.into(),
      important: false,
      source: None,
    }
  }

  pub fn important(mut self, important: bool) -> Self {
    self.important = important;
    self
  }

  pub fn with_source(mut self, source: Option<Position>) -> Self {
    self.source = source;
    self
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Comment {
  pub text: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source: Option<Position>,
}

impl Comment {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      source: None,
    }
  }
}
