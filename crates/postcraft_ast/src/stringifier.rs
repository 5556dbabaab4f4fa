use std::fmt::Write;

use crate::nodes::{Node, Root};

const INDENT: &str = "  ";

/// Serializes a tree with normalized formatting: one node per line, two space
/// indentation and a trailing newline. Source whitespace is not preserved.
pub fn stringify(root: &Root) -> String {
  let mut output = String::new();

  for node in &root.nodes {
    write_node(&mut output, node, 0);
    output.push('\n');
  }

  output
}

fn write_node(output: &mut String, node: &Node, depth: usize) {
  let indent = INDENT.repeat(depth);

  match node {
    Node::Declaration(decl) => {
      let _ = write!(output, "{indent}{}: {}", decl.prop, decl.value);
      if decl.important {
        output.push_str(" !important");
      }
      output.push(';');
    }
    Node::Comment(comment) => {
      let _ = write!(output, "{indent}/* {} */", comment.text);
    }
    Node::AtRule(at_rule) => {
      let _ = write!(output, "{indent}@{}", at_rule.name);
      if !at_rule.params.is_empty() {
        output.push(' ');
        output.push_str(&at_rule.params);
      }
      match &at_rule.nodes {
        Some(nodes) => write_block(output, nodes, depth, &indent),
        None => output.push(';'),
      }
    }
    Node::Rule(rule) => {
      output.push_str(&indent);
      output.push_str(&rule.selector);
      write_block(output, &rule.nodes, depth, &indent);
    }
  }
}

fn write_block(output: &mut String, nodes: &[Node], depth: usize, indent: &str) {
  if nodes.is_empty() {
    output.push_str(" {}");
    return;
  }

  output.push_str(" {\n");
  for node in nodes {
    write_node(output, node, depth + 1);
    output.push('\n');
  }
  output.push_str(indent);
  output.push('}');
}
