use postcraft_ast::{AtRule, Node};

/// The parsed params of an `@import` at-rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportStatement {
  pub url: String,
  /// `Some("")` for an anonymous `layer`
  pub layer: Option<String>,
  pub supports: Option<String>,
  pub media: String,
}

impl ImportStatement {
  /// Parses `"a.css" layer(base) supports(display: grid) screen`.
  pub fn parse(params: &str) -> Option<Self> {
    let params = params.trim();
    let (url, rest) = if let Some(inner) = strip_prefix_ignore_case(params, "url(") {
      let close = inner.find(')')?;
      (unquote(inner[..close].trim())?, &inner[close + 1..])
    } else {
      let quote = params.chars().next().filter(|ch| *ch == '"' || *ch == '\'')?;
      let close = params[1..].find(quote)? + 1;
      (params[1..close].to_string(), &params[close + 1..])
    };

    let mut statement = ImportStatement {
      url,
      ..ImportStatement::default()
    };

    let mut rest = rest.trim_start();
    if let Some(inner) = strip_prefix_ignore_case(rest, "layer(") {
      let close = find_closing_paren(inner)?;
      statement.layer = Some(inner[..close].trim().to_string());
      rest = inner[close + 1..].trim_start();
    } else if let Some(after) = strip_prefix_ignore_case(rest, "layer") {
      if after.is_empty() || after.starts_with(char::is_whitespace) {
        statement.layer = Some(String::new());
        rest = after.trim_start();
      }
    }

    if let Some(inner) = strip_prefix_ignore_case(rest, "supports(") {
      let close = find_closing_paren(inner)?;
      statement.supports = Some(inner[..close].trim().to_string());
      rest = inner[close + 1..].trim_start();
    }

    statement.media = rest.trim().to_string();
    Some(statement)
  }

  pub fn is_remote(&self) -> bool {
    let url = self.url.to_ascii_lowercase();
    url.starts_with("http://")
      || url.starts_with("https://")
      || url.starts_with("//")
      || url.starts_with("data:")
  }

  /// Wraps inlined nodes in the layer, supports and media conditions of the
  /// statement, media outermost.
  pub fn wrap(&self, nodes: Vec<Node>) -> Vec<Node> {
    let mut nodes = nodes;

    if let Some(layer) = &self.layer {
      nodes = vec![AtRule::new("layer", layer.as_str()).with_nodes(nodes).into()];
    }

    if let Some(supports) = &self.supports {
      let condition = if supports.starts_with('(') || supports.ends_with(')') {
        supports.clone()
      } else {
        format!("({supports})")
      };
      nodes = vec![AtRule::new("supports", condition).with_nodes(nodes).into()];
    }

    if !self.media.is_empty() {
      nodes = vec![AtRule::new("media", self.media.as_str()).with_nodes(nodes).into()];
    }

    nodes
  }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
  let head = value.get(..prefix.len())?;
  head
    .eq_ignore_ascii_case(prefix)
    .then(|| &value[prefix.len()..])
}

fn unquote(value: &str) -> Option<String> {
  match value.chars().next() {
    Some(quote @ ('"' | '\'')) => value
      .strip_prefix(quote)
      .and_then(|value| value.strip_suffix(quote))
      .map(String::from),
    _ => Some(value.to_string()),
  }
}

/// Offset of the `)` closing a group whose `(` was just consumed.
fn find_closing_paren(value: &str) -> Option<usize> {
  let mut depth = 0usize;
  for (index, ch) in value.char_indices() {
    match ch {
      '(' => depth += 1,
      ')' if depth == 0 => return Some(index),
      ')' => depth -= 1,
      _ => {}
    }
  }
  None
}
