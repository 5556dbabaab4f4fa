use postcraft_ast::list;

/// Combines a parent and a nested selector list.
///
/// Every child selector is paired with every parent selector, parents in the
/// outer loop. A child containing `&` has each `&` replaced by the parent,
/// any other child becomes a descendant of the parent.
pub fn merge_selectors(parent: &str, child: &str) -> String {
  let parents = list::comma(parent);
  let children = list::comma(child);
  let mut merged = Vec::with_capacity(parents.len() * children.len());

  for parent in &parents {
    for child in &children {
      if has_nesting(child) {
        merged.push(replace_nesting(child, parent));
      } else {
        merged.push(format!("{parent} {child}"));
      }
    }
  }

  merged.join(", ")
}

fn has_nesting(selector: &str) -> bool {
  let mut has = false;
  visit_unquoted(selector, |ch| {
    if ch == '&' {
      has = true;
    }
  });
  has
}

fn replace_nesting(selector: &str, parent: &str) -> String {
  let mut output = String::with_capacity(selector.len() + parent.len());
  let mut quote: Option<char> = None;
  let mut escaped = false;

  for ch in selector.chars() {
    if escaped {
      escaped = false;
      output.push(ch);
      continue;
    }

    match (quote, ch) {
      (_, '\\') => escaped = true,
      (Some(open), _) if ch == open => quote = None,
      (None, '"' | '\'') => quote = Some(ch),
      (None, '&') => {
        output.push_str(parent);
        continue;
      }
      _ => {}
    }

    output.push(ch);
  }

  output
}

/// Calls `visit` with every character outside quotes that is not escaped.
fn visit_unquoted(selector: &str, mut visit: impl FnMut(char)) {
  let mut quote: Option<char> = None;
  let mut escaped = false;

  for ch in selector.chars() {
    if escaped {
      escaped = false;
      continue;
    }

    match (quote, ch) {
      (_, '\\') => escaped = true,
      (Some(open), _) if ch == open => quote = None,
      (Some(_), _) => {}
      (None, '"' | '\'') => quote = Some(ch),
      (None, _) => visit(ch),
    }
  }
}
