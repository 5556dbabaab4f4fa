//! Splitting of comma and space separated lists found in selectors, at-rule
//! params and declaration values. Separators inside quotes, parentheses or
//! square brackets, and escaped separators, do not split.

/// `a, b:is(c, d)` → `["a", "b:is(c, d)"]`
pub fn comma(value: &str) -> Vec<String> {
  split(value, &[','])
}

/// `flex  items-center` → `["flex", "items-center"]`
pub fn space(value: &str) -> Vec<String> {
  split(value, &[' ', '\n', '\t', '\r', '\x0c'])
}

/// Splits `value` on any of `separators` at the top level, trimming each item
/// and dropping empty ones.
pub fn split(value: &str, separators: &[char]) -> Vec<String> {
  let mut items = Vec::new();
  let mut current = String::new();
  let mut depth = 0u32;
  let mut quote: Option<char> = None;
  let mut escaped = false;

  for ch in value.chars() {
    if escaped {
      escaped = false;
      current.push(ch);
      continue;
    }

    match quote {
      Some(open) => {
        if ch == '\\' {
          escaped = true;
        } else if ch == open {
          quote = None;
        }
      }
      None => match ch {
        '\\' => escaped = true,
        '"' | '\'' => quote = Some(ch),
        '(' | '[' => depth += 1,
        ')' | ']' => depth = depth.saturating_sub(1),
        _ if depth == 0 && separators.contains(&ch) => {
          push_item(&mut items, &mut current);
          continue;
        }
        _ => {}
      },
    }

    current.push(ch);
  }

  push_item(&mut items, &mut current);
  items
}

fn push_item(items: &mut Vec<String>, current: &mut String) {
  let item = current.trim();
  if !item.is_empty() {
    items.push(item.to_string());
  }
  current.clear();
}
