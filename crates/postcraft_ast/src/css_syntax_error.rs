use crate::nodes::Position;

/// A parse failure, or a stage error reported against a node.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}:{line}:{column}: {reason}", file_name(.file))]
pub struct CssSyntaxError {
  pub reason: String,
  pub file: Option<String>,
  pub line: u32,
  pub column: u32,
}

fn file_name(file: &Option<String>) -> &str {
  file.as_deref().unwrap_or("<css input>")
}

impl CssSyntaxError {
  pub fn new(reason: impl Into<String>, file: Option<&str>, position: Option<Position>) -> Self {
    let position = position.unwrap_or_else(|| Position::new(1, 1, 0));
    Self {
      reason: reason.into(),
      file: file.filter(|file| !file.is_empty()).map(String::from),
      line: position.line,
      column: position.column,
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn displays_file_and_position() {
    let error = CssSyntaxError::new("Unclosed block", Some("card.css"), Some(Position::new(3, 7, 20)));

    assert_eq!(error.to_string(), "card.css:3:7: Unclosed block");
  }

  #[test]
  fn falls_back_to_placeholder_file_name() {
    let error = CssSyntaxError::new("Unknown word", Some(""), None);

    assert_eq!(error.to_string(), "<css input>:1:1: Unknown word");
  }
}
