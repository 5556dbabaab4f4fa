use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StripDirectiveOptions {
  /// At-rule name to remove, without the leading `@`
  pub directive: String,
  /// File extension of the dialect the directive is stripped from
  pub extension: String,
}

impl Default for StripDirectiveOptions {
  fn default() -> Self {
    Self {
      directive: String::from("apply"),
      extension: String::from(".less"),
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn missing_keys_fall_back_to_defaults() {
    let options: StripDirectiveOptions = serde_json5::from_str("{ extension: '.scss' }").unwrap();

    assert_eq!(
      options,
      StripDirectiveOptions {
        directive: String::from("apply"),
        extension: String::from(".scss"),
      }
    );
  }
}
