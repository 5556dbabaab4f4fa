use std::fmt::Debug;

use indexmap::IndexMap;
use postcraft_ast::Declaration;

use crate::builtin;

/// Source of the declarations a utility class stands for.
#[cfg_attr(test, mockall::automock)]
pub trait UtilityLookup: Debug + Send + Sync {
  fn lookup(&self, class: &str) -> Option<Vec<Declaration>>;
}

/// Configured classes layered over the built-in utilities.
#[derive(Clone, Debug, Default)]
pub struct UtilityRegistry {
  classes: IndexMap<String, Vec<Declaration>>,
}

impl UtilityRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds the registry from the `utilities.classes` config map of
  /// `class -> { property: value }`.
  pub fn from_classes(classes: &IndexMap<String, IndexMap<String, String>>) -> Self {
    let mut registry = Self::new();
    for (class, properties) in classes {
      registry.insert(
        class,
        properties
          .iter()
          .map(|(prop, value)| Declaration::new(prop.as_str(), value.as_str()))
          .collect(),
      );
    }
    registry
  }

  /// Adds or replaces a class.
  pub fn insert(&mut self, class: impl Into<String>, declarations: Vec<Declaration>) {
    self.classes.insert(class.into(), declarations);
  }

  pub fn len(&self) -> usize {
    self.classes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.classes.is_empty()
  }
}

impl UtilityLookup for UtilityRegistry {
  fn lookup(&self, class: &str) -> Option<Vec<Declaration>> {
    match self.classes.get(class) {
      Some(declarations) => Some(declarations.clone()),
      None => builtin::lookup(class),
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn configured_classes_shadow_builtins() {
    let mut properties = IndexMap::new();
    properties.insert(String::from("display"), String::from("inline-flex"));
    properties.insert(String::from("gap"), String::from("2px"));
    let mut classes = IndexMap::new();
    classes.insert(String::from("flex"), properties);

    let registry = UtilityRegistry::from_classes(&classes);

    assert_eq!(
      registry.lookup("flex"),
      Some(vec![
        Declaration::new("display", "inline-flex"),
        Declaration::new("gap", "2px")
      ])
    );
    assert_eq!(
      registry.lookup("hidden"),
      Some(vec![Declaration::new("display", "none")])
    );
    assert_eq!(registry.lookup("btn-primary"), None);
  }
}
