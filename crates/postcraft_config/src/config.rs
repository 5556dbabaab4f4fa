use postcraft_plugin_autoprefixer::AutoprefixerOptions;
use postcraft_plugin_import::ImportOptions;
use postcraft_plugin_nesting::NestingOptions;
use postcraft_plugin_strip_directive::StripDirectiveOptions;
use postcraft_plugin_utilities::UtilitiesOptions;
use serde::Deserialize;

/// Stage order used when the config does not list `plugins`.
pub const DEFAULT_PLUGINS: [&str; 5] = [
  "import",
  "nesting",
  "strip-directive",
  "utilities",
  "autoprefixer",
];

/// Contents of `postcraft.config.json` or `.postcraftrc`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
  pub plugins: Vec<String>,
  pub import: ImportOptions,
  pub nesting: NestingOptions,
  pub strip_directive: StripDirectiveOptions,
  pub utilities: UtilitiesOptions,
  pub autoprefixer: AutoprefixerOptions,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      plugins: DEFAULT_PLUGINS.iter().map(|name| name.to_string()).collect(),
      import: ImportOptions::default(),
      nesting: NestingOptions::default(),
      strip_directive: StripDirectiveOptions::default(),
      utilities: UtilitiesOptions::default(),
      autoprefixer: AutoprefixerOptions::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn empty_object_is_the_default_config() {
    let config: Config = serde_json5::from_str("{}").unwrap();

    assert_eq!(config, Config::default());
  }

  #[test]
  fn parses_json5_with_camel_case_keys() {
    let config: Config = serde_json5::from_str(indoc! {r#"
      {
        // JSON5 allows comments
        plugins: ["strip-directive", "utilities"],
        import: { paths: ["src/styles"], skipDuplicates: false },
        nesting: { preserveEmpty: true },
        stripDirective: { extension: ".scss" },
        utilities: { classes: { btn: { padding: "1rem" } } },
        autoprefixer: { browsers: ["safari >= 12"] },
      }
    "#})
    .unwrap();

    assert_eq!(config.plugins, vec!["strip-directive", "utilities"]);
    assert_eq!(
      config.import,
      ImportOptions {
        paths: vec![PathBuf::from("src/styles")],
        skip_duplicates: false,
      }
    );
    assert!(config.nesting.preserve_empty);
    assert_eq!(config.strip_directive.directive, "apply");
    assert_eq!(config.strip_directive.extension, ".scss");
    assert_eq!(config.utilities.classes["btn"]["padding"], "1rem");
    assert_eq!(config.autoprefixer.browsers, vec!["safari >= 12"]);
  }

  #[test]
  fn rejects_unknown_keys() {
    let result = serde_json5::from_str::<Config>("{ plugin: [] }");

    assert!(result.is_err());
  }
}
