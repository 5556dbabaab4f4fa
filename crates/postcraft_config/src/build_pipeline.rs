use std::collections::HashSet;
use std::sync::Arc;

use postcraft_core::{Pipeline, Stage};
use postcraft_filesystem::FileSystemRef;
use postcraft_plugin_autoprefixer::AutoprefixerStage;
use postcraft_plugin_import::ImportStage;
use postcraft_plugin_nesting::NestingStage;
use postcraft_plugin_strip_directive::SelectiveDirectiveStripper;
use postcraft_plugin_utilities::UtilitiesStage;

use crate::{Config, ConfigError};

/// Creates the stages named in `config.plugins`, in list order.
pub fn build_pipeline(config: &Config, fs: FileSystemRef) -> Result<Pipeline, ConfigError> {
  let mut pipeline = Pipeline::new();
  let mut seen = HashSet::new();

  for name in &config.plugins {
    if !seen.insert(name.as_str()) {
      return Err(ConfigError::DuplicatePlugin(name.clone()));
    }

    let stage: Arc<dyn Stage> = match name.as_str() {
      "import" => Arc::new(ImportStage::new(fs.clone(), config.import.clone())),
      "nesting" => Arc::new(NestingStage::new(config.nesting.clone())),
      "strip-directive" => Arc::new(SelectiveDirectiveStripper::new(
        config.strip_directive.clone(),
      )),
      "utilities" => Arc::new(UtilitiesStage::from_options(&config.utilities)),
      "autoprefixer" => Arc::new(AutoprefixerStage::new(&config.autoprefixer)?),
      _ => return Err(ConfigError::UnknownPlugin(name.clone())),
    };

    pipeline.push(stage);
  }

  tracing::debug!(stages = ?pipeline.stage_names(), "Built pipeline");
  Ok(pipeline)
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use indoc::indoc;
  use postcraft_core::ProcessOptions;
  use postcraft_filesystem::in_memory_file_system::InMemoryFileSystem;
  use postcraft_plugin_autoprefixer::AutoprefixerOptions;
  use pretty_assertions::assert_eq;

  use super::*;

  fn file_system() -> FileSystemRef {
    let fs = InMemoryFileSystem::default();
    fs.set_current_working_directory(Path::new("/project"));
    fs.write_file(
      Path::new("/project/src/buttons.css"),
      ".btn { & .icon { @apply mr-2; } }",
    );
    Arc::new(fs)
  }

  fn config(plugins: &[&str]) -> Config {
    Config {
      plugins: plugins.iter().map(|name| name.to_string()).collect(),
      autoprefixer: AutoprefixerOptions {
        browsers: vec![String::from("firefox 60")],
      },
      ..Config::default()
    }
  }

  #[test]
  fn builds_the_default_order() {
    let pipeline = build_pipeline(&Config::default(), file_system()).unwrap();

    assert_eq!(
      pipeline.stage_names(),
      vec![
        "import",
        "nesting",
        "strip-directive",
        "utilities",
        "autoprefixer"
      ]
    );
  }

  #[test]
  fn keeps_the_configured_order() {
    let pipeline = build_pipeline(&config(&["utilities", "import"]), file_system()).unwrap();

    assert_eq!(pipeline.stage_names(), vec!["utilities", "import"]);
  }

  #[test]
  fn rejects_unknown_and_duplicate_plugins() {
    let error = build_pipeline(&config(&["import", "tailwind"]), file_system()).unwrap_err();
    assert_eq!(error.to_string(), "Unknown plugin 'tailwind'");

    let error = build_pipeline(&config(&["nesting", "nesting"]), file_system()).unwrap_err();
    assert_eq!(error.to_string(), "Plugin 'nesting' is listed more than once");
  }

  #[test]
  fn reports_invalid_browserslist_queries() {
    let mut config = config(&["autoprefixer"]);
    config.autoprefixer.browsers = vec![String::from("netscape navigator 4")];

    let error = build_pipeline(&config, file_system()).unwrap_err();

    assert!(matches!(error, ConfigError::Browserslist(_)));
  }

  #[test]
  fn runs_every_stage_of_a_less_file() {
    let pipeline = build_pipeline(&Config::default(), file_system()).unwrap();
    let css = indoc! {"
      @import './buttons.css';
      .card {
        user-select: none;
        @apply flex;
        & .title { @apply p-4; }
      }
    "};

    let less = pipeline
      .process(css, ProcessOptions::new().from_path("/project/src/card.less"))
      .unwrap();
    let plain = pipeline
      .process(css, ProcessOptions::new().from_path("/project/src/card.css"))
      .unwrap();

    let mut applies = 0;
    less.root.walk_at_rules("apply", |_| applies += 1);
    assert_eq!(applies, 0);
    assert!(!less.css.contains("display: flex"));
    assert!(!less.css.contains("margin-right: 0.5rem"));
    assert!(less.css.contains(".btn .icon {}\n"));

    assert!(plain.css.contains("display: flex"));
    assert!(plain.css.contains(".card .title {\n  padding: 1rem;\n}"));
    assert!(plain.css.contains(".btn .icon {\n  margin-right: 0.5rem;\n}"));
  }
}
