use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// Read-only description of the compilation unit being processed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOptions {
  /// Path or module identifier of the source, e.g. `src/card.less?vue&type=style`
  pub from: Option<String>,
  /// Minify the serialized output
  pub minify: bool,
}

impl ProcessOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_path(mut self, from: impl Into<String>) -> Self {
    self.from = Some(from.into());
    self
  }

  pub fn minify(mut self, minify: bool) -> Self {
    self.minify = minify;
    self
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
  Warning {
    plugin: String,
    text: String,
  },
  /// A file that was read while processing, e.g. an inlined `@import`
  Dependency {
    plugin: String,
    file: PathBuf,
    parent: Option<String>,
  },
}

/// Per-file state handed to every stage: the options plus collected messages.
#[derive(Debug)]
pub struct ProcessResult {
  opts: Arc<ProcessOptions>,
  pub messages: Vec<Message>,
}

impl ProcessResult {
  pub fn new(opts: Arc<ProcessOptions>) -> Self {
    Self {
      opts,
      messages: Vec::new(),
    }
  }

  pub fn opts(&self) -> &ProcessOptions {
    &self.opts
  }

  /// The originating file identifier, empty when unknown.
  pub fn from(&self) -> &str {
    self.opts.from.as_deref().unwrap_or_default()
  }

  pub fn warn(&mut self, plugin: &str, text: impl Into<String>) {
    let text = text.into();
    tracing::debug!(plugin, %text, "Stage warning");
    self.messages.push(Message::Warning {
      plugin: plugin.to_string(),
      text,
    });
  }

  pub fn add_dependency(&mut self, plugin: &str, file: PathBuf) {
    self.messages.push(Message::Dependency {
      plugin: plugin.to_string(),
      file,
      parent: self.opts.from.clone(),
    });
  }

  pub fn warnings(&self) -> impl Iterator<Item = &Message> {
    self
      .messages
      .iter()
      .filter(|message| matches!(message, Message::Warning { .. }))
  }

  pub fn dependencies(&self) -> impl Iterator<Item = &PathBuf> {
    self.messages.iter().filter_map(|message| match message {
      Message::Dependency { file, .. } => Some(file),
      Message::Warning { .. } => None,
    })
  }
}
