use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use postcraft_core::{Message, Pipeline, ProcessOptions, ProcessOutput};
use postcraft_filesystem::FileSystemRef;
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "postcraft", version, about)]
pub struct Args {
  /// Config file, instead of searching for postcraft.config.json or .postcraftrc
  #[arg(long, value_name = "PATH", env = "POSTCRAFT_CONFIG")]
  pub config: Option<PathBuf>,
  /// Write `<stem>.css` for every input into this directory instead of stdout
  #[arg(long, value_name = "DIR")]
  pub out_dir: Option<PathBuf>,
  /// Identifier of the stylesheet read from stdin, e.g. `card.less?vue&type=style`
  #[arg(long, value_name = "ID", conflicts_with = "files")]
  pub from: Option<String>,
  /// Minify the output
  #[arg(long)]
  pub minify: bool,
  /// Print the configured stage names and exit
  #[arg(long)]
  pub print_stages: bool,
  /// Stylesheets to process, stdin when empty
  pub files: Vec<PathBuf>,
}

/// Processes every input, returning `false` when at least one failed.
pub fn run(args: &Args, pipeline: &Pipeline, fs: FileSystemRef) -> anyhow::Result<bool> {
  if args.files.is_empty() {
    let mut css = String::new();
    std::io::stdin()
      .read_to_string(&mut css)
      .context("Failed to read stdin")?;

    let mut options = ProcessOptions::new().minify(args.minify);
    if let Some(from) = &args.from {
      options = options.from_path(from.as_str());
    }

    let id = args.from.as_deref().unwrap_or("<stdin>");
    return match pipeline.process(&css, options) {
      Ok(output) => {
        report_messages(id, &output.messages);
        print(&output.css)?;
        Ok(true)
      }
      Err(error) => {
        tracing::error!(file = id, "{error}");
        Ok(false)
      }
    };
  }

  let destinations = args
    .out_dir
    .as_deref()
    .map(|out_dir| output_paths(out_dir, &args.files))
    .transpose()?;

  let outputs: Vec<_> = args
    .files
    .par_iter()
    .map(|file| process_file(args, pipeline, &fs, file))
    .collect();

  // Results are reported in argument order whatever order they finished in
  let mut ok = true;
  for (index, (file, output)) in args.files.iter().zip(outputs).enumerate() {
    let output = match output {
      Ok(output) => output,
      Err(error) => {
        tracing::error!(file = %file.display(), "{error:#}");
        ok = false;
        continue;
      }
    };

    report_messages(&file.display().to_string(), &output.messages);

    match &destinations {
      Some(destinations) => {
        let destination = &destinations[index];
        fs.write(destination, &output.css)
          .with_context(|| format!("Failed to write {}", destination.display()))?;
        tracing::info!(file = %file.display(), to = %destination.display(), "Wrote output");
      }
      None => print(&output.css)?,
    }
  }

  Ok(ok)
}

fn process_file(
  args: &Args,
  pipeline: &Pipeline,
  fs: &FileSystemRef,
  file: &Path,
) -> anyhow::Result<ProcessOutput> {
  let css = fs
    .read_to_string(file)
    .with_context(|| format!("Failed to read {}", file.display()))?;

  let options = ProcessOptions::new()
    .from_path(file.display().to_string())
    .minify(args.minify);

  Ok(pipeline.process(&css, options)?)
}

/// `<out-dir>/<stem>.css`
fn output_path(out_dir: &Path, file: &Path) -> PathBuf {
  let stem = file
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_else(|| String::from("output"));

  out_dir.join(format!("{stem}.css"))
}

/// Destination of every input, refusing inputs that would overwrite each other.
fn output_paths(out_dir: &Path, files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
  let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
  let mut destinations = Vec::with_capacity(files.len());

  for file in files {
    let destination = output_path(out_dir, file);
    if let Some(previous) = claimed.insert(destination.clone(), file) {
      anyhow::bail!(
        "{} and {} would both be written to {}",
        previous.display(),
        file.display(),
        destination.display()
      );
    }
    destinations.push(destination);
  }

  Ok(destinations)
}

fn report_messages(file: &str, messages: &[Message]) {
  for message in messages {
    match message {
      Message::Warning { plugin, text } => tracing::warn!(file, plugin = plugin.as_str(), "{text}"),
      Message::Dependency { file: dependency, .. } => {
        tracing::debug!(file, dependency = %dependency.display(), "Dependency")
      }
    }
  }
}

fn print(css: &str) -> anyhow::Result<()> {
  let mut stdout = std::io::stdout().lock();
  stdout.write_all(css.as_bytes())?;
  stdout.flush()?;
  Ok(())
}
