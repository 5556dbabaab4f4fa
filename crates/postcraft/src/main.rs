mod cli;
mod tracer;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use postcraft_config::{build_pipeline, ConfigLoader};
use postcraft_filesystem::os_file_system::OsFileSystem;
use postcraft_filesystem::FileSystemRef;

use crate::cli::Args;

fn main() -> anyhow::Result<ExitCode> {
  tracer::init()?;

  let args = Args::parse();
  let fs: FileSystemRef = Arc::new(OsFileSystem);

  let loaded = ConfigLoader::new(fs.clone()).load(args.config.as_deref())?;
  let pipeline = build_pipeline(&loaded.config, fs.clone())?;

  if args.print_stages {
    for name in pipeline.stage_names() {
      println!("{name}");
    }
    return Ok(ExitCode::SUCCESS);
  }

  if cli::run(&args, &pipeline, fs)? {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::FAILURE)
  }
}
