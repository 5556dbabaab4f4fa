//! Log output for the command line, always on stderr so stdout only ever
//! carries CSS.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is not set, so stage warnings stay visible.
const DEFAULT_DIRECTIVE: &str = "warn";

pub fn init() -> anyhow::Result<()> {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

  let layer = tracing_subscriber::fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_filter(filter);

  tracing_subscriber::registry()
    .with(layer)
    .try_init()
    .map_err(|err| anyhow::anyhow!(err))?;

  Ok(())
}
