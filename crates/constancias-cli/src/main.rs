//! `constancias` — command-line frontend for the certificate store.
//!
//! # Usage
//!
//! ```
//! constancias instructor add "Ana"
//! constancias course add Math101 --instructor 1
//! constancias student add "Bob" --course 1
//! constancias certificate issue --student 1 --course 1
//! constancias --json certificate list
//! ```

mod cli;
mod commands;
mod output;
mod settings;

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use constancias_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{cli::Args, output::Format, settings::Settings};

/// Exit status for errors the user can fix by changing their input.
const EXIT_USER_ERROR: u8 = 2;

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  match run(Args::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => report(&err),
  }
}

fn run(args: Args) -> anyhow::Result<()> {
  let settings = Settings::load(&args.config, args.database.as_deref())?;
  let format = if args.json { Format::Json } else { Format::Plain };

  let mut store = SqliteStore::open(&settings.database_path).with_context(|| {
    format!("failed to open store at {:?}", settings.database_path)
  })?;

  commands::dispatch(&mut store, args.command, format)?;

  store.close().context("failed to close store")?;
  Ok(())
}

/// Print `err` and pick an exit status: user-correctable store errors get
/// [`EXIT_USER_ERROR`], everything else a generic failure.
fn report(err: &anyhow::Error) -> ExitCode {
  if let Some(store_err) = err.downcast_ref::<constancias_store_sqlite::Error>()
    && (store_err.is_constraint_violation() || store_err.is_not_found())
  {
    eprintln!("error: {store_err}");
    return ExitCode::from(EXIT_USER_ERROR);
  }
  eprintln!("error: {err:#}");
  ExitCode::FAILURE
}
