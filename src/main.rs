use std::path::Path;

use anyhow::{bail, Result};
use clap::Parser;

mod aggregate;
mod cadence;
mod category;
mod cli;
mod config;
mod error;
mod ext;
mod model;
mod orchestrator;
mod query;
mod resolver;
mod snapshot;
mod tracker;
mod util;

use crate::cli::{normalize, Cli};

fn init_tracing(quiet: bool) -> Result<()> {
  let level = if quiet { "warn" } else { "info" };

  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init()
    .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

  Ok(())
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing(cli.quiet)?;

  // Phase 1: normalize CLI (credential check happens here, before any network call)
  let cfg = normalize(cli)?;

  if let Some(file) = cfg.check_snapshot.as_deref() {
    let report = snapshot::check_snapshot_file(Path::new(file))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.problems.is_empty() {
      bail!("snapshot {} has {} problem(s)", report.file, report.problems.len());
    }
    return Ok(());
  }

  // Phase 2: load the configuration store and pin "today"
  let config = config::load_config(Path::new(&cfg.config), cfg.org.as_deref(), &cfg.projects)?;
  let today = util::effective_today(cfg.today, config.timezone);
  tracing::info!(%today, projects = config.projects.len(), parallel = cfg.parallel, "starting sprint report");

  // Phase 3: resolve, query and aggregate every project
  let tracker = tracker::make_default_api(&cfg.base_url, cfg.pat.expose());
  orchestrator::execute(&cfg, &config, tracker.as_ref(), today)
}
