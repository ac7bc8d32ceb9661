use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;

use crate::error::ConfigError;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "sprint-activity-report",
    version,
    about = "Resolve each project's current sprint and export per-engineer work-item activity as JSON",
    long_about = None
)]
pub struct Cli {
  /// YAML configuration (organizations, projects, categories)
  #[arg(long, env = "SPRINT_REPORT_CONFIG", default_value = "sprint-report.yaml")]
  pub config: PathBuf,

  /// Personal access token for the tracker
  #[arg(long, env = "AZURE_DEVOPS_PAT", hide_env_values = true)]
  pub pat: Option<String>,

  /// Organization name for entries left blank in the config file
  #[arg(long, env = "AZURE_DEVOPS_ORG")]
  pub org: Option<String>,

  /// Tracker base URL
  #[arg(long, env = "SPRINT_REPORT_BASE_URL", default_value = "https://dev.azure.com")]
  pub base_url: String,

  /// Output location:
  /// - "-" prints the snapshot JSON to stdout
  /// - anything else is a directory receiving sprint_count_<YYYYMMDD_HHMMSS>.json (pointer JSON printed)
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Only report on this project (`org_project` key or bare project id); repeatable
  #[arg(long = "project", value_name = "KEY")]
  pub projects: Vec<String>,

  /// Process projects concurrently (output order is unchanged)
  #[arg(long)]
  pub parallel: bool,

  /// Validate an existing snapshot file and exit
  #[arg(long, value_name = "FILE")]
  pub check_snapshot: Option<PathBuf>,

  /// Only log warnings and errors
  #[arg(long, short)]
  pub quiet: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override "today" as YYYY-MM-DD (hidden; tests only)
  #[arg(long, hide = true)]
  pub today: Option<String>,
}

/// Credential wrapper that never prints its value.
#[derive(Clone, Default)]
pub struct Secret(String);

impl Secret {
  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Debug for Secret {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Secret(***)")
  }
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  pub config: String, // absolute path for stable messages
  #[serde(skip)]
  pub pat: Secret,
  pub org: Option<String>,
  pub base_url: String,
  pub out: String,
  pub projects: Vec<String>,
  pub parallel: bool,
  pub check_snapshot: Option<String>,
  pub quiet: bool,
  pub today: Option<NaiveDate>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let pat = cli.pat.as_deref().map(str::trim).unwrap_or_default().to_string();

  // checking a snapshot never talks to the tracker
  if cli.check_snapshot.is_none() && pat.is_empty() {
    return Err(ConfigError::MissingCredential.into());
  }

  let base_url = cli.base_url.trim().trim_end_matches('/').to_string();
  if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
    bail!("--base-url must be an http(s) URL, got '{}'", cli.base_url);
  }

  let today = cli.today.as_deref().map(util::parse_today).transpose()?;

  Ok(EffectiveConfig {
    config: util::canonicalize_lossy(&cli.config),
    pat: Secret(pat),
    org: cli.org.map(|o| o.trim().to_string()).filter(|o| !o.is_empty()),
    base_url,
    out: cli.out,
    projects: cli.projects,
    parallel: cli.parallel,
    check_snapshot: cli.check_snapshot.as_deref().map(util::canonicalize_lossy),
    quiet: cli.quiet,
    today,
  })
}
