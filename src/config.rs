// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load the YAML configuration store (organizations, projects, categories) into an immutable ReportConfig
// role: configuration/store
// inputs: YAML file path or text; optional organization override; CLI project filters
// outputs: ReportConfig (selected projects, CategoryMap, default period, timezone, batch size)
// side_effects: Reads the config file; logs warnings for overlapping categories and clamped batch sizes
// invariants:
// - Every cadence has weeks > 0 and a valid anchor date
// - At least one project is selected
// - batch_size is within 1..=MAX_BATCH
// errors: ConfigError; all fatal before any tracker call
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::num::NonZeroU32;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::cadence::parse_config_date;
use crate::category::{Category, CategoryMap};
use crate::error::ConfigError;
use crate::model::{Cadence, DateWindow, Project};
use crate::tracker::MAX_BATCH;

#[derive(Debug, Deserialize)]
struct RawConfig {
  #[serde(default)]
  organizations: Vec<RawOrganization>,
  #[serde(default)]
  categories: Option<Vec<Category>>,
  #[serde(default)]
  default_period: Option<RawPeriod>,
  #[serde(default)]
  timezone: Option<String>,
  #[serde(default = "default_batch_size")]
  batch_size: usize,
  #[serde(default)]
  include_projects: Vec<String>,
  #[serde(default)]
  exclude_projects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawOrganization {
  #[serde(default)]
  name: String,
  #[serde(default = "default_separator")]
  path_separator: String,
  #[serde(default)]
  projects: Vec<RawProject>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
  id: String,
  #[serde(default)]
  display_name: Option<String>,
  #[serde(default)]
  team: Option<String>,
  #[serde(default)]
  tags: Vec<String>,
  #[serde(default)]
  iteration_path: Option<String>,
  #[serde(default)]
  cadence: Option<RawCadence>,
}

#[derive(Debug, Deserialize)]
struct RawCadence {
  anchor_date: String,
  #[serde(default = "default_anchor_number")]
  anchor_number: i64,
  weeks: u32,
  #[serde(default = "default_name_prefix")]
  name_prefix: String,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
  start_date: String,
  end_date: String,
}

fn default_batch_size() -> usize {
  MAX_BATCH
}

fn default_separator() -> String {
  "\\".to_string()
}

fn default_anchor_number() -> i64 {
  1
}

fn default_name_prefix() -> String {
  "Sprint ".to_string()
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
  pub projects: Vec<Project>,
  pub categories: CategoryMap,
  pub default_period: Option<DateWindow>,
  pub timezone: Option<chrono_tz::Tz>,
  pub batch_size: usize,
}

pub fn load_config(path: &Path, org_override: Option<&str>, selected: &[String]) -> Result<ReportConfig, ConfigError> {
  let label = path.display().to_string();
  let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: label.clone(), source })?;
  parse_config(&raw, &label, org_override, selected)
}

pub fn parse_config(
  text: &str,
  label: &str,
  org_override: Option<&str>,
  selected: &[String],
) -> Result<ReportConfig, ConfigError> {
  let raw: RawConfig = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
    path: label.to_string(),
    source,
  })?;

  let mut projects = Vec::new();
  for (idx, org) in raw.organizations.iter().enumerate() {
    let name = match (org.name.trim(), org_override.map(str::trim)) {
      ("", Some(o)) if !o.is_empty() => o.to_string(),
      ("", _) => return Err(ConfigError::MissingOrganization(idx)),
      (n, _) => n.to_string(),
    };
    let sep = if org.path_separator.is_empty() { default_separator() } else { org.path_separator.clone() };

    for p in &org.projects {
      projects.push(build_project(&name, &sep, p)?);
    }
  }

  let projects = select_projects(projects, &raw.include_projects, &raw.exclude_projects, selected);
  if projects.is_empty() {
    return Err(ConfigError::NoProjects);
  }

  let categories = raw.categories.map(CategoryMap::new).unwrap_or_default();
  let overlap = categories.overlapping_states();
  if !overlap.is_empty() {
    warn!(states = ?overlap, "states listed under several categories; first category in file order wins");
  }

  let default_period = raw.default_period.as_ref().map(parse_period).transpose()?;

  let timezone = raw
    .timezone
    .as_deref()
    .map(|tz| tz.trim().parse::<chrono_tz::Tz>().map_err(|_| ConfigError::UnknownTimezone(tz.to_string())))
    .transpose()?;

  let batch_size = raw.batch_size.clamp(1, MAX_BATCH);
  if batch_size != raw.batch_size {
    warn!(requested = raw.batch_size, used = batch_size, "batch_size clamped");
  }

  info!(config = label, projects = projects.len(), "configuration loaded");

  Ok(ReportConfig {
    projects,
    categories,
    default_period,
    timezone,
    batch_size,
  })
}

fn build_project(org: &str, sep: &str, p: &RawProject) -> Result<Project, ConfigError> {
  let cadence = p
    .cadence
    .as_ref()
    .map(|c| {
      let weeks = NonZeroU32::new(c.weeks).ok_or_else(|| ConfigError::InvalidCadence {
        project: p.id.clone(),
        reason: "weeks must be greater than zero".into(),
      })?;
      let anchor_date = parse_config_date(&c.anchor_date).ok_or_else(|| ConfigError::InvalidDate {
        field: format!("{}.cadence.anchor_date", p.id),
        value: c.anchor_date.clone(),
      })?;
      Ok::<_, ConfigError>(Cadence {
        anchor_date,
        anchor_number: c.anchor_number,
        weeks,
        name_prefix: c.name_prefix.clone(),
      })
    })
    .transpose()?;

  Ok(Project {
    organization: org.to_string(),
    id: p.id.clone(),
    display_name: p.display_name.clone().unwrap_or_else(|| p.id.clone()),
    team: p.team.clone().filter(|t| !t.trim().is_empty()),
    tags: p.tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
    iteration_path: p.iteration_path.clone().filter(|s| !s.trim().is_empty()),
    cadence,
    path_separator: sep.to_string(),
  })
}

fn parse_period(raw: &RawPeriod) -> Result<DateWindow, ConfigError> {
  let date = |field: &str, value: &str| {
    parse_config_date(value).ok_or_else(|| ConfigError::InvalidDate {
      field: format!("default_period.{field}"),
      value: value.to_string(),
    })
  };
  let start = date("start_date", &raw.start_date)?;
  let end = date("end_date", &raw.end_date)?;

  DateWindow::new(start, end).ok_or_else(|| ConfigError::InvalidDate {
    field: "default_period".into(),
    value: format!("{} > {}", raw.start_date, raw.end_date),
  })
}

/// A filter entry names a project by report key (`org_project`) or bare id.
fn names_project(project: &Project, entries: &[String]) -> bool {
  entries.iter().any(|e| *e == project.id || *e == project.key())
}

fn select_projects(projects: Vec<Project>, include: &[String], exclude: &[String], cli: &[String]) -> Vec<Project> {
  projects
    .into_iter()
    .filter(|p| include.is_empty() || names_project(p, include))
    .filter(|p| !names_project(p, exclude))
    .filter(|p| cli.is_empty() || names_project(p, cli))
    .collect()
}
