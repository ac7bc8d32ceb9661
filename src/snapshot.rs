// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Persist, reload and validate run snapshots (project key -> outcome)
// role: persistence/snapshot
// inputs: RunSnapshot, output directory, run timestamp; snapshot files on disk
// outputs: sprint_count_<YYYYMMDD_HHMMSS>.json; validation problems
// side_effects: Writes to filesystem
// invariants:
// - Written snapshots reload into an equal RunSnapshot
// - Completed entries satisfy total_items == sum of engineer totals
// - Files conform to schemas/snapshot.schema.json
// errors: IO and parse errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::{ProjectOutcome, RunSnapshot};
use crate::util;

const SNAPSHOT_SCHEMA: &str = include_str!("../schemas/snapshot.schema.json");

pub fn write_snapshot(dir: &str, snapshot: &RunSnapshot, now: DateTime<Local>) -> Result<PathBuf> {
  let path = Path::new(dir).join(util::snapshot_file_name(now));
  let body = serde_json::to_vec_pretty(snapshot)?;
  std::fs::write(&path, body).with_context(|| format!("writing snapshot {}", path.display()))?;
  Ok(path)
}

/// Schema violations plus count consistency problems; empty when valid.
pub fn validate_snapshot(value: &serde_json::Value) -> Result<Vec<String>> {
  let schema: serde_json::Value = serde_json::from_str(SNAPSHOT_SCHEMA)?;
  let validator = jsonschema::validator_for(&schema).map_err(|e| anyhow!("compiling snapshot schema: {e}"))?;

  let mut problems: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
  if !problems.is_empty() {
    return Ok(problems);
  }

  let snapshot: RunSnapshot = serde_json::from_value(value.clone())?;
  for (key, outcome) in &snapshot.projects {
    if let ProjectOutcome::Completed(r) = outcome {
      let sum: u64 = r.engineer_metrics.values().map(|m| m.total_items).sum();
      if sum != r.total_items {
        problems.push(format!("{key}: total_items {} != sum of engineer totals {}", r.total_items, sum));
      }
      for (who, m) in &r.engineer_metrics {
        let by_state: u64 = m.states.values().sum();
        if by_state != m.total_items {
          problems.push(format!("{key}/{who}: total_items {} != sum of state counts {}", m.total_items, by_state));
        }
      }
    }
  }
  Ok(problems)
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
  pub file: String,
  pub projects: usize,
  pub failed_projects: usize,
  pub problems: Vec<String>,
}

pub fn check_snapshot_file(path: &Path) -> Result<CheckReport> {
  let data = std::fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
  let value: serde_json::Value =
    serde_json::from_slice(&data).with_context(|| format!("parsing snapshot {}", path.display()))?;
  let problems = validate_snapshot(&value)?;

  let projects = value.get("projects").and_then(|p| p.as_object());
  let failed_projects = projects
    .map(|m| m.values().filter(|o| o.get("status").and_then(|s| s.as_str()) == Some("failed")).count())
    .unwrap_or(0);

  Ok(CheckReport {
    file: util::canonicalize_lossy(path),
    projects: projects.map(|m| m.len()).unwrap_or(0),
    failed_projects,
    problems,
  })
}
