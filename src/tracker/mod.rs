// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Tracker API seam (teams, iterations, WIQL, work-item batches) and payload parsing shared by backends
// role: integration/tracker
// inputs: organization, project, team id, WIQL text, work-item ids
// outputs: Team, Iteration, work-item ids, WorkItem
// invariants:
// - Backends are Send + Sync so projects can be processed on a rayon pool
// - Parsers skip malformed entries instead of failing the whole payload
// - fetch_items is never called with more than MAX_BATCH ids
// errors: TrackerError; callers decide whether to degrade or fail
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod azure;
pub mod env;

use crate::cadence::parse_tracker_date;
use crate::error::TrackerError;
use crate::ext::serde_json::JsonFetch;
use crate::model::{DateWindow, Iteration, WorkItem};

/// Per-request id ceiling for work-item batch reads.
pub const MAX_BATCH: usize = 200;

pub const WORK_ITEM_FIELDS: &[&str] = &[
  "System.Id",
  "System.AssignedTo",
  "System.State",
  "System.Tags",
  "System.Title",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
  pub id: String,
  pub name: String,
}

pub trait TrackerApi: Send + Sync {
  fn list_teams(&self, org: &str, project: &str) -> Result<Vec<Team>, TrackerError>;
  fn list_iterations(&self, org: &str, project: &str, team_id: &str) -> Result<Vec<Iteration>, TrackerError>;
  fn run_query(&self, org: &str, project: &str, wiql: &str) -> Result<Vec<i64>, TrackerError>;
  fn fetch_items(&self, org: &str, project: &str, ids: &[i64]) -> Result<Vec<WorkItem>, TrackerError>;
}

/// Env-backed tracker when `SAR_TEST_*` fixtures are present, HTTP otherwise.
pub fn make_default_api(base_url: &str, pat: &str) -> Box<dyn TrackerApi> {
  if env::env_wants_mock() {
    tracing::debug!("using env-backed tracker");
    return Box::new(env::TrackerEnvApi);
  }
  Box::new(azure::AzureDevOpsApi::new(base_url, pat))
}

fn expect_array<'a>(v: &'a serde_json::Value, key: &str) -> Result<&'a [serde_json::Value], TrackerError> {
  v.fetch(key)
    .value()
    .and_then(|x| x.as_array())
    .map(|a| a.as_slice())
    .ok_or_else(|| TrackerError::Payload(format!("missing '{key}' array")))
}

pub fn parse_teams(v: &serde_json::Value) -> Result<Vec<Team>, TrackerError> {
  let teams = expect_array(v, "value")?
    .iter()
    .filter_map(|t| {
      let id = t.fetch("id").as_str()?.to_string();
      let name = t.fetch("name").as_str().unwrap_or_default().to_string();
      Some(Team { id, name })
    })
    .collect();
  Ok(teams)
}

pub fn parse_iterations(v: &serde_json::Value) -> Result<Vec<Iteration>, TrackerError> {
  let iterations = expect_array(v, "value")?
    .iter()
    .filter_map(|it| {
      let name = it.fetch("name").as_str()?.to_string();
      let start = it.fetch("attributes/startDate").as_str().and_then(parse_tracker_date);
      let end = it.fetch("attributes/finishDate").as_str().and_then(parse_tracker_date);
      let window = match (start, end) {
        (Some(s), Some(e)) => DateWindow::new(s, e),
        _ => None,
      };

      Some(Iteration {
        id: it.fetch("id").as_str().map(|s| s.to_string()),
        path: it.fetch("path").as_str().unwrap_or(&name).to_string(),
        name,
        window,
        synthesized: false,
      })
    })
    .collect();
  Ok(iterations)
}

pub fn parse_query_ids(v: &serde_json::Value) -> Result<Vec<i64>, TrackerError> {
  let ids = expect_array(v, "workItems")?
    .iter()
    .filter_map(|w| w.fetch("id").to::<i64>())
    .collect();
  Ok(ids)
}

/// Resolve `System.AssignedTo`: identity object or legacy `"Name <email>"` string.
fn assignee_name(item: &serde_json::Value) -> Option<String> {
  let node = item.fetch("fields/System.AssignedTo");

  if let Some(name) = item.fetch("fields/System.AssignedTo/displayName").as_str() {
    return Some(name.to_string());
  }

  node.as_str().map(|raw| match raw.split_once(" <") {
    Some((name, _)) => name.trim().to_string(),
    None => raw.trim().to_string(),
  })
}

pub fn parse_work_items(v: &serde_json::Value) -> Result<Vec<WorkItem>, TrackerError> {
  let items = expect_array(v, "value")?
    .iter()
    // errorPolicy=omit yields nulls for deleted/inaccessible ids
    .filter(|w| !w.is_null())
    .filter_map(|w| {
      let id = w.fetch("id").to::<i64>()?;
      Some(WorkItem {
        id,
        assignee: assignee_name(w),
        state: w.fetch("fields/System.State").as_str().unwrap_or("Unknown").to_string(),
        title: w.fetch("fields/System.Title").as_str().unwrap_or("Untitled Task").to_string(),
        tags: w.fetch("fields/System.Tags").to_or_default::<String>(),
      })
    })
    .collect();
  Ok(items)
}
