// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build WIQL for a sprint period and relax its scope (exact -> under -> date) until items appear
// role: domain/query
// inputs: Project (tags), SprintPeriod, TrackerApi, batch size
// outputs: FetchOutcome (items in fetch order, winning QueryScope, attempted scopes)
// invariants:
// - First non-empty id list short-circuits escalation
// - PathNotFound skips the remaining path variants
// - A non-path error on the first attempt is returned; later errors only log
// - Batches never exceed MAX_BATCH ids; a failed batch is dropped, the rest are kept
// - Every batch failing is a hard failure, never an empty result
// errors: TrackerError for the first-attempt hard failure and when no batch could be read
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::model::{DateWindow, Project, QueryScope, SprintPeriod, WorkItem};
use crate::tracker::{TrackerApi, MAX_BATCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
  Exact(String),
  Under(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemQuery {
  pub path: Option<PathFilter>,
  pub window: Option<DateWindow>,
  pub tags: Vec<String>,
}

fn quote(s: &str) -> String {
  format!("'{}'", s.replace('\'', "''"))
}

impl WorkItemQuery {
  pub fn to_wiql(&self) -> String {
    let mut clauses = vec!["[System.TeamProject] = @project".to_string()];

    match &self.path {
      Some(PathFilter::Exact(p)) => clauses.push(format!("[System.IterationPath] = {}", quote(p))),
      Some(PathFilter::Under(p)) => clauses.push(format!("[System.IterationPath] UNDER {}", quote(p))),
      None => {}
    }

    if let Some(w) = self.window {
      clauses.push(format!("[System.ChangedDate] >= '{}'", w.start.format("%Y-%m-%d")));
      clauses.push(format!("[System.ChangedDate] <= '{}'", w.end.format("%Y-%m-%d")));
    }

    let tags: Vec<String> = self
      .tags
      .iter()
      .map(|t| t.trim())
      .filter(|t| !t.is_empty())
      .map(|t| format!("[System.Tags] CONTAINS WORDS {}", quote(t)))
      .collect();
    if !tags.is_empty() {
      clauses.push(format!("({})", tags.join(" OR ")));
    }

    format!("SELECT [System.Id] FROM WorkItems WHERE {}", clauses.join(" AND "))
  }
}

/// Parent node of `path`; a single-segment path is its own parent.
fn parent_path<'a>(path: &'a str, sep: &str) -> &'a str {
  if sep.is_empty() {
    return path;
  }
  match path.trim_end_matches(sep).rsplit_once(sep) {
    Some((parent, _leaf)) if !parent.is_empty() => parent,
    _ => path,
  }
}

/// Scope variants to try for a period, strictest first.
/// The under-path variant searches the parent node so a drifted leaf name still matches.
pub fn plan_scopes(period: &SprintPeriod, tags: &[String], sep: &str) -> Vec<(QueryScope, WorkItemQuery)> {
  let window = period.window();
  let path = period.iteration_path.as_deref().filter(|p| !p.trim().is_empty());
  let q = |path: Option<PathFilter>, window: Option<DateWindow>| WorkItemQuery {
    path,
    window,
    tags: tags.to_vec(),
  };

  let mut plan = Vec::new();
  if let Some(p) = path {
    plan.push((QueryScope::Exact, q(Some(PathFilter::Exact(p.to_string())), window)));
    plan.push((QueryScope::Under, q(Some(PathFilter::Under(parent_path(p, sep).to_string())), None)));
  }
  if window.is_some() {
    plan.push((QueryScope::Date, q(None, window)));
  }
  plan
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
  pub items: Vec<WorkItem>,
  pub scope: QueryScope,
  pub attempted: Vec<QueryScope>,
}

pub fn fetch_work_items(
  tracker: &dyn TrackerApi,
  project: &Project,
  period: &SprintPeriod,
  batch_size: usize,
) -> Result<FetchOutcome, TrackerError> {
  let key = project.key();
  let plan = plan_scopes(period, &project.tags, &project.path_separator);
  if plan.is_empty() {
    warn!(project = %key, "no iteration path and no dates; nothing to query");
  }

  let mut attempted = Vec::new();
  let mut skip_paths = false;

  for (scope, query) in plan {
    if skip_paths && query.path.is_some() {
      continue;
    }
    let first = attempted.is_empty();
    attempted.push(scope);

    let wiql = query.to_wiql();
    debug!(project = %key, ?scope, %wiql, "running work-item query");

    match tracker.run_query(&project.organization, &project.id, &wiql) {
      Ok(ids) if ids.is_empty() => {
        debug!(project = %key, ?scope, "query returned no items; relaxing scope");
      }
      Ok(ids) => {
        info!(project = %key, ?scope, count = ids.len(), "work items found");
        let items = fetch_in_batches(tracker, project, &ids, batch_size)?;
        return Ok(FetchOutcome { items, scope, attempted });
      }
      Err(e) if e.is_path_not_found() => {
        warn!(project = %key, ?scope, error = %e, "iteration path missing in tracker; skipping to date range");
        skip_paths = true;
      }
      Err(e) if first => return Err(e),
      Err(e) => {
        warn!(project = %key, ?scope, error = %e, "query failed; relaxing scope");
      }
    }
  }

  Ok(FetchOutcome {
    items: Vec::new(),
    scope: QueryScope::None,
    attempted,
  })
}

/// Fetch `ids` in capped batches. A failed batch is dropped; if every batch fails the last error is returned.
fn fetch_in_batches(
  tracker: &dyn TrackerApi,
  project: &Project,
  ids: &[i64],
  batch_size: usize,
) -> Result<Vec<WorkItem>, TrackerError> {
  let size = batch_size.clamp(1, MAX_BATCH);
  let mut items = Vec::with_capacity(ids.len());
  let mut succeeded = 0usize;
  let mut last_error = None;

  for (n, chunk) in ids.chunks(size).enumerate() {
    match tracker.fetch_items(&project.organization, &project.id, chunk) {
      Ok(batch) => {
        succeeded += 1;
        items.extend(batch);
      }
      Err(e) => {
        warn!(project = %project.key(), batch = n, size = chunk.len(), error = %e, "work-item batch failed; omitting");
        last_error = Some(e);
      }
    }
  }

  match last_error {
    Some(e) if succeeded == 0 => Err(e),
    _ => Ok(items),
  }
}
