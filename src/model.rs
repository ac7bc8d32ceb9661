// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the sprint/work-item model shared by resolution, querying, aggregation and the snapshot
// role: model/types
// outputs: Serializable structs with stable field names; dates serialize as YYYY-MM-DD
// invariants:
// - DateWindow start <= end (enforced by DateWindow::new)
// - SprintPeriod carries both dates or neither
// - Unresolved periods never carry dates
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Assignee bucket for work items with nobody assigned.
pub const UNASSIGNED: &str = "Unassigned";

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
  #[serde(rename = "start_date")]
  pub start: NaiveDate,
  #[serde(rename = "end_date")]
  pub end: NaiveDate,
}

impl DateWindow {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
    (start <= end).then_some(Self { start, end })
  }

  pub fn contains(&self, day: NaiveDate) -> bool {
    self.start <= day && day <= self.end
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
  pub anchor_date: NaiveDate,
  pub anchor_number: i64,
  pub weeks: NonZeroU32,
  pub name_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
  pub organization: String,
  pub id: String,
  pub display_name: String,
  pub team: Option<String>,
  /// Empty means no tag filtering.
  pub tags: Vec<String>,
  pub iteration_path: Option<String>,
  pub cadence: Option<Cadence>,
  pub path_separator: String,
}

impl Project {
  /// Stable report key: `<organization>_<project id>`.
  pub fn key(&self) -> String {
    format!("{}_{}", self.organization, self.id)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iteration {
  pub id: Option<String>,
  pub name: String,
  pub path: String,
  pub window: Option<DateWindow>,
  pub synthesized: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
  Authoritative,
  Synthesized,
  Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintPeriod {
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  pub iteration_name: Option<String>,
  pub iteration_path: Option<String>,
  pub provenance: Provenance,
}

impl SprintPeriod {
  pub fn from_iteration(iteration: &Iteration) -> Self {
    let provenance = if iteration.synthesized {
      Provenance::Synthesized
    } else {
      Provenance::Authoritative
    };

    Self {
      start_date: iteration.window.map(|w| w.start),
      end_date: iteration.window.map(|w| w.end),
      iteration_name: Some(iteration.name.clone()),
      iteration_path: Some(iteration.path.clone()).filter(|p| !p.is_empty()),
      provenance,
    }
  }

  pub fn unresolved(iteration_path: Option<String>) -> Self {
    Self {
      start_date: None,
      end_date: None,
      iteration_name: None,
      iteration_path,
      provenance: Provenance::Unresolved,
    }
  }

  pub fn window(&self) -> Option<DateWindow> {
    match (self.start_date, self.end_date) {
      (Some(s), Some(e)) => DateWindow::new(s, e),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
  pub id: i64,
  pub assignee: Option<String>,
  pub state: String,
  pub title: String,
  pub tags: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
  pub title: String,
  pub state: String,
  pub tags: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
  pub category: String,
  pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineerMetrics {
  pub total_items: u64,
  pub states: BTreeMap<String, u64>,
  pub tasks: Vec<TaskSummary>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub categories: Vec<CategoryCount>,
}

/// Which escalation scope produced a project's work items.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryScope {
  Exact,
  Under,
  Date,
  None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResult {
  pub total_items: u64,
  pub engineer_metrics: BTreeMap<String, EngineerMetrics>,
  pub sprint_period: SprintPeriod,
  #[serde(default)]
  pub category_summary: Vec<CategoryCount>,
  pub query_scope: QueryScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectOutcome {
  Completed(ProjectResult),
  Failed { error: String, sprint_period: SprintPeriod },
}

impl ProjectOutcome {
  pub fn sprint_period(&self) -> &SprintPeriod {
    match self {
      ProjectOutcome::Completed(r) => &r.sprint_period,
      ProjectOutcome::Failed { sprint_period, .. } => sprint_period,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSource {
  Derived,
  Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallPeriod {
  #[serde(flatten)]
  pub window: DateWindow,
  pub source: PeriodSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
  pub generated_at: String,
  pub today: NaiveDate,
  pub overall_period: OverallPeriod,
  pub projects: BTreeMap<String, ProjectOutcome>,
}
