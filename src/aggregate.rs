// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold work items into per-engineer totals, per-state counts and task summaries; attach category roll-ups
// role: domain/aggregation
// inputs: WorkItem list in fetch order; CategoryMap
// outputs: Aggregation (total, engineer_metrics); category summaries
// invariants:
// - total_items == number of input items == sum of engineer totals
// - blank or missing assignee counts under UNASSIGNED
// - task summaries keep fetch order; duplicate ids are counted twice
// - pure fold; no clock or I/O
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::category::CategoryMap;
use crate::model::{CategoryCount, EngineerMetrics, TaskSummary, WorkItem, UNASSIGNED};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
  pub total_items: u64,
  pub engineer_metrics: BTreeMap<String, EngineerMetrics>,
}

pub fn aggregate(items: &[WorkItem]) -> Aggregation {
  let mut out = Aggregation::default();
  let mut seen: HashSet<i64> = HashSet::with_capacity(items.len());

  for item in items {
    if !seen.insert(item.id) {
      debug!(id = item.id, "duplicate work item id; counting again");
    }

    let who = item
      .assignee
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .unwrap_or(UNASSIGNED);

    let m = out.engineer_metrics.entry(who.to_string()).or_default();
    m.total_items += 1;
    *m.states.entry(item.state.clone()).or_insert(0) += 1;
    m.tasks.push(TaskSummary {
      title: item.title.clone(),
      state: item.state.clone(),
      tags: item.tags.clone(),
    });
    out.total_items += 1;
  }

  out
}

/// Fill each engineer's `categories` and return the project-wide summary.
pub fn apply_categories(metrics: &mut BTreeMap<String, EngineerMetrics>, map: &CategoryMap) -> Vec<CategoryCount> {
  let mut project_states: BTreeMap<String, u64> = BTreeMap::new();

  for m in metrics.values_mut() {
    m.categories = map.rollup_by_count(&m.states);
    for (state, n) in &m.states {
      *project_states.entry(state.clone()).or_insert(0) += n;
    }
  }

  map.rollup(&project_states)
}
