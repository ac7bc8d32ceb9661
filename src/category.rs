// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map raw tracker states onto a small ordered set of report categories
// role: domain/categorization
// inputs: raw state strings; ordered CategoryMap from configuration
// outputs: category names; ordered category roll-ups
// invariants:
// - First matching category in map order wins (exact, case-sensitive)
// - Unmatched states map to OTHER_CATEGORY
// - Pure; no side effects
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::CategoryCount;

pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub name: String,
  #[serde(default)]
  pub states: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
  categories: Vec<Category>,
}

impl CategoryMap {
  pub fn new(categories: Vec<Category>) -> Self {
    Self { categories }
  }

  pub fn categorize(&self, raw_state: &str) -> &str {
    self
      .categories
      .iter()
      .find(|c| c.states.iter().any(|s| s == raw_state))
      .map(|c| c.name.as_str())
      .unwrap_or(OTHER_CATEGORY)
  }

  /// States listed under more than one category, in the order the repeat is found.
  pub fn overlapping_states(&self) -> Vec<String> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();

    for c in &self.categories {
      let local: BTreeSet<&str> = c.states.iter().map(|s| s.as_str()).collect();
      for s in local {
        let n = seen.entry(s).or_insert(0);
        *n += 1;
        if *n == 2 {
          order.push(s);
        }
      }
    }

    order.into_iter().map(|s| s.to_string()).collect()
  }

  fn rank(&self, category: &str) -> usize {
    self
      .categories
      .iter()
      .position(|c| c.name == category)
      .unwrap_or(self.categories.len())
  }

  /// Fold raw state counts into category counts, in map order with `Other` last.
  /// Zero counts are omitted.
  pub fn rollup<'a, I>(&self, states: I) -> Vec<CategoryCount>
  where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
  {
    let mut acc: BTreeMap<&str, u64> = BTreeMap::new();
    for (state, count) in states {
      *acc.entry(categorize(state, self)).or_insert(0) += *count;
    }

    let mut out: Vec<CategoryCount> = acc
      .into_iter()
      .filter(|(_, n)| *n > 0)
      .map(|(category, count)| CategoryCount {
        category: category.to_string(),
        count,
      })
      .collect();
    out.sort_by_key(|c| self.rank(&c.category));
    out
  }

  /// Same as `rollup`, ordered by count descending; ties keep map order.
  pub fn rollup_by_count<'a, I>(&self, states: I) -> Vec<CategoryCount>
  where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
  {
    let mut out = self.rollup(states);
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
  }
}

impl Default for CategoryMap {
  fn default() -> Self {
    let cat = |name: &str, states: &[&str]| Category {
      name: name.to_string(),
      states: states.iter().map(|s| s.to_string()).collect(),
    };

    Self::new(vec![
      cat("To-Do", &["Open", "TO DO", "New", "REQ-Review"]),
      cat("In Progress", &["In Progress", "Code Review"]),
      cat("In QA", &["On-QA", "Fixed"]),
      cat("Release Pending", &["QA Reviewed", "SIGNOFF"]),
      cat("Released", &["DONE", "Done", "Closed", "Resolved", "Completed"]),
      cat("Drop", &["Drop"]),
    ])
  }
}

pub fn categorize<'m>(raw_state: &str, map: &'m CategoryMap) -> &'m str {
  map.categorize(raw_state)
}
