// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Offline sprint windows from an anchor-based cadence; calendar date parsing for config values
// role: domain/calendar
// inputs: Cadence (anchor date, anchor number, weeks, name prefix), today
// outputs: CadenceWindow (inclusive window, sequence number, iteration name)
// invariants:
// - period index is clamped to 0 when today precedes the anchor
// - window length is exactly weeks * 7 days; end is inclusive
// - pure; no clock access
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{Duration, NaiveDate};

use crate::model::{Cadence, DateWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceWindow {
  pub window: DateWindow,
  pub period_index: i64,
  pub sequence_number: i64,
  pub name: String,
}

pub fn compute_current_window(cadence: &Cadence, today: NaiveDate) -> CadenceWindow {
  let duration_days = i64::from(cadence.weeks.get()) * 7;
  let elapsed = (today - cadence.anchor_date).num_days();
  let period_index = if elapsed < 0 { 0 } else { elapsed / duration_days };

  let start = cadence.anchor_date + Duration::days(period_index * duration_days);
  let end = start + Duration::days(duration_days - 1);
  let sequence_number = cadence.anchor_number + period_index;

  CadenceWindow {
    window: DateWindow { start, end },
    period_index,
    sequence_number,
    name: format!("{}{}", cadence.name_prefix, sequence_number),
  }
}

/// Parse a configuration date. Accepts `2025-08-19` and `19-Aug-2025`.
pub fn parse_config_date(raw: &str) -> Option<NaiveDate> {
  let s = raw.trim();
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| NaiveDate::parse_from_str(s, "%d-%b-%Y").ok())
}

/// Parse the date part of a tracker timestamp such as `2025-08-19T00:00:00Z`.
pub fn parse_tracker_date(raw: &str) -> Option<NaiveDate> {
  let day = raw.trim().get(..10)?;
  NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Two-week window ending today; used when nothing better is configured.
pub fn trailing_fortnight(today: NaiveDate) -> DateWindow {
  DateWindow {
    start: today - Duration::days(13),
    end: today,
  }
}
