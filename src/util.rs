// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, "today" resolution, snapshot naming and man page rendering
// role: utilities/helpers
// inputs: Paths; optional date override and timezone; clap CommandFactory
// outputs: Canonicalized paths, effective today, directories ensured, file names, man page text
// side_effects: prepare_out_dir creates directories
// invariants:
// - effective_today ignores the clock when an override is given
// - snapshot_file_name pattern is stable and locale-independent
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Calendar date of `now` in `tz` (local zone when unset).
pub fn date_in_tz(now: DateTime<Utc>, tz: Option<Tz>) -> NaiveDate {
  match tz {
    Some(zone) => zone.from_utc_datetime(&now.naive_utc()).date_naive(),
    None => Local.from_utc_datetime(&now.naive_utc()).date_naive(),
  }
}

/// The run's "today": the override when given, otherwise the clock in `tz`.
pub fn effective_today(override_today: Option<NaiveDate>, tz: Option<Tz>) -> NaiveDate {
  override_today.unwrap_or_else(|| date_in_tz(Utc::now(), tz))
}

/// Parse a hidden `--today` value.
pub fn parse_today(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid --today '{}': expected YYYY-MM-DD", raw))
}

/// Ensure `out` exists as a directory and return its absolute path.
pub fn prepare_out_dir(out: &str) -> Result<String> {
  std::fs::create_dir_all(out).with_context(|| format!("creating output directory {}", out))?;
  Ok(canonicalize_lossy(out))
}

pub fn snapshot_file_name(now: DateTime<Local>) -> String {
  format!("sprint_count_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
