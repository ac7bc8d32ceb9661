// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run resolve -> query -> aggregate per project and assemble the run snapshot; write or print it
// role: processing/orchestrator
// inputs: ReportConfig, TrackerApi, today, EffectiveConfig (out, parallel)
// outputs: RunSnapshot; stdout JSON (snapshot or pointer {dir, file}); snapshot file on disk
// side_effects: Creates the output directory; writes JSON files; prints to stdout
// invariants:
// - Every selected project appears in the snapshot, completed or failed
// - Output ordering is by project key regardless of --parallel
// - A failed project never carries partial counts
// errors: Propagates write errors with file path context; tracker errors become failed outcomes
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, SecondsFormat};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, apply_categories};
use crate::cadence::trailing_fortnight;
use crate::cli::EffectiveConfig;
use crate::config::ReportConfig;
use crate::model::{Project, ProjectOutcome, ProjectResult, RunSnapshot};
use crate::query::fetch_work_items;
use crate::resolver::{overall_period, resolve_current};
use crate::snapshot::write_snapshot;
use crate::tracker::TrackerApi;
use crate::util;

pub struct RunContext<'a> {
  pub config: &'a ReportConfig,
  pub tracker: &'a dyn TrackerApi,
  pub today: NaiveDate,
  pub parallel: bool,
  /// Single run timestamp: `generated_at` and the snapshot file name both derive from it.
  pub started: DateTime<Local>,
}

pub fn run_project(ctx: &RunContext<'_>, project: &Project) -> ProjectOutcome {
  let period = resolve_current(project, ctx.tracker, ctx.today);

  match fetch_work_items(ctx.tracker, project, &period, ctx.config.batch_size) {
    Ok(fetched) => {
      debug!(project = %project.key(), attempted = ?fetched.attempted, scope = ?fetched.scope, "work items fetched");
      let mut agg = aggregate(&fetched.items);
      let category_summary = apply_categories(&mut agg.engineer_metrics, &ctx.config.categories);
      ProjectOutcome::Completed(ProjectResult {
        total_items: agg.total_items,
        engineer_metrics: agg.engineer_metrics,
        sprint_period: period,
        category_summary,
        query_scope: fetched.scope,
      })
    }
    Err(e) => {
      warn!(project = %project.key(), error = %e, "work-item query failed; marking project failed");
      ProjectOutcome::Failed {
        error: e.to_string(),
        sprint_period: period,
      }
    }
  }
}

pub fn run_report(ctx: &RunContext<'_>) -> RunSnapshot {
  let projects = &ctx.config.projects;

  let outcomes: BTreeMap<String, ProjectOutcome> = if ctx.parallel {
    projects.par_iter().map(|p| (p.key(), run_project(ctx, p))).collect()
  } else {
    projects.iter().map(|p| (p.key(), run_project(ctx, p))).collect()
  };

  let fallback = ctx.config.default_period.unwrap_or_else(|| trailing_fortnight(ctx.today));
  let overall = overall_period(outcomes.values().map(|o| o.sprint_period()), fallback);

  RunSnapshot {
    generated_at: ctx.started.to_rfc3339_opts(SecondsFormat::Secs, true),
    today: ctx.today,
    overall_period: overall,
    projects: outcomes,
  }
}

fn log_summary(snapshot: &RunSnapshot) {
  let mut total = 0u64;
  let mut failed = 0usize;

  for (key, outcome) in &snapshot.projects {
    match outcome {
      ProjectOutcome::Completed(r) => {
        total += r.total_items;
        let top = r.category_summary.iter().max_by_key(|c| c.count).map(|c| c.category.as_str());
        info!(project = %key, items = r.total_items, engineers = r.engineer_metrics.len(), scope = ?r.query_scope, top_category = ?top, "project summary");
      }
      ProjectOutcome::Failed { error, .. } => {
        failed += 1;
        warn!(project = %key, %error, "project failed");
      }
    }
  }

  info!(
    projects = snapshot.projects.len(),
    failed,
    total_items = total,
    start = %snapshot.overall_period.window.start,
    end = %snapshot.overall_period.window.end,
    "run complete"
  );
}

/// Run the report and emit it per `--out`: "-" prints the snapshot, anything else is a directory.
pub fn execute(cfg: &EffectiveConfig, config: &ReportConfig, tracker: &dyn TrackerApi, today: NaiveDate) -> Result<()> {
  let ctx = RunContext {
    config,
    tracker,
    today,
    parallel: cfg.parallel,
    started: Local::now(),
  };
  let snapshot = run_report(&ctx);
  log_summary(&snapshot);

  if cfg.out == "-" {
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    return Ok(());
  }

  let dir = util::prepare_out_dir(&cfg.out)?;
  let path = write_snapshot(&dir, &snapshot, ctx.started)?;
  let file = path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
  info!(path = %path.display(), "snapshot written");

  let pointer = serde_json::json!({ "dir": dir, "file": file });
  println!("{}", serde_json::to_string_pretty(&pointer)?);
  Ok(())
}
