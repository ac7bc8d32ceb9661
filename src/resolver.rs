// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve each project's current sprint period (tracker iterations, then cadence, then unresolved)
// role: domain/resolution
// inputs: Project, TrackerApi, today
// outputs: SprintPeriod (authoritative | synthesized | unresolved); OverallPeriod across projects
// invariants:
// - Never returns an error; tracker failures cascade to the next strategy
// - Containing iteration beats latest past, which beats earliest future
// - Overlapping containing iterations tie-break on the latest start date
// - Unresolved periods carry only the configured iteration path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::cadence::compute_current_window;
use crate::model::{DateWindow, Iteration, OverallPeriod, PeriodSource, Project, SprintPeriod};
use crate::tracker::{Team, TrackerApi};

type Strategy = fn(&Project, &dyn TrackerApi, NaiveDate) -> Option<SprintPeriod>;

/// Tried in order; first hit wins.
const STRATEGIES: &[(&str, Strategy)] = &[
  ("tracker", from_tracker as Strategy),
  ("cadence", from_cadence as Strategy),
];

pub fn resolve_current(project: &Project, tracker: &dyn TrackerApi, today: NaiveDate) -> SprintPeriod {
  STRATEGIES
    .iter()
    .find_map(|(name, strategy)| {
      let period = strategy(project, tracker, today)?;
      debug!(project = %project.key(), strategy = *name, iteration = ?period.iteration_name, "sprint period resolved");
      Some(period)
    })
    .unwrap_or_else(|| {
      warn!(project = %project.key(), "no sprint dates available; falling back to configured path only");
      SprintPeriod::unresolved(project.iteration_path.clone())
    })
}

fn find_team<'a>(teams: &'a [Team], wanted: Option<&str>, project: &Project) -> Option<&'a Team> {
  if let Some(name) = wanted {
    if let Some(t) = teams.iter().find(|t| t.name == name) {
      return Some(t);
    }
    warn!(project = %project.key(), team = name, "configured team not found; using first team");
  }
  teams.first()
}

fn from_tracker(project: &Project, tracker: &dyn TrackerApi, today: NaiveDate) -> Option<SprintPeriod> {
  let teams = tracker
    .list_teams(&project.organization, &project.id)
    .map_err(|e| warn!(project = %project.key(), error = %e, "team lookup failed"))
    .ok()?;
  let team = find_team(&teams, project.team.as_deref(), project)?;

  let iterations = tracker
    .list_iterations(&project.organization, &project.id, &team.id)
    .map_err(|e| warn!(project = %project.key(), team = %team.name, error = %e, "iteration lookup failed"))
    .ok()?;

  let chosen = select_iteration(&iterations, today)?;
  debug!(project = %project.key(), iteration_id = ?chosen.id, path = %chosen.path, "tracker iteration selected");
  Some(SprintPeriod::from_iteration(chosen))
}

/// Pick the iteration for `today` among dated iterations.
pub fn select_iteration(iterations: &[Iteration], today: NaiveDate) -> Option<&Iteration> {
  let dated = || iterations.iter().filter_map(|it| it.window.map(|w| (it, w)));

  let containing = dated().filter(|(_, w)| w.contains(today)).max_by_key(|(_, w)| w.start);
  let past = || dated().filter(|(_, w)| w.end < today).max_by_key(|(_, w)| w.end);
  let future = || dated().filter(|(_, w)| w.start > today).min_by_key(|(_, w)| w.start);

  containing.or_else(past).or_else(future).map(|(it, _)| it)
}

fn from_cadence(project: &Project, _tracker: &dyn TrackerApi, today: NaiveDate) -> Option<SprintPeriod> {
  let cadence = project.cadence.as_ref()?;
  let cw = compute_current_window(cadence, today);
  debug!(project = %project.key(), period_index = cw.period_index, name = %cw.name, "cadence window synthesized");

  let iteration = Iteration {
    id: None,
    path: synthesize_path(project, &cw.name),
    name: cw.name,
    window: Some(cw.window),
    synthesized: true,
  };
  Some(SprintPeriod::from_iteration(&iteration))
}

/// Swap the leaf of the configured path for `name`; without a template, root the name at the project.
pub fn synthesize_path(project: &Project, name: &str) -> String {
  let sep = project.path_separator.as_str();
  match project.iteration_path.as_deref().map(|p| p.trim_end_matches(sep)) {
    Some(template) if !template.is_empty() => match template.rsplit_once(sep) {
      Some((parent, _leaf)) => format!("{parent}{sep}{name}"),
      None => format!("{template}{sep}{name}"),
    },
    _ => format!("{}{sep}{name}", project.id),
  }
}

/// Earliest start and latest end over dated periods; `fallback` when none are dated.
pub fn overall_period<'a, I>(periods: I, fallback: DateWindow) -> OverallPeriod
where
  I: IntoIterator<Item = &'a SprintPeriod>,
{
  let span = periods
    .into_iter()
    .filter_map(|p| p.window())
    .reduce(|acc, w| DateWindow {
      start: acc.start.min(w.start),
      end: acc.end.max(w.end),
    });

  match span {
    Some(window) => OverallPeriod { window, source: PeriodSource::Derived },
    None => OverallPeriod { window: fallback, source: PeriodSource::Default },
  }
}
