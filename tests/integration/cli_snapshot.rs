use std::fmt::Write as _;

use serde_json::Value;

fn run_sprint_in_progress(extra: &[&str]) -> Value {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  let out = cmd
    .envs(test_support::tracker_env("sprint_in_progress"))
    .args(["--config", &config, "--pat", "dummy", "--today", "2024-01-20", "--project", "NEWTON"])
    .args(extra)
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).expect("stdout is the snapshot JSON")
}

/// One line per project and engineer; stable across serializer key ordering.
fn summarize(v: &Value) -> String {
  let mut s = String::new();
  let overall = &v["overall_period"];
  writeln!(
    s,
    "overall {}..{} ({})",
    overall["start_date"].as_str().unwrap(),
    overall["end_date"].as_str().unwrap(),
    overall["source"].as_str().unwrap()
  )
  .unwrap();

  for (key, p) in v["projects"].as_object().unwrap() {
    let period = &p["sprint_period"];
    writeln!(
      s,
      "{key}: {} items={} scope={} period={}..{} path={} ({})",
      p["status"].as_str().unwrap(),
      p["total_items"],
      p["query_scope"].as_str().unwrap(),
      period["start_date"].as_str().unwrap_or("-"),
      period["end_date"].as_str().unwrap_or("-"),
      period["iteration_path"].as_str().unwrap_or("-"),
      period["provenance"].as_str().unwrap()
    )
    .unwrap();
    for c in p["category_summary"].as_array().unwrap() {
      writeln!(s, "  category {}: {}", c["category"].as_str().unwrap(), c["count"]).unwrap();
    }
    for (who, m) in p["engineer_metrics"].as_object().unwrap() {
      let states: Vec<String> = m["states"].as_object().unwrap().iter().map(|(k, n)| format!("{k}={n}")).collect();
      let titles: Vec<&str> = m["tasks"].as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
      writeln!(s, "  {who}: {} [{}] {:?}", m["total_items"], states.join(", "), titles).unwrap();
    }
  }
  s
}

#[test]
fn sprint_in_progress_end_to_end() {
  let v = run_sprint_in_progress(&[]);

  assert_eq!(v["today"], "2024-01-20");
  assert!(v["generated_at"].as_str().is_some_and(|g| g.contains('T')));

  insta::assert_snapshot!(summarize(&v).trim_end(), @r#"
  overall 2024-01-15..2024-01-28 (derived)
  delhivery_NEWTON: completed items=4 scope=exact period=2024-01-15..2024-01-28 path=NEWTON\Sprint 2 (authoritative)
    category To-Do: 1
    category In Progress: 2
    category Released: 1
    Asha Rao: 2 [Code Review=1, In Progress=1] ["Payout retry job", "Ledger reconciliation"]
    Ben Ode: 1 [Closed=1] ["Fix payout rounding"]
    Unassigned: 1 [New=1] ["Untitled Task"]
  "#);
}

#[test]
fn engineer_categories_follow_the_default_map() {
  let v = run_sprint_in_progress(&[]);
  let asha = &v["projects"]["delhivery_NEWTON"]["engineer_metrics"]["Asha Rao"];
  insta::assert_json_snapshot!(asha["categories"], @r#"
  [
    {
      "category": "In Progress",
      "count": 2
    }
  ]
  "#);
  assert_eq!(asha["tasks"][1]["tags"], "HRMS - Payout; Ledger");
}

#[test]
fn parallel_run_produces_the_same_counts() {
  let serial = run_sprint_in_progress(&[]);
  let parallel = run_sprint_in_progress(&["--parallel"]);
  assert_eq!(serial["projects"], parallel["projects"]);
  assert_eq!(serial["overall_period"], parallel["overall_period"]);
}
