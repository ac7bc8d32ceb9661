use jsonschema::validator_for;

fn compile_schema() -> jsonschema::Validator {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let data = std::fs::read(manifest_dir.join("schemas").join("snapshot.schema.json")).expect("schema file");
  let schema: serde_json::Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

fn run(scenario: &str) -> serde_json::Value {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  let out = cmd
    .envs(test_support::tracker_env(scenario))
    .args(["--config", &config, "--pat", "dummy", "--today", "2024-01-20"])
    .output()
    .unwrap();
  assert!(out.status.success());
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn every_scenario_conforms_to_schema() {
  let validator = compile_schema();
  for scenario in ["sprint_in_progress", "path_missing", "tracker_down"] {
    let v = run(scenario);
    let errors: Vec<String> = validator.iter_errors(&v).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "{scenario}: {errors:?}");
  }
}

#[test]
fn schema_rejects_partial_counts_on_failed_projects() {
  let validator = compile_schema();
  let mut v = run("tracker_down");
  v["projects"]["delhivery_NEWTON"]["total_items"] = 3.into();
  assert!(!validator.is_valid(&v));
}

#[test]
fn fixture_payloads_match_scenario_shapes() {
  let wiql: serde_json::Value = test_support::read_fixture_json("tracker/sprint_in_progress/wiql.json");
  let items: serde_json::Value = test_support::read_fixture_json("tracker/sprint_in_progress/workitems.json");
  let ids: Vec<i64> = wiql["workItems"].as_array().unwrap().iter().map(|w| w["id"].as_i64().unwrap()).collect();
  let fetched: Vec<i64> = items["value"].as_array().unwrap().iter().map(|w| w["id"].as_i64().unwrap()).collect();
  assert_eq!(ids, fetched);
  assert!(test_support::read_fixture_text("config/report.yaml").contains("NEWTON"));
}
