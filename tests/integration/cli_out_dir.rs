use predicates::prelude::*;

fn write_snapshot_into(dir: &std::path::Path) -> serde_json::Value {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  let out = cmd
    .envs(test_support::tracker_env("sprint_in_progress"))
    .args(["--config", &config, "--pat", "dummy", "--today", "2024-01-20", "--project", "NEWTON"])
    .args(["--out", &dir.to_string_lossy()])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).expect("pointer JSON on stdout")
}

#[test]
fn out_dir_receives_timestamped_snapshot() {
  let td = test_support::tempdir();
  let target = td.path().join("reports");
  let pointer = write_snapshot_into(&target);

  let dir = pointer["dir"].as_str().unwrap().to_string();
  let file = pointer["file"].as_str().unwrap().to_string();
  assert!(dir.ends_with("reports"));
  assert!(file.starts_with("sprint_count_") && file.ends_with(".json"), "{file}");
  // sprint_count_YYYYMMDD_HHMMSS.json
  assert_eq!(file.len(), "sprint_count_20240120_090000.json".len());

  let written: serde_json::Value =
    serde_json::from_slice(&std::fs::read(std::path::Path::new(&dir).join(&file)).unwrap()).unwrap();
  assert_eq!(written["projects"]["delhivery_NEWTON"]["total_items"], 4);

  insta::assert_json_snapshot!(pointer, { ".dir" => "[dir]", ".file" => "[file]" }, @r#"
  {
    "dir": "[dir]",
    "file": "[file]"
  }
  "#);
}

#[test]
fn written_snapshot_passes_check() {
  let td = test_support::tempdir();
  let pointer = write_snapshot_into(td.path());
  let path = std::path::Path::new(pointer["dir"].as_str().unwrap()).join(pointer["file"].as_str().unwrap());

  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  let out = cmd.args(["--check-snapshot", &path.to_string_lossy()]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(report["projects"], 1);
  assert_eq!(report["failed_projects"], 0);
  assert_eq!(report["problems"], serde_json::json!([]));
}

#[test]
fn tampered_snapshot_fails_check() {
  let td = test_support::tempdir();
  let pointer = write_snapshot_into(td.path());
  let path = std::path::Path::new(pointer["dir"].as_str().unwrap()).join(pointer["file"].as_str().unwrap());

  let mut v: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
  v["projects"]["delhivery_NEWTON"]["total_items"] = 7.into();
  std::fs::write(&path, serde_json::to_vec_pretty(&v).unwrap()).unwrap();

  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .args(["--check-snapshot", &path.to_string_lossy()])
    .assert()
    .failure()
    .stdout(predicate::str::contains("total_items 7"))
    .stderr(predicate::str::contains("1 problem(s)"));
}
