use predicates::prelude::*;

#[test]
fn missing_pat_fails_before_any_tracker_call() {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .envs(test_support::tracker_env("sprint_in_progress"))
    .args(["--config", &config])
    .assert()
    .failure()
    .stderr(predicate::str::contains("AZURE_DEVOPS_PAT"))
    .stdout(predicate::str::is_empty());
}

#[test]
fn pat_is_read_from_the_environment() {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .envs(test_support::tracker_env("sprint_in_progress"))
    .env("AZURE_DEVOPS_PAT", "from-env")
    .args(["--config", &config, "--today", "2024-01-20", "--project", "NEWTON"])
    .assert()
    .success()
    .stderr(predicate::str::contains("from-env").not());
}

#[test]
fn zero_week_cadence_is_a_config_error() {
  let config = test_support::fixture_path("config/zero_weeks.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .args(["--config", &config, "--pat", "dummy"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid cadence"));
}

#[test]
fn unknown_project_filter_selects_nothing() {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .args(["--config", &config, "--pat", "dummy", "--project", "Nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no projects selected"));
}

#[test]
fn unreadable_config_names_the_path() {
  let td = test_support::tempdir();
  let missing = td.path().join("absent.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .args(["--config", &missing.to_string_lossy(), "--pat", "dummy"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("absent.yaml"));
}

#[test]
fn malformed_today_is_rejected() {
  let config = test_support::fixture_path("config/report.yaml");
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd
    .args(["--config", &config, "--pat", "dummy", "--today", "20-01-2024"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--today"));
}
