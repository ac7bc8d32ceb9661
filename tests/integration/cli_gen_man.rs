#[test]
fn cli_generates_man_page() {
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let s = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff manpage starting with .TH and mentions the binary name
  assert!(s.contains(".TH"));
  assert!(s.contains("sprint-activity-report"));
}

#[test]
fn gen_man_needs_no_credential_or_config() {
  let mut cmd = test_support::cmd_bin("sprint-activity-report");
  cmd.args(["--gen-man", "--config", "/nonexistent/sprint-report.yaml"]).assert().success();
}
