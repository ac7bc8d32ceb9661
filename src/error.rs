// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed error taxonomy for tracker calls and configuration loading
// role: errors
// outputs: TrackerError (branchable by the escalator), ConfigError (fatal before any network call)
// invariants:
// - is_path_not_found is the only predicate used to short-circuit path escalation
// - ConfigError variants never carry credential values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
  #[error("iteration path does not exist: {0}")]
  PathNotFound(String),

  #[error("tracker returned HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("transport error: {0}")]
  Transport(String),

  #[error("unexpected tracker payload: {0}")]
  Payload(String),
}

impl TrackerError {
  pub fn is_path_not_found(&self) -> bool {
    matches!(self, TrackerError::PathNotFound(_))
  }

  /// Classify an error response body. Bodies naming a missing classification
  /// node become `PathNotFound`; everything else keeps its status.
  pub fn from_response(status: u16, body: &str) -> Self {
    static RE_MISSING_PATH: Lazy<regex::Regex> = Lazy::new(|| {
      regex::Regex::new(r"(?i)TF5101[01]|(iteration|area)\s+path\s+does\s+not\s+exist|path\s+.*\bdoes\s+not\s+exist")
        .expect("static regex")
    });

    let message = extract_message(body);

    if (status == 400 || status == 404) && RE_MISSING_PATH.is_match(&message) {
      return TrackerError::PathNotFound(message);
    }

    TrackerError::Status { status, message }
  }
}

fn extract_message(body: &str) -> String {
  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(|s| s.to_string()))
    .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("missing tracker credential: set AZURE_DEVOPS_PAT or pass --pat")]
  MissingCredential,

  #[error("invalid cadence for project '{project}': {reason}")]
  InvalidCadence { project: String, reason: String },

  #[error("invalid date '{value}' in {field}: expected YYYY-MM-DD or DD-Mon-YYYY")]
  InvalidDate { field: String, value: String },

  #[error("unknown timezone '{0}'")]
  UnknownTimezone(String),

  #[error("organization #{0} has no name: set it in the config file or pass --org")]
  MissingOrganization(usize),

  #[error("no projects selected for this run")]
  NoProjects,

  #[error("reading config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("parsing config {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_yaml::Error,
  },
}
