// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Azure DevOps REST (v7.0) backend for the TrackerApi seam
// role: integration/tracker-http
// inputs: base URL, personal access token, org/project/team identifiers
// outputs: Parsed teams, iterations, WIQL ids, work items
// side_effects: Network calls to the tracker host
// invariants:
// - Every request carries the Basic credential built from the PAT
// - Path segments are percent-encoded; query parameters go through ureq
// - HTTP 400/404 bodies naming a missing path surface as TrackerError::PathNotFound
// errors: Mapped into TrackerError (Status | Transport | Payload | PathNotFound)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use base64::Engine as _;

use super::{parse_iterations, parse_query_ids, parse_teams, parse_work_items, Team, TrackerApi, WORK_ITEM_FIELDS};
use crate::error::TrackerError;
use crate::model::{Iteration, WorkItem};

const API_VERSION: &str = "7.0";

pub struct AzureDevOpsApi {
  base_url: String,
  authorization: String,
  agent: ureq::Agent,
}

impl AzureDevOpsApi {
  pub fn new(base_url: &str, pat: &str) -> Self {
    let token = base64::engine::general_purpose::STANDARD.encode(format!(":{}", pat.trim()));
    let agent = ureq::AgentBuilder::new()
      .timeout(Duration::from_secs(60))
      .user_agent("sprint-activity-report")
      .build();

    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      authorization: format!("Basic {}", token),
      agent,
    }
  }

  fn url(&self, segments: &[&str], tail: &str) -> String {
    let mut url = self.base_url.clone();
    for s in segments {
      url.push('/');
      url.push_str(&urlencoding::encode(s));
    }
    url.push_str(tail);
    url
  }

  fn request(&self, method: &str, url: &str) -> ureq::Request {
    self
      .agent
      .request(method, url)
      .query("api-version", API_VERSION)
      .set("Accept", "application/json")
      .set("Authorization", &self.authorization)
  }
}

fn into_json(resp: Result<ureq::Response, ureq::Error>) -> Result<serde_json::Value, TrackerError> {
  match resp {
    Ok(r) => r
      .into_json::<serde_json::Value>()
      .map_err(|e| TrackerError::Payload(e.to_string())),
    Err(ureq::Error::Status(code, r)) => {
      let body = r.into_string().unwrap_or_default();
      Err(TrackerError::from_response(code, &body))
    }
    Err(ureq::Error::Transport(t)) => Err(TrackerError::Transport(t.to_string())),
  }
}

impl TrackerApi for AzureDevOpsApi {
  fn list_teams(&self, org: &str, project: &str) -> Result<Vec<Team>, TrackerError> {
    let url = self.url(&[org, "_apis", "projects", project, "teams"], "");
    let v = into_json(self.request("GET", &url).call())?;
    parse_teams(&v)
  }

  fn list_iterations(&self, org: &str, project: &str, team_id: &str) -> Result<Vec<Iteration>, TrackerError> {
    let url = self.url(&[org, project, team_id], "/_apis/work/teamsettings/iterations");
    let v = into_json(self.request("GET", &url).call())?;
    parse_iterations(&v)
  }

  fn run_query(&self, org: &str, project: &str, wiql: &str) -> Result<Vec<i64>, TrackerError> {
    let url = self.url(&[org, project], "/_apis/wit/wiql");
    let body = serde_json::json!({ "query": wiql });
    let v = into_json(self.request("POST", &url).send_json(body))?;
    parse_query_ids(&v)
  }

  fn fetch_items(&self, org: &str, project: &str, ids: &[i64]) -> Result<Vec<WorkItem>, TrackerError> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let id_list = ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",");
    let url = self.url(&[org, project], "/_apis/wit/workitems");
    let req = self
      .request("GET", &url)
      .query("ids", &id_list)
      .query("fields", &WORK_ITEM_FIELDS.join(","))
      .query("errorPolicy", "omit");
    let v = into_json(req.call())?;
    parse_work_items(&v)
  }
}
