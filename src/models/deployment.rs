use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// A deployment record as listed by `GET /repos/{owner}/{repo}/deployments`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Deployment {
    pub id: u64,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub payload: Value, // free-form, usually an object; may carry `web_url`
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Deployment {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            sha: None,
            git_ref: None,
            environment: None,
            payload: Value::Null,
            created_at: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// The `web_url` carried in the payload, when it is a non-empty string.
    pub fn web_url(&self) -> Option<&str> {
        self.payload
            .get("web_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Error,
    Failure,
    Inactive,
    InProgress,
    Queued,
    Pending,
    Success,
    #[serde(other)]
    Unknown,
}

impl StatusState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Inactive => "inactive",
            Self::InProgress => "in_progress",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", state)
    }
}

// One entry of `GET /repos/{owner}/{repo}/deployments/{id}/statuses`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeploymentStatus {
    pub id: u64,
    pub state: StatusState,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub environment_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DeploymentStatus {
    pub fn new(id: u64, state: StatusState) -> Self {
        Self {
            id,
            state,
            target_url: None,
            environment_url: None,
            description: None,
            created_at: None,
        }
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }
}

/// First status with state `success`, in the order the API returned them.
pub fn first_success(statuses: &[DeploymentStatus]) -> Option<&DeploymentStatus> {
    statuses.iter().find(|status| status.state.is_success())
}

/// The deployment a watch settled on, together with its successful status.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DeploymentMatch {
    pub deployment: Deployment,
    pub status: DeploymentStatus,
    pub url: String,
}

impl DeploymentMatch {
    pub fn new(deployment: Deployment, status: DeploymentStatus) -> Self {
        let url = resolve_url(&deployment, &status);
        Self {
            deployment,
            status,
            url,
        }
    }
}

/// Payload `web_url` wins over the status `target_url`; empty when neither is set.
pub fn resolve_url(deployment: &Deployment, status: &DeploymentStatus) -> String {
    deployment
        .web_url()
        .or(status.target_url.as_deref())
        .unwrap_or_default()
        .to_string()
}
