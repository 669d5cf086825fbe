use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Repository identity in `owner/name` form, as found in `GITHUB_REPOSITORY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid repository '{0}', expected 'owner/name'")]
pub struct RepositoryParseError(pub String);

impl FromStr for Repository {
    type Err = RepositoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(RepositoryParseError(s.to_string())),
        }
    }
}

/// What to look for: deployments of `sha` to `environment` in `repository`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryScope {
    pub repository: Repository,
    pub environment: String,
    pub sha: String,
}

impl QueryScope {
    pub fn new(
        repository: Repository,
        environment: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            environment: environment.into(),
            sha: sha.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingParams {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollingParams {
    pub fn from_secs(interval: u64, timeout: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        }
    }

    /// Builds parameters from raw text inputs. Anything that is not a
    /// non-negative integer falls back to the default.
    pub fn from_inputs(interval: Option<&str>, timeout: Option<&str>) -> Self {
        Self::from_secs(
            parse_seconds(interval, DEFAULT_INTERVAL_SECS),
            parse_seconds(timeout, DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl Default for PollingParams {
    fn default() -> Self {
        Self::from_secs(DEFAULT_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS)
    }
}

pub fn parse_seconds(raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return default;
    };

    match raw.parse::<u64>() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                input = raw,
                default,
                error = %err,
                "Ignoring invalid seconds value, using default"
            );
            default
        }
    }
}
