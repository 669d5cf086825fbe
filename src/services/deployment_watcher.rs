//! Polls the deployments API until a deployment of the requested commit
//! reports a `success` status, or the timeout budget runs out.
//!
//! Each iteration lists the deployments for the scope and walks them in the
//! order the API returned them. The first deployment with a successful status
//! wins; later ones are not inspected. Status lookups that fail are skipped
//! and picked up again by the next iteration.

use crate::connectors::{ConnectorError, DeploymentsConnector};
use crate::models::{
    first_success, Deployment, DeploymentMatch, DeploymentStatus, PollingParams, QueryScope,
    Repository, StatusState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Timing out after {timeout} seconds ({elapsed:.3} elapsed)")]
    Timeout { timeout: u64, elapsed: f64 },
    #[error("Failed to list deployments: {0}")]
    Api(#[from] ConnectorError),
}

impl WatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Outcome of looking up one deployment's status history.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLookup {
    Success(DeploymentStatus),
    /// No successful status yet; carries the states that were seen.
    Pending(Vec<StatusState>),
    /// The lookup failed. Recoverable: the deployment is retried next iteration.
    Unavailable(ConnectorError),
}

impl StatusLookup {
    pub fn from_statuses(statuses: &[DeploymentStatus]) -> Self {
        match first_success(statuses) {
            Some(success) => Self::Success(success.clone()),
            None => Self::Pending(statuses.iter().map(|status| status.state).collect()),
        }
    }
}

#[derive(Debug)]
enum WatchState {
    Polling { iteration: u32 },
    Found(DeploymentMatch),
    TimedOut { elapsed: Duration },
}

pub struct DeploymentWatcher {
    connector: Arc<dyn DeploymentsConnector>,
}

impl DeploymentWatcher {
    pub fn new(connector: Arc<dyn DeploymentsConnector>) -> Self {
        Self { connector }
    }

    /// Waits for a successful deployment matching `scope`.
    ///
    /// Returns the first deployment (in listing order) whose status history
    /// contains a `success` entry, or [`WatchError::Timeout`] once the time
    /// spent reaches `params.timeout`. The deadline is checked after each
    /// interval sleep, so a run may overshoot the timeout by up to one interval.
    #[tracing::instrument(
        name = "Wait for deployment",
        skip(self, scope, params),
        fields(
            repository = %scope.repository,
            environment = %scope.environment,
            sha = %scope.sha,
            interval_secs = params.interval.as_secs(),
            timeout_secs = params.timeout.as_secs(),
        )
    )]
    pub async fn wait(
        &self,
        scope: &QueryScope,
        params: &PollingParams,
    ) -> Result<DeploymentMatch, WatchError> {
        let start = Instant::now();
        let mut state = WatchState::Polling { iteration: 1 };

        loop {
            state = match state {
                WatchState::Polling { iteration } => match self.poll_once(scope).await? {
                    Some(found) => WatchState::Found(found),
                    None => {
                        tracing::debug!(iteration, "No successful deployment yet, sleeping");
                        tokio::time::sleep(params.interval).await;

                        let elapsed = start.elapsed();
                        if elapsed >= params.timeout {
                            WatchState::TimedOut { elapsed }
                        } else {
                            WatchState::Polling {
                                iteration: iteration + 1,
                            }
                        }
                    }
                },
                WatchState::Found(found) => return Ok(found),
                WatchState::TimedOut { elapsed } => {
                    return Err(WatchError::Timeout {
                        timeout: params.timeout.as_secs(),
                        elapsed: elapsed.as_secs_f64(),
                    })
                }
            };
        }
    }

    /// One full pass over the current deployment listing.
    async fn poll_once(&self, scope: &QueryScope) -> Result<Option<DeploymentMatch>, WatchError> {
        let deployments = self.connector.list_deployments(scope).await?;
        tracing::info!("Found {} deployments...", deployments.len());

        for deployment in deployments {
            match self.lookup_status(&scope.repository, &deployment).await {
                StatusLookup::Success(status) => {
                    tracing::info!(
                        deployment_id = deployment.id,
                        status_id = status.id,
                        target_url = status.target_url.as_deref().unwrap_or_default(),
                        "success!"
                    );
                    return Ok(Some(DeploymentMatch::new(deployment, status)));
                }
                StatusLookup::Pending(states) => {
                    let states: Vec<String> = states.iter().map(ToString::to_string).collect();
                    tracing::info!(
                        deployment_id = deployment.id,
                        "No statuses with state === \"success\": \"{}\"",
                        states.join("\", \"")
                    );
                }
                StatusLookup::Unavailable(err) => {
                    tracing::info!(
                        deployment_id = deployment.id,
                        error = %err,
                        "Statuses unavailable, retrying next iteration"
                    );
                }
            }
        }

        Ok(None)
    }

    async fn lookup_status(&self, repository: &Repository, deployment: &Deployment) -> StatusLookup {
        tracing::info!("\tgetting statuses for deployment {}...", deployment.id);
        match self.connector.list_statuses(repository, deployment.id).await {
            Ok(statuses) => {
                tracing::info!("\tfound {} statuses", statuses.len());
                StatusLookup::from_statuses(&statuses)
            }
            Err(err) => StatusLookup::Unavailable(err),
        }
    }
}
