#![allow(dead_code)]

use async_trait::async_trait;
use deployment_watcher::connectors::{ConnectorError, DeploymentsConnector};
use deployment_watcher::models::{Deployment, DeploymentStatus, QueryScope, Repository};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub type StatusReply = Result<Vec<DeploymentStatus>, ConnectorError>;

/// In-memory deployments API driven by per-call scripts.
///
/// Each script is consumed one reply per call; the last reply repeats once
/// the script runs out.
#[derive(Default)]
pub struct ScriptedConnector {
    listings: Mutex<VecDeque<Vec<Deployment>>>,
    statuses: Mutex<HashMap<u64, VecDeque<StatusReply>>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDeployments,
    ListStatuses(u64),
}

fn next_reply<T: Clone>(script: &mut VecDeque<T>) -> Option<T> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(self, deployments: Vec<Deployment>) -> Self {
        self.listings.lock().unwrap().push_back(deployments);
        self
    }

    pub fn statuses(self, deployment_id: u64, reply: StatusReply) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .entry(deployment_id)
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn listing_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::ListDeployments)
            .count()
    }
}

#[async_trait]
impl DeploymentsConnector for ScriptedConnector {
    async fn list_deployments(
        &self,
        _scope: &QueryScope,
    ) -> Result<Vec<Deployment>, ConnectorError> {
        self.calls.lock().unwrap().push(Call::ListDeployments);
        let mut listings = self.listings.lock().unwrap();
        Ok(next_reply(&mut *listings).unwrap_or_default())
    }

    async fn list_statuses(
        &self,
        _repository: &Repository,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, ConnectorError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::ListStatuses(deployment_id));
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.get_mut(&deployment_id) {
            Some(script) => next_reply(script).unwrap_or_else(|| Ok(Vec::new())),
            None => Ok(Vec::new()),
        }
    }
}

pub fn scope() -> QueryScope {
    QueryScope::new(Repository::new("octo", "app"), "production", "abc123")
}
