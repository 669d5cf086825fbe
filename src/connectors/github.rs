use super::config::GitHubConnectorConfig;
use super::errors::ConnectorError;
use crate::models::{Deployment, DeploymentStatus, QueryScope, Repository};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::Instrument;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Read access to deployment records and their status history.
#[async_trait]
pub trait DeploymentsConnector: Send + Sync {
    /// Deployments of `scope.sha` to `scope.environment`, in API order.
    async fn list_deployments(&self, scope: &QueryScope)
        -> Result<Vec<Deployment>, ConnectorError>;

    /// Status history of one deployment, in API order.
    async fn list_statuses(
        &self,
        repository: &Repository,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, ConnectorError>;
}

pub struct GitHubClient {
    base_url: String,
    http_client: reqwest::Client,
    per_page: u32,
}

impl GitHubClient {
    pub fn new(config: GitHubConnectorConfig) -> Result<Self, ConnectorError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(Self::build_headers(&config.token)?)
            .build()
            .map_err(|err| ConnectorError::ClientSetup(err.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            per_page: config.per_page.clamp(1, 100),
        })
    }

    fn build_headers(token: &str) -> Result<HeaderMap, ConnectorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let user_agent = format!("deployment-watcher/{}", env!("CARGO_PKG_VERSION"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent)
                .map_err(|err| ConnectorError::ClientSetup(format!("user agent: {}", err)))?,
        );

        if !token.is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ConnectorError::ClientSetup("token contains invalid header characters".to_string())
            })?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        Ok(headers)
    }

    fn encode_segment(segment: &str) -> String {
        urlencoding::encode(segment).into_owned()
    }

    fn repo_path(repository: &Repository) -> String {
        format!(
            "/repos/{}/{}",
            Self::encode_segment(&repository.owner),
            Self::encode_segment(&repository.name)
        )
    }

    /// GETs `path` and every page linked through `rel="next"`.
    ///
    /// A `next` link back to a page already fetched is rejected, so a looping
    /// chain ends with an error instead of growing forever.
    async fn get_paginated<T>(
        &self,
        path: &str,
        query: Vec<(&str, String)>,
    ) -> Result<Vec<T>, ConnectorError>
    where
        T: DeserializeOwned,
    {
        let mut url = format!("{}{}", self.base_url, path);
        let mut query = Some(query);
        let mut items = Vec::new();
        let mut visited = HashSet::new();

        loop {
            let page = visited.len() + 1;
            let mut builder = self.http_client.get(&url);
            // Link URLs already carry the query string.
            if let Some(query) = query.take() {
                builder = builder.query(&query);
            }

            let span = tracing::info_span!("github_http_request", path, page);
            let resp = builder.send().instrument(span).await?;
            visited.insert(resp.url().to_string());

            let status = resp.status();
            let next = next_page_url(resp.headers());
            let text = resp.text().await?;

            if !status.is_success() {
                return Err(ConnectorError::from_status(status, text));
            }

            let batch: Vec<T> = serde_json::from_str(&text).map_err(|err| {
                ConnectorError::InvalidResponse(format!("{} ({})", err, path))
            })?;
            items.extend(batch);

            let Some(next) = next? else {
                break;
            };
            let next = reqwest::Url::parse(&next).map_err(|err| {
                ConnectorError::InvalidResponse(format!("Link header target '{}': {}", next, err))
            })?;
            if visited.contains(next.as_str()) {
                tracing::warn!(path, page, next = %next, "Pagination loops back to a fetched page");
                return Err(ConnectorError::InvalidResponse(format!(
                    "Link header of page {} points back to {}",
                    page, next
                )));
            }
            url = next.into();
        }

        Ok(items)
    }
}

/// Extracts the `rel="next"` target from a GitHub `Link` header.
pub fn next_page_url(headers: &HeaderMap) -> Result<Option<String>, ConnectorError> {
    let Some(link) = headers.get(LINK) else {
        return Ok(None);
    };
    let link = link
        .to_str()
        .map_err(|err| ConnectorError::InvalidResponse(format!("Link header: {}", err)))?;
    let mut links = parse_link_header::parse_with_rel(link)
        .map_err(|err| ConnectorError::InvalidResponse(format!("Link header: {}", err)))?;

    Ok(links.remove("next").map(|next| next.raw_uri))
}

#[async_trait]
impl DeploymentsConnector for GitHubClient {
    #[tracing::instrument(
        name = "List deployments",
        skip(self, scope),
        fields(repository = %scope.repository, environment = %scope.environment, sha = %scope.sha)
    )]
    async fn list_deployments(
        &self,
        scope: &QueryScope,
    ) -> Result<Vec<Deployment>, ConnectorError> {
        let path = format!("{}/deployments", Self::repo_path(&scope.repository));
        let query = vec![
            ("environment", scope.environment.clone()),
            ("sha", scope.sha.clone()),
            ("per_page", self.per_page.to_string()),
        ];
        self.get_paginated(&path, query).await
    }

    #[tracing::instrument(name = "List deployment statuses", skip(self, repository))]
    async fn list_statuses(
        &self,
        repository: &Repository,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, ConnectorError> {
        let path = format!(
            "{}/deployments/{}/statuses",
            Self::repo_path(repository),
            deployment_id
        );
        let query = vec![("per_page", self.per_page.to_string())];
        self.get_paginated(&path, query).await
    }
}
