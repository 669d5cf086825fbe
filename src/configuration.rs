use crate::connectors::{GitHubConnectorConfig, DEFAULT_GITHUB_API_URL};
use crate::models::{PollingParams, QueryScope, Repository, RepositoryParseError};
use serde;

/// Raw settings as read from file, `INPUT_*` variables and CLI flags.
///
/// Polling values stay textual here so that bad input can fall back to
/// defaults instead of failing the run.
#[derive(Debug, Default, serde::Deserialize)]
pub struct Settings {
    #[serde(rename = "github-token", default)]
    pub token: Option<String>,
    /// `INPUT_TOKEN`, read only when `github-token` is absent.
    #[serde(rename = "token", default)]
    pub token_alias: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub http: HttpSettings,
}

#[derive(Debug, serde::Deserialize)]
pub struct HttpSettings {
    #[serde(default = "GitHubConnectorConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "GitHubConnectorConfig::default_per_page")]
    pub per_page: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: GitHubConnectorConfig::default_timeout_secs(),
            per_page: GitHubConnectorConfig::default_per_page(),
        }
    }
}

/// Values given on the command line; each one wins over every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub token: Option<String>,
    pub environment: Option<String>,
    pub sha: Option<String>,
    pub timeout: Option<String>,
    pub interval: Option<String>,
    pub repository: Option<String>,
    pub api_url: Option<String>,
}

/// Everything a run needs, validated.
#[derive(Debug)]
pub struct RunSettings {
    pub scope: QueryScope,
    pub polling: PollingParams,
    pub github: GitHubConnectorConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryParseError),
    #[error("Invalid API URL '{0}'")]
    InvalidApiUrl(String),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Token precedence: `github-token`, then the `token` alias, then `runner_token`.
    pub fn resolve_token(&mut self, runner_token: Option<String>) {
        if non_empty(self.token.clone()).is_none() {
            self.token = non_empty(self.token_alias.take()).or_else(|| non_empty(runner_token));
        }
    }

    pub fn into_parts(self) -> Result<RunSettings, SettingsError> {
        let token = non_empty(self.token).ok_or(SettingsError::MissingInput("github-token"))?;
        let environment =
            non_empty(self.environment).ok_or(SettingsError::MissingInput("environment"))?;
        let sha = non_empty(self.sha).ok_or(SettingsError::MissingInput("sha"))?;
        let repository: Repository = non_empty(self.repository)
            .ok_or(SettingsError::MissingInput("repository"))?
            .parse()?;

        let api_url =
            non_empty(self.api_url).unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(SettingsError::InvalidApiUrl(api_url));
        }

        let polling = PollingParams::from_inputs(self.interval.as_deref(), self.timeout.as_deref());

        let mut github = GitHubConnectorConfig::new(api_url, token);
        github.timeout_secs = self.http.timeout_secs;
        github.per_page = self.http.per_page;

        Ok(RunSettings {
            scope: QueryScope::new(repository, environment, sha),
            polling,
            github,
        })
    }
}

/// Reads settings from, lowest priority first:
/// an optional `{file}.yaml|toml|json`, `INPUT_*` variables set by the
/// Actions runner, `GITHUB_REPOSITORY` / `GITHUB_API_URL` / `GITHUB_TOKEN`,
/// and finally `overrides`.
pub fn get_configuration(file: &str, overrides: Overrides) -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let runner_token = std::env::var("GITHUB_TOKEN").ok();
    let runner_repository = std::env::var("GITHUB_REPOSITORY").ok();
    let runner_api_url = std::env::var("GITHUB_API_URL").ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name(file).required(false))
        // INPUT_GITHUB-TOKEN -> "github-token", INPUT_SHA -> "sha", ...
        .add_source(config::Environment::with_prefix("INPUT"))
        .set_override_option("repository", runner_repository)?
        .set_override_option("api_url", runner_api_url)?
        .set_override_option("github-token", overrides.token)?
        .set_override_option("environment", overrides.environment)?
        .set_override_option("sha", overrides.sha)?
        .set_override_option("timeout", overrides.timeout)?
        .set_override_option("interval", overrides.interval)?
        .set_override_option("repository", overrides.repository)?
        .set_override_option("api_url", overrides.api_url)?
        .build()?;

    let mut settings: Settings = settings.try_deserialize()?;

    settings.resolve_token(runner_token);

    Ok(settings)
}
