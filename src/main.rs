//! `wait-for-deployment` binary.
//!
//! Runs as a GitHub Action step (inputs from `INPUT_*` variables) or locally
//! with flags:
//!
//! ```text
//! wait-for-deployment --repository octo/app --environment production --sha abc123
//! ```

use clap::Parser;
use deployment_watcher::cli::{report_failure, ActionOutput, CliError};
use deployment_watcher::configuration::{get_configuration, Overrides};
use deployment_watcher::connectors::GitHubClient;
use deployment_watcher::services::DeploymentWatcher;
use deployment_watcher::telemetry::{get_subscriber, init_subscriber};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "wait-for-deployment",
    version,
    about = "Wait for a GitHub deployment of a commit to succeed",
    long_about = "Polls the GitHub deployments API until a deployment of the given commit\n\
        to the given environment reports a `success` status, then publishes its\n\
        id and URL as step outputs."
)]
struct Cli {
    /// Configuration file name without extension (yaml, toml or json)
    #[arg(
        long,
        value_name = "FILE",
        env = "DEPLOYMENT_WATCHER_CONFIG",
        default_value = "deployment-watcher"
    )]
    config: String,
    /// GitHub token (default: INPUT_GITHUB-TOKEN, then GITHUB_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,
    /// Deployment environment to wait for
    #[arg(long, value_name = "NAME")]
    environment: Option<String>,
    /// Commit sha the deployment must target
    #[arg(long)]
    sha: Option<String>,
    /// Total polling budget in seconds (default: 30)
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<String>,
    /// Delay between polls in seconds (default: 5)
    #[arg(long, value_name = "SECONDS")]
    interval: Option<String>,
    /// Repository as owner/name (default: GITHUB_REPOSITORY)
    #[arg(long, value_name = "OWNER/NAME")]
    repository: Option<String>,
    /// API base URL (default: GITHUB_API_URL or https://api.github.com)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            environment: self.environment.clone(),
            sha: self.sha.clone(),
            timeout: self.timeout.clone(),
            interval: self.interval.clone(),
            repository: self.repository.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout is reserved for workflow commands
    let subscriber = get_subscriber("deployment-watcher".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "Waiting for deployment failed");
        report_failure(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = get_configuration(&cli.config, cli.overrides())?.into_parts()?;

    tracing::info!(
        "Deployment params: {}",
        serde_json::to_string_pretty(&settings.scope).unwrap_or_default()
    );

    let connector = Arc::new(GitHubClient::new(settings.github)?);
    let watcher = DeploymentWatcher::new(connector);
    let found = watcher.wait(&settings.scope, &settings.polling).await?;

    ActionOutput::from_env().publish(&found)?;
    Ok(())
}
