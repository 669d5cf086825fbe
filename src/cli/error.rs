use crate::configuration::SettingsError;
use crate::connectors::ConnectorError;
use crate::services::WatchError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError — everything that can fail a `wait-for-deployment` run
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Failed to create GitHub client: {0}")]
    Client(#[from] ConnectorError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error("Failed to publish outputs: {0}")]
    Io(#[from] std::io::Error),
}
