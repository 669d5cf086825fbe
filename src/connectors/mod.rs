//! External Service Connectors
//!
//! The deployments API is reached only through the [`DeploymentsConnector`]
//! trait, so the watcher can be driven by an in-memory implementation in tests.
//!
//! ## Architecture Pattern
//!
//! 1. Trait and HTTP client live in `github.rs`
//! 2. Configuration in `config.rs`
//! 3. The watcher receives an `Arc<dyn DeploymentsConnector>` and never sees HTTP details

pub mod config;
pub mod errors;
pub mod github;

pub use config::{GitHubConnectorConfig, DEFAULT_GITHUB_API_URL};
pub use errors::ConnectorError;
pub use github::{next_page_url, DeploymentsConnector, GitHubClient};
