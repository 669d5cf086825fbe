use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub REST connector configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GitHubConnectorConfig {
    /// API base URL (GITHUB_API_URL on Enterprise runners)
    pub base_url: String,
    /// Token sent as `Authorization: Bearer ...`
    #[serde(skip)]
    pub token: String,
    /// HTTP timeout in seconds
    #[serde(default = "GitHubConnectorConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Page size for deployment and status listings
    #[serde(default = "GitHubConnectorConfig::default_per_page")]
    pub per_page: u32,
}

impl GitHubConnectorConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    pub const fn default_timeout_secs() -> u64 {
        30
    }

    pub const fn default_per_page() -> u32 {
        100
    }
}

impl Default for GitHubConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: String::new(),
            timeout_secs: Self::default_timeout_secs(),
            per_page: Self::default_per_page(),
        }
    }
}

impl fmt::Debug for GitHubConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConnectorConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("per_page", &self.per_page)
            .finish()
    }
}
