use reqwest::StatusCode;

/// Ways a GitHub REST call can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    /// Non-success status GitHub gives no dedicated meaning here (422, 409, ...).
    #[error("GitHub request failed: {0}")]
    Request(String),
    /// Connect failure, request timeout or 5xx.
    #[error("GitHub is unreachable: {0}")]
    ServiceUnavailable(String),
    /// Body or `Link` header that does not parse.
    #[error("Unexpected GitHub response: {0}")]
    InvalidResponse(String),
    /// 401 or 403: bad or under-scoped token.
    #[error("GitHub rejected the token: {0}")]
    Unauthorized(String),
    /// 404: unknown repository or deployment, or no access to it.
    #[error("GitHub resource not found: {0}")]
    NotFound(String),
    /// 429 from the REST rate limiter.
    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(String),
    /// The HTTP client could not be built from the configuration.
    #[error("Cannot build GitHub client: {0}")]
    ClientSetup(String),
}

impl ConnectorError {
    /// Maps a non-success HTTP status and its body to an error variant.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(body),
            status if status.is_server_error() => {
                Self::ServiceUnavailable(format!("{}: {}", status, body))
            }
            status => Self::Request(format!("{}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
