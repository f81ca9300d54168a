/// Failure reported by (or while reaching) an analysis or recognition
/// provider. `Display` is the provider's own message where one was given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// 400 from the analysis provider.
    #[error("{0}")]
    InvalidNotation(String),

    /// 503 from the analysis provider.
    #[error("{0}")]
    EngineUnavailable(String),

    /// Any other non-success status.
    #[error("{0}")]
    Internal(String),

    /// `{"status": "error"}` from the recognition provider.
    #[error("{0}")]
    Recognition(String),

    #[error("Request error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}
