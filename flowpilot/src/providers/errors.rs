use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("no provider configured")]
    NoProviderConfigured,

    #[error("unknown provider for domain {0}")]
    UnknownDomain(String),

    #[error("invalid metadata url {url}: {reason}")]
    InvalidMetadataUrl { url: String, reason: String },

    #[error("redirect to '{0}' not allowed")]
    RedirectNotAllowed(String),

    #[error("Invalid provider settings: {0}")]
    Settings(String),

    #[error("Provider source error: {0}")]
    Source(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Settings(err.to_string())
    }
}
