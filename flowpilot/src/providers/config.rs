use std::env;

use serde::{Deserialize, Serialize};

use super::errors::ProviderError;

/// One identity provider as configured statically or stored dynamically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProviderConfig {
    pub enabled: bool,
    pub name: String,
    pub metadata_url: String,
    pub sso_url: String,
    /// Overrides the domain derived from the metadata url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Startup settings for third-party sign-in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub providers: Vec<IdentityProviderConfig>,
    #[serde(default)]
    pub allowed_redirect_urls: Vec<String>,
    #[serde(default)]
    pub default_redirect_url: Option<String>,
}

impl ProviderSettings {
    /// Reads `IDP_PROVIDERS`, `IDP_ALLOWED_REDIRECT_URLS` and `IDP_DEFAULT_REDIRECT_URL`
    pub fn from_env() -> Result<Self, ProviderError> {
        let providers = match env::var("IDP_PROVIDERS").ok().filter(|s| !s.trim().is_empty()) {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        let allowed_redirect_urls = env::var("IDP_ALLOWED_REDIRECT_URLS")
            .ok()
            .map(|list| parse_url_list(&list))
            .unwrap_or_default();

        let default_redirect_url = env::var("IDP_DEFAULT_REDIRECT_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            providers,
            allowed_redirect_urls,
            default_redirect_url,
        })
    }
}

fn parse_url_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}
