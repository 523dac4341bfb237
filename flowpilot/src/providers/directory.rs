use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use super::config::{IdentityProviderConfig, ProviderSettings};
use super::errors::ProviderError;

/// A resolved identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProvider {
    pub name: String,
    pub domain: String,
    pub metadata_url: Url,
    pub sso_url: Url,
}

impl IdentityProvider {
    /// Resolves a configured provider; the domain defaults to the metadata url's host
    pub fn from_config(config: &IdentityProviderConfig) -> Result<Self, ProviderError> {
        let metadata_url = parse_url(&config.metadata_url)?;
        let sso_url = parse_url(&config.sso_url)?;
        let domain = match &config.domain {
            Some(domain) => domain.clone(),
            None => metadata_url
                .host_str()
                .map(str::to_string)
                .ok_or_else(|| ProviderError::InvalidMetadataUrl {
                    url: config.metadata_url.clone(),
                    reason: "url has no host".to_string(),
                })?,
        };

        Ok(Self {
            name: config.name.clone(),
            domain,
            metadata_url,
            sso_url,
        })
    }
}

fn parse_url(url: &str) -> Result<Url, ProviderError> {
    Url::parse(url).map_err(|e| ProviderError::InvalidMetadataUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Supplies providers stored outside the static settings
#[async_trait]
pub trait ProviderSource: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<IdentityProviderConfig>, ProviderError>;
}

/// Providers available for third-party sign-in
///
/// Statically configured providers are resolved when the directory is built.
/// Providers from a [`ProviderSource`] are merged in by [`reload`](Self::reload);
/// a dynamic provider never replaces a static one with the same domain.
pub struct ProviderDirectory {
    static_providers: Vec<IdentityProvider>,
    source: Option<Arc<dyn ProviderSource>>,
    providers: RwLock<Vec<IdentityProvider>>,
    allowed_redirect_urls: Vec<String>,
    default_redirect_url: Option<String>,
}

impl ProviderDirectory {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let static_providers = settings
            .providers
            .iter()
            .filter(|config| config.enabled)
            .map(IdentityProvider::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Configured {} static identity provider(s)",
            static_providers.len()
        );

        Ok(Self {
            providers: RwLock::new(static_providers.clone()),
            static_providers,
            source: None,
            allowed_redirect_urls: settings.allowed_redirect_urls,
            default_redirect_url: settings.default_redirect_url,
        })
    }

    pub fn with_source(mut self, source: Arc<dyn ProviderSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Rebuilds the provider list from the static settings and the source
    ///
    /// Returns the number of providers now available. On error the previous list
    /// stays in place.
    pub async fn reload(&self) -> Result<usize, ProviderError> {
        let mut merged = self.static_providers.clone();

        if let Some(source) = &self.source {
            let stored = source.list().await.inspect_err(|e| {
                tracing::error!("Failed to list stored identity providers: {}", e);
            })?;

            for config in stored.iter().filter(|config| config.enabled) {
                let provider = IdentityProvider::from_config(config)?;
                if merged.iter().any(|known| known.domain == provider.domain) {
                    tracing::warn!(
                        "Provider with domain {} is already registered from config",
                        provider.domain
                    );
                    continue;
                }
                merged.push(provider);
            }
        }

        let count = merged.len();
        *self.providers.write().await = merged;
        tracing::debug!("Provider directory reloaded with {} provider(s)", count);
        Ok(count)
    }

    pub async fn by_domain(&self, domain: &str) -> Result<IdentityProvider, ProviderError> {
        let providers = self.providers.read().await;
        if providers.is_empty() {
            return Err(ProviderError::NoProviderConfigured);
        }

        providers
            .iter()
            .find(|provider| provider.domain == domain)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownDomain(domain.to_string()))
    }

    pub async fn providers(&self) -> Vec<IdentityProvider> {
        self.providers.read().await.clone()
    }

    pub fn default_redirect_url(&self) -> Option<&str> {
        self.default_redirect_url.as_deref()
    }

    /// Whether `redirect_to` matches an allowed redirect url
    ///
    /// Entries match exactly (ignoring a trailing slash) or as patterns where `*`
    /// stands for any run of characters other than `/`.
    pub fn is_allowed_redirect(&self, redirect_to: &str) -> bool {
        let redirect_to = redirect_to.trim();
        if redirect_to.is_empty() || Url::parse(redirect_to).is_err() {
            return false;
        }
        let candidate = redirect_to.trim_end_matches('/');

        self.allowed_redirect_urls.iter().any(|allowed| {
            let allowed = allowed.trim_end_matches('/');
            allowed == candidate || wildcard_match(allowed, candidate)
        })
    }

    /// Picks the redirect target for a sign-in attempt
    ///
    /// An empty request falls back to the default redirect url.
    pub fn resolve_redirect(&self, requested: Option<&str>) -> Result<String, ProviderError> {
        match requested.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) if self.is_allowed_redirect(url) => Ok(url.to_string()),
            Some(url) => Err(ProviderError::RedirectNotAllowed(url.to_string())),
            None => self
                .default_redirect_url
                .clone()
                .ok_or_else(|| ProviderError::Settings("no default redirect url".to_string())),
        }
    }
}

/// `*` matches any run of characters except `/`
fn wildcard_match(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains('*') {
        return false;
    }

    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return false;
    };
    let Some(mut rest) = candidate.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    for (index, part) in parts.iter().enumerate() {
        let is_last = index + 1 == parts.len();
        let found = if is_last {
            rest.len()
                .checked_sub(part.len())
                .filter(|start| rest.is_char_boundary(*start) && rest[*start..] == **part)
        } else {
            rest.find(part)
        };
        let Some(start) = found else {
            return false;
        };
        if rest[..start].contains('/') {
            return false;
        }
        rest = &rest[start + part.len()..];
    }

    rest.is_empty()
}
