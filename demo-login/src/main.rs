use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowpilot::flows::login::{InMemoryUserDirectory, login_flow};
use flowpilot::providers::{IdentityProviderConfig, ProviderDirectory, ProviderSettings};
use flowpilot::{FlowHost, FlowStore};

mod journey;

use crate::journey::{DEMO_EMAIL, DEMO_PASSWORD, run_password_journey, run_thirdparty_journey};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo_login=debug,flowpilot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let users = Arc::new(InMemoryUserDirectory::new());
    let user = users.add_user(DEMO_EMAIL, Some(DEMO_PASSWORD)).await;

    let providers = Arc::new(ProviderDirectory::new(provider_settings()?)?);
    let provider_count = providers.reload().await?;
    tracing::info!("{} identity provider(s) available", provider_count);

    let host = FlowHost::new(FlowStore::from_env().await?);
    host.register(login_flow(users.clone(), providers.clone())?)
        .await;

    run_password_journey(&host).await?;

    if let Some(provider) = providers.providers().await.first() {
        let token = users.issue_token(&user.id).await;
        run_thirdparty_journey(&host, &provider.domain, &token).await?;
    }

    Ok(())
}

/// Provider settings from the environment, with a sample provider when none is configured
fn provider_settings() -> Result<ProviderSettings, Box<dyn std::error::Error>> {
    let mut settings = ProviderSettings::from_env()?;
    if settings.providers.is_empty() {
        tracing::info!("IDP_PROVIDERS not set, using the sample identity provider");
        settings.providers.push(IdentityProviderConfig {
            enabled: true,
            name: "Sample IdP".to_string(),
            metadata_url: "https://idp.sample.test/saml/metadata".to_string(),
            sso_url: "https://idp.sample.test/saml/sso".to_string(),
            domain: None,
        });
    }
    if settings.default_redirect_url.is_none() {
        settings.default_redirect_url = Some("http://localhost:3001/".to_string());
    }
    Ok(settings)
}
