use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;
use flowpilot::flow::{
    ErrorCode, FlowBuilder, FlowDefinition, Input, InputData, Method, MethodContext, MethodError,
    MethodOutcome,
};
use flowpilot::flows::login::{InMemoryUserDirectory, UserRecord, login_flow};
use flowpilot::providers::{IdentityProviderConfig, ProviderDirectory, ProviderSettings};
use flowpilot::{
    ActionName, FlowError, FlowHost, FlowRequest, FlowStore, HostResponse, StateName,
};
use uuid::Uuid;

/// Test user fixtures for integration testing
pub struct TestUsers;

impl TestUsers {
    pub const PASSWORD_USER_EMAIL: &'static str = "password-user@example.com";
    pub const PASSWORD: &'static str = "correct horse battery staple";
    pub const PASSKEY_ONLY_EMAIL: &'static str = "passkey-user@example.com";
}

/// Provider settings with one identity provider and an allow-listed app origin
pub fn provider_settings() -> ProviderSettings {
    ProviderSettings {
        providers: vec![IdentityProviderConfig {
            enabled: true,
            name: "Example IdP".to_string(),
            metadata_url: "https://idp.example.com/saml/metadata".to_string(),
            sso_url: "https://idp.example.com/saml/sso".to_string(),
            domain: None,
        }],
        allowed_redirect_urls: vec!["https://app.example.com/*".to_string()],
        default_redirect_url: Some("https://app.example.com/welcome".to_string()),
    }
}

/// A host with the login flow registered and two users in the directory
pub struct LoginFixture {
    pub host: FlowHost,
    pub users: Arc<InMemoryUserDirectory>,
    pub password_user: UserRecord,
    pub passkey_user: UserRecord,
}

impl LoginFixture {
    pub async fn new() -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        let password_user = users
            .add_user(TestUsers::PASSWORD_USER_EMAIL, Some(TestUsers::PASSWORD))
            .await;
        let passkey_user = users.add_user(TestUsers::PASSKEY_ONLY_EMAIL, None).await;

        let providers = match ProviderDirectory::new(provider_settings()) {
            Ok(providers) => Arc::new(providers),
            Err(e) => panic!("Invalid provider settings: {e}"),
        };

        let host = FlowHost::new(FlowStore::in_memory());
        host.register(login_flow(users.clone(), providers).expect("login flow must build"))
            .await;

        Self {
            host,
            users,
            password_user,
            passkey_user,
        }
    }

    pub async fn start(&self) -> HostResponse {
        self.host.start("/login").await.expect("login flow must start")
    }

    pub async fn invoke(
        &self,
        flow_id: Uuid,
        action: ActionName,
        data: InputData,
    ) -> Result<HostResponse, FlowError> {
        self.host
            .invoke(FlowRequest {
                flow_id,
                action,
                data,
            })
            .await
    }
}

/// Moves from `start` to `middle` and records the step in the stash
pub struct Step;

#[async_trait]
impl Method for Step {
    fn name(&self) -> ActionName {
        ActionName::from_static("step")
    }

    fn inputs(&self) -> Vec<Input> {
        vec![Input::string("note").max_length(32)]
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![StateName::from_static("middle")]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        ctx.stash_mut()
            .set("steps.last", "step")
            .map_err(|e| MethodError::fatal_with_cause(ErrorCode::Technical, e))?;
        Ok(MethodOutcome::transition(StateName::from_static("middle")))
    }
}

/// Like [`Step`] but waits until every party of `gate` is inside the method
pub struct GatedStep {
    pub gate: Arc<Barrier>,
}

#[async_trait]
impl Method for GatedStep {
    fn name(&self) -> ActionName {
        ActionName::from_static("step")
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![StateName::from_static("middle")]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        self.gate.wait().await;
        Step.execute(ctx).await
    }
}

/// `start --step--> middle` with `done` and `error`, living for `ttl`
pub fn stepping_flow(ttl: Duration) -> FlowDefinition {
    stepping_flow_with(ttl, Step)
}

/// [`stepping_flow`] whose step holds invocations at `gate`
pub fn gated_flow(gate: Arc<Barrier>) -> FlowDefinition {
    stepping_flow_with(Duration::from_secs(60), GatedStep { gate })
}

fn stepping_flow_with(ttl: Duration, step: impl Method) -> FlowDefinition {
    FlowBuilder::new("/stepping")
        .ttl(ttl)
        .state(StateName::from_static("start"))
        .method(step)
        .state(StateName::from_static("middle"))
        .state(StateName::from_static("done"))
        .state(StateName::from_static("error"))
        .fixed_states(
            StateName::from_static("start"),
            StateName::from_static("error"),
            StateName::from_static("done"),
        )
        .build()
        .expect("stepping flow must build")
}
