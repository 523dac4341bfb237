use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::flow::{
    ActionName, ErrorCode, ErrorType, FlowError, Input, Method, MethodContext, MethodError,
    MethodOutcome, StateName,
};
use crate::flows::shared::{action_names, stash_paths, state_names};
use crate::providers::{ProviderDirectory, ProviderError};

use super::directory::{DirectoryError, UserDirectory};
use super::{LOGIN_METHOD_PASSWORD, LOGIN_METHOD_THIRDPARTY, THIRDPARTY_PROVIDER, THIRDPARTY_REDIRECT_TO};

fn stash_failure(err: FlowError) -> MethodError {
    MethodError::fatal_with_cause(ErrorCode::Technical, err)
}

fn directory_failure(err: DirectoryError) -> MethodError {
    MethodError::fatal_with_cause(ErrorCode::Technical, err)
}

/// Looks up the account for the submitted email address
pub struct ContinueWithLoginIdentifier {
    users: Arc<dyn UserDirectory>,
}

impl ContinueWithLoginIdentifier {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Method for ContinueWithLoginIdentifier {
    fn name(&self) -> ActionName {
        action_names::CONTINUE_WITH_LOGIN_IDENTIFIER
    }

    fn inputs(&self) -> Vec<Input> {
        vec![
            Input::email(stash_paths::EMAIL)
                .required(true)
                .max_length(255)
                .preserve(true),
        ]
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![state_names::LOGIN_METHOD_CHOOSER]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        let email = ctx
            .input()
            .get_str(stash_paths::EMAIL)
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(directory_failure)?
            .ok_or_else(|| {
                MethodError::recoverable_field(stash_paths::EMAIL, ErrorCode::UnknownUser)
            })?;

        let stash = ctx.stash_mut();
        stash.set(stash_paths::EMAIL, email).map_err(stash_failure)?;
        stash
            .set(stash_paths::USER_ID, user.id.as_str())
            .map_err(stash_failure)?;
        stash
            .set(stash_paths::USER_HAS_PASSWORD, user.has_password)
            .map_err(stash_failure)?;
        stash
            .set(stash_paths::USER_HAS_PASSKEY, user.has_passkey)
            .map_err(stash_failure)?;

        Ok(MethodOutcome::transition(state_names::LOGIN_METHOD_CHOOSER))
    }
}

/// Starts sign-in with a third-party identity provider
pub struct ThirdPartyOAuth {
    providers: Arc<ProviderDirectory>,
}

impl ThirdPartyOAuth {
    pub fn new(providers: Arc<ProviderDirectory>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl Method for ThirdPartyOAuth {
    fn name(&self) -> ActionName {
        action_names::THIRDPARTY_OAUTH
    }

    fn inputs(&self) -> Vec<Input> {
        vec![
            Input::string("provider").required(true).persist(false),
            Input::string("redirect_to").persist(false),
        ]
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![state_names::THIRDPARTY_OAUTH]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        let domain = ctx.input().get_str("provider").unwrap_or_default().trim();

        let provider = self.providers.by_domain(domain).await.map_err(|e| {
            MethodError::recoverable_field(
                "provider",
                ErrorType::with_message(ErrorCode::ValueInvalid, e.to_string()),
            )
        })?;

        let redirect_to = self
            .providers
            .resolve_redirect(ctx.input().get_str("redirect_to"))
            .map_err(|e| match e {
                ProviderError::RedirectNotAllowed(_) => MethodError::recoverable_field(
                    "redirect_to",
                    ErrorType::with_message(ErrorCode::ValueInvalid, e.to_string()),
                ),
                other => MethodError::fatal_with_cause(ErrorCode::Technical, other),
            })?;

        let mut auth_url = provider.sso_url.clone();
        auth_url
            .query_pairs_mut()
            .append_pair("redirect_to", &redirect_to);

        let stash = ctx.stash_mut();
        stash
            .set(THIRDPARTY_PROVIDER, provider.domain.as_str())
            .map_err(stash_failure)?;
        stash
            .set(THIRDPARTY_REDIRECT_TO, redirect_to.as_str())
            .map_err(stash_failure)?;

        tracing::debug!("Redirecting to identity provider {}", provider.name);
        Ok(
            MethodOutcome::transition(state_names::THIRDPARTY_OAUTH).with_payload(json!({
                "provider": provider.name,
                "redirect_url": auth_url.as_str(),
            })),
        )
    }
}

/// Completes a third-party sign-in by redeeming the token it produced
pub struct ExchangeToken {
    users: Arc<dyn UserDirectory>,
}

impl ExchangeToken {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Method for ExchangeToken {
    fn name(&self) -> ActionName {
        action_names::EXCHANGE_TOKEN
    }

    fn inputs(&self) -> Vec<Input> {
        vec![
            Input::string("token")
                .required(true)
                .hidden(true)
                .persist(false),
        ]
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![state_names::SUCCESS]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        let token = ctx.input().get_str("token").unwrap_or_default();

        let user_id = self
            .users
            .exchange_token(token)
            .await
            .map_err(directory_failure)?
            .ok_or_else(|| MethodError::recoverable_field("token", ErrorCode::ValueInvalid))?;

        let stash = ctx.stash_mut();
        stash
            .set(stash_paths::USER_ID, user_id)
            .map_err(stash_failure)?;
        stash
            .set(stash_paths::LOGIN_METHOD, LOGIN_METHOD_THIRDPARTY)
            .map_err(stash_failure)?;

        Ok(MethodOutcome::transition(state_names::SUCCESS))
    }
}

pub struct ContinueToPasswordLogin;

#[async_trait]
impl Method for ContinueToPasswordLogin {
    fn name(&self) -> ActionName {
        action_names::CONTINUE_TO_PASSWORD_LOGIN
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![state_names::LOGIN_PASSWORD]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        if ctx.stash().get_bool(stash_paths::USER_HAS_PASSWORD) != Some(true) {
            return Err(MethodError::recoverable(ErrorType::with_message(
                ErrorCode::OperationNotPermitted,
                "The account has no password.",
            )));
        }
        Ok(MethodOutcome::transition(state_names::LOGIN_PASSWORD))
    }
}

/// Checks the password of the user identified earlier in the flow
pub struct PasswordLogin {
    users: Arc<dyn UserDirectory>,
}

impl PasswordLogin {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Method for PasswordLogin {
    fn name(&self) -> ActionName {
        action_names::PASSWORD_LOGIN
    }

    fn inputs(&self) -> Vec<Input> {
        vec![Input::password("password").required(true)]
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![state_names::SUCCESS]
    }

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        let user_id = ctx
            .stash()
            .get_str(stash_paths::USER_ID)
            .map(str::to_string)
            .ok_or_else(|| {
                MethodError::fatal_with_cause(ErrorCode::Technical, "no user in flow stash")
            })?;
        let password = ctx.input().get_str("password").unwrap_or_default();

        let valid = self
            .users
            .verify_password(&user_id, password)
            .await
            .map_err(directory_failure)?;
        if !valid {
            return Err(MethodError::recoverable_field(
                "password",
                ErrorType::with_message(ErrorCode::ValueInvalid, "The password is wrong."),
            ));
        }

        ctx.stash_mut()
            .set(stash_paths::LOGIN_METHOD, LOGIN_METHOD_PASSWORD)
            .map_err(stash_failure)?;
        Ok(MethodOutcome::transition(state_names::SUCCESS))
    }
}

/// Returns to a fixed previous state
pub struct Back {
    target: StateName,
}

impl Back {
    pub fn to(target: StateName) -> Self {
        Self { target }
    }
}

#[async_trait]
impl Method for Back {
    fn name(&self) -> ActionName {
        action_names::BACK
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        vec![self.target.clone()]
    }

    async fn execute(&self, _ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        Ok(MethodOutcome::transition(self.target.clone()))
    }
}
