//! Login flow
//!
//! ```text
//! login_init ──continue_with_login_identifier──> login_method_chooser
//!     │                                               │  continue_to_password_login
//!     │ thirdparty_oauth                              v
//!     v                                          login_password ──password_login──> success
//! thirdparty_oauth ──exchange_token──> success
//! ```
//!
//! The three intermediate states also offer `back`.

mod actions;
mod directory;

use std::sync::Arc;

use crate::flow::{FlowBuilder, FlowDefinition, FlowError};
use crate::flows::shared::{stash_paths, state_names};
use crate::providers::ProviderDirectory;

pub use actions::{
    Back, ContinueToPasswordLogin, ContinueWithLoginIdentifier, ExchangeToken, PasswordLogin,
    ThirdPartyOAuth,
};
pub use directory::{DirectoryError, InMemoryUserDirectory, UserDirectory, UserRecord};

pub const LOGIN_PATH: &str = "/login";

/// Stash path of the domain chosen for third-party sign-in
pub const THIRDPARTY_PROVIDER: &str = "thirdparty.provider";
/// Stash path of the redirect target for third-party sign-in
pub const THIRDPARTY_REDIRECT_TO: &str = "thirdparty.redirect_to";

pub const LOGIN_METHOD_PASSWORD: &str = "password";
pub const LOGIN_METHOD_THIRDPARTY: &str = "thirdparty";

/// Builds the login flow over the given collaborators
pub fn login_flow(
    users: Arc<dyn UserDirectory>,
    providers: Arc<ProviderDirectory>,
) -> Result<FlowDefinition, FlowError> {
    FlowBuilder::new(LOGIN_PATH)
        .state(state_names::LOGIN_INIT)
        .method(ContinueWithLoginIdentifier::new(users.clone()))
        .method(ThirdPartyOAuth::new(providers))
        .state(state_names::LOGIN_METHOD_CHOOSER)
        .method(ContinueToPasswordLogin)
        .method(Back::to(state_names::LOGIN_INIT))
        .state(state_names::LOGIN_PASSWORD)
        .method(PasswordLogin::new(users.clone()))
        .method(Back::to(state_names::LOGIN_METHOD_CHOOSER))
        .state(state_names::THIRDPARTY_OAUTH)
        .method(ExchangeToken::new(users))
        .method(Back::to(state_names::LOGIN_INIT))
        .state(state_names::SUCCESS)
        .state(state_names::ERROR)
        .fixed_states(
            state_names::LOGIN_INIT,
            state_names::ERROR,
            state_names::SUCCESS,
        )
        .clear_on_fatal([stash_paths::USER_ID, THIRDPARTY_REDIRECT_TO])
        .build()
}
