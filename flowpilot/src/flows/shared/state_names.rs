//! State names shared by every flow

use crate::flow::StateName;

pub const ERROR: StateName = StateName::from_static("error");
pub const LOGIN_INIT: StateName = StateName::from_static("login_init");
pub const LOGIN_METHOD_CHOOSER: StateName = StateName::from_static("login_method_chooser");
pub const LOGIN_PASSKEY: StateName = StateName::from_static("login_passkey");
pub const LOGIN_PASSWORD: StateName = StateName::from_static("login_password");
pub const LOGIN_PASSWORD_RECOVERY: StateName = StateName::from_static("login_password_recovery");
pub const ONBOARDING_CREATE_PASSKEY: StateName =
    StateName::from_static("onboarding_create_passkey");
pub const ONBOARDING_VERIFY_PASSKEY_ATTESTATION: StateName =
    StateName::from_static("onboarding_verify_passkey_attestation");
pub const PASSCODE_CONFIRMATION: StateName = StateName::from_static("passcode_confirmation");
pub const PASSWORD_CREATION: StateName = StateName::from_static("password_creation");
pub const PREFLIGHT: StateName = StateName::from_static("preflight");
pub const PROFILE_ACCOUNT_DELETED: StateName = StateName::from_static("account_deleted");
pub const PROFILE_INIT: StateName = StateName::from_static("profile_init");
pub const PROFILE_WEBAUTHN_CREDENTIAL_VERIFICATION: StateName =
    StateName::from_static("webauthn_credential_verification");
pub const REGISTER_PASSKEY: StateName = StateName::from_static("register_passkey");
pub const REGISTRATION_INIT: StateName = StateName::from_static("registration_init");
pub const REGISTRATION_METHOD_CHOOSER: StateName =
    StateName::from_static("registration_method_chooser");
pub const SUCCESS: StateName = StateName::from_static("success");
pub const THIRDPARTY_OAUTH: StateName = StateName::from_static("thirdparty_oauth");
