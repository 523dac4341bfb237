//! Stash paths shared by every flow
//!
//! The values are wire-compatible keys; keep them byte for byte.

pub const EMAIL: &str = "email";
pub const EMAIL_VERIFIED: &str = "email_verified";
pub const LOGIN_METHOD: &str = "login_method";
pub const LOGIN_ONBOARDING_CREATE_EMAIL: &str = "login_onboarding_create_email";
pub const LOGIN_ONBOARDING_SCHEDULED: &str = "login_onboarding_scheduled";
pub const MFA_USAGE_METHOD: &str = "mfa_method";
pub const CREATE_MFA_ONLY_CREDENTIAL: &str = "create_mfa_only_credential";
pub const NEW_PASSWORD: &str = "new_password";
pub const OTP_SECRET: &str = "otp_secret";
pub const OTP_IMAGE_SOURCE: &str = "otp_image_src";
pub const PASSCODE_EMAIL: &str = "sticky.passcode_email";
pub const PASSCODE_ID: &str = "sticky.passcode_id";
pub const PASSCODE_TEMPLATE: &str = "passcode_template";
pub const SKIP_USER_CREATION: &str = "skip_user_creation";
pub const USER_HAS_EMAILS: &str = "user_has_emails";
pub const USER_HAS_OTP_SECRET: &str = "user_hat_otp_secret";
pub const USER_HAS_PASSKEY: &str = "user_has_passkey";
pub const USER_HAS_PASSWORD: &str = "user_has_password";
pub const USER_HAS_SECURITY_KEY: &str = "user_has_security_key";
pub const USER_HAS_USERNAME: &str = "user_has_username";
pub const USER_HAS_WEBAUTHN_CREDENTIAL: &str = "user_has_webauthn_credential";
pub const USER_ID: &str = "user_id";
pub const USER_IDENTIFICATION: &str = "user_identification";
pub const USERNAME: &str = "username";
pub const WEBAUTHN_AVAILABLE: &str = "webauthn_available";
pub const WEBAUTHN_CONDITIONAL_MEDIATION_AVAILABLE: &str =
    "webauthn_conditional_mediation_available";
pub const WEBAUTHN_CREDENTIALS: &str = "webauthn_credentials";
pub const WEBAUTHN_PLATFORM_AUTHENTICATOR_AVAILABLE: &str =
    "webauthn_platform_authenticator_available";
pub const WEBAUTHN_SESSION_DATA_ID: &str = "webauthn_session_data_id";
