//! Action names shared by every flow

use crate::flow::ActionName;

pub const ACCOUNT_DELETE: ActionName = ActionName::from_static("account_delete");
pub const BACK: ActionName = ActionName::from_static("back");
pub const CONTINUE_TO_LOGIN_OTP: ActionName = ActionName::from_static("continue_to_login_otp");
pub const CONTINUE_TO_LOGIN_SECURITY_KEY: ActionName =
    ActionName::from_static("continue_to_login_security_key");
pub const CONTINUE_TO_OTP_SECRET_CREATION: ActionName =
    ActionName::from_static("continue_to_otp_secret_creation");
pub const CONTINUE_TO_PASSCODE_CONFIRMATION: ActionName =
    ActionName::from_static("continue_to_passcode_confirmation");
pub const CONTINUE_TO_PASSCODE_CONFIRMATION_RECOVERY: ActionName =
    ActionName::from_static("continue_to_passcode_confirmation_recovery");
pub const CONTINUE_TO_PASSKEY_REGISTRATION: ActionName =
    ActionName::from_static("continue_to_passkey_registration");
pub const CONTINUE_TO_PASSWORD_LOGIN: ActionName =
    ActionName::from_static("continue_to_password_login");
pub const CONTINUE_TO_PASSWORD_REGISTRATION: ActionName =
    ActionName::from_static("continue_to_password_registration");
pub const CONTINUE_TO_SECURITY_KEY_CREATION: ActionName =
    ActionName::from_static("continue_to_security_key_creation");
pub const CONTINUE_WITH_LOGIN_IDENTIFIER: ActionName =
    ActionName::from_static("continue_with_login_identifier");
pub const EMAIL_ADDRESS_SET: ActionName = ActionName::from_static("email_address_set");
pub const EMAIL_CREATE: ActionName = ActionName::from_static("email_create");
pub const EMAIL_DELETE: ActionName = ActionName::from_static("email_delete");
pub const EMAIL_SET_PRIMARY: ActionName = ActionName::from_static("email_set_primary");
pub const EMAIL_VERIFY: ActionName = ActionName::from_static("email_verify");
pub const EXCHANGE_TOKEN: ActionName = ActionName::from_static("exchange_token");
pub const OTP_CODE_VALIDATE: ActionName = ActionName::from_static("otp_code_validate");
pub const OTP_CODE_VERIFY: ActionName = ActionName::from_static("otp_code_verify");
pub const PASSWORD_CREATE: ActionName = ActionName::from_static("password_create");
pub const PASSWORD_DELETE: ActionName = ActionName::from_static("password_delete");
pub const PASSWORD_LOGIN: ActionName = ActionName::from_static("password_login");
pub const PASSWORD_RECOVERY: ActionName = ActionName::from_static("password_recovery");
pub const PASSWORD_UPDATE: ActionName = ActionName::from_static("password_update");
pub const REGISTER_CLIENT_CAPABILITIES: ActionName =
    ActionName::from_static("register_client_capabilities");
pub const REGISTER_LOGIN_IDENTIFIER: ActionName =
    ActionName::from_static("register_login_identifier");
pub const REGISTER_PASSWORD: ActionName = ActionName::from_static("register_password");
pub const RESEND_PASSCODE: ActionName = ActionName::from_static("resend_passcode");
pub const SKIP: ActionName = ActionName::from_static("skip");
pub const THIRDPARTY_OAUTH: ActionName = ActionName::from_static("thirdparty_oauth");
pub const USERNAME_CREATE: ActionName = ActionName::from_static("username_create");
pub const USERNAME_DELETE: ActionName = ActionName::from_static("username_delete");
pub const USERNAME_UPDATE: ActionName = ActionName::from_static("username_update");
pub const VERIFY_PASSCODE: ActionName = ActionName::from_static("verify_passcode");
pub const WEBAUTHN_CREDENTIAL_CREATE: ActionName =
    ActionName::from_static("webauthn_credential_create");
pub const WEBAUTHN_CREDENTIAL_DELETE: ActionName =
    ActionName::from_static("webauthn_credential_delete");
pub const WEBAUTHN_CREDENTIAL_RENAME: ActionName =
    ActionName::from_static("webauthn_credential_rename");
pub const WEBAUTHN_GENERATE_CREATION_OPTIONS: ActionName =
    ActionName::from_static("webauthn_generate_creation_options");
pub const WEBAUTHN_GENERATE_REQUEST_OPTIONS: ActionName =
    ActionName::from_static("webauthn_generate_request_options");
pub const WEBAUTHN_VERIFY_ASSERTION_RESPONSE: ActionName =
    ActionName::from_static("webauthn_verify_assertion_response");
pub const WEBAUTHN_VERIFY_ATTESTATION_RESPONSE: ActionName =
    ActionName::from_static("webauthn_verify_attestation_response");
pub const SESSION_DELETE: ActionName = ActionName::from_static("session_delete");
