use flowpilot::flow::{ErrorCode, InputData};
use flowpilot::flows::shared::{action_names, state_names};
use flowpilot::FlowError;
use serde_json::json;

use crate::common::{LoginFixture, TestUsers};

/// Test the password journey from the identifier to the end state
#[tokio::test]
async fn test_password_login_journey() -> Result<(), Box<dyn std::error::Error>> {
    // Given a fresh login flow
    let fixture = LoginFixture::new().await;
    let started = fixture.start().await;
    let flow_id = started.flow_id;
    assert_eq!(started.response.state, state_names::LOGIN_INIT);
    assert!(started.response.action("continue_with_login_identifier").is_some());
    assert!(started.response.action("thirdparty_oauth").is_some());

    // When the user identifies themselves
    let chooser = fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
            InputData::new().with("email", TestUsers::PASSWORD_USER_EMAIL),
        )
        .await?;

    // Then the method chooser is offered
    assert_eq!(chooser.response.state, state_names::LOGIN_METHOD_CHOOSER);
    assert!(chooser.response.error.is_none());

    // When they continue to the password and submit the right one
    let password = fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_TO_PASSWORD_LOGIN,
            InputData::new(),
        )
        .await?;
    assert_eq!(password.response.state, state_names::LOGIN_PASSWORD);

    let done = fixture
        .invoke(
            flow_id,
            action_names::PASSWORD_LOGIN,
            InputData::new().with("password", TestUsers::PASSWORD),
        )
        .await?;

    // Then the flow ends and is no longer stored
    assert_eq!(done.response.state, state_names::SUCCESS);
    assert!(done.response.actions.is_empty());
    assert!(matches!(
        fixture.host.current(flow_id).await,
        Err(FlowError::NotFound { .. })
    ));
    Ok(())
}

/// Test that a wrong password keeps the flow in place with a field error
#[tokio::test]
async fn test_wrong_password_is_retryable() -> Result<(), Box<dyn std::error::Error>> {
    // Given a flow waiting for the password
    let fixture = LoginFixture::new().await;
    let flow_id = fixture.start().await.flow_id;
    fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
            InputData::new().with("email", TestUsers::PASSWORD_USER_EMAIL),
        )
        .await?;
    fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_TO_PASSWORD_LOGIN,
            InputData::new(),
        )
        .await?;

    // When submitting the wrong password
    let rejected = fixture
        .invoke(
            flow_id,
            action_names::PASSWORD_LOGIN,
            InputData::new().with("password", "hunter2"),
        )
        .await?;

    // Then the state is unchanged and the password field carries the error
    assert_eq!(rejected.response.state, state_names::LOGIN_PASSWORD);
    let error = rejected.response.error.as_ref().expect("error expected");
    assert_eq!(error.code(), ErrorCode::ValueInvalid);
    let field = rejected
        .response
        .action("password_login")
        .and_then(|action| action.input("password"))
        .expect("password input expected");
    assert_eq!(field.error.as_ref().map(|e| e.code), Some(ErrorCode::ValueInvalid));
    assert!(field.value.is_none());

    // And a retry with the right password succeeds
    let done = fixture
        .invoke(
            flow_id,
            action_names::PASSWORD_LOGIN,
            InputData::new().with("password", TestUsers::PASSWORD),
        )
        .await?;
    assert_eq!(done.response.state, state_names::SUCCESS);
    Ok(())
}

/// Test that a malformed identifier fails validation without moving the flow
#[tokio::test]
async fn test_invalid_email_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = LoginFixture::new().await;
    let flow_id = fixture.start().await.flow_id;

    let rejected = fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
            InputData::new().with("email", "not-an-email"),
        )
        .await?;

    assert_eq!(rejected.response.state, state_names::LOGIN_INIT);
    let error = rejected.response.error.as_ref().expect("error expected");
    assert_eq!(error.code(), ErrorCode::FormDataInvalid);
    assert_eq!(error.field_errors["email"].code, ErrorCode::EmailInvalid);

    // The identifier is preserved so the client can show what was typed
    let echoed = rejected
        .response
        .action("continue_with_login_identifier")
        .and_then(|action| action.input("email"))
        .and_then(|input| input.value.clone());
    assert_eq!(echoed, Some(json!("not-an-email")));

    // And the stored flow is still in its initial state
    let current = fixture.host.current(flow_id).await?;
    assert_eq!(current.response.state, state_names::LOGIN_INIT);
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_is_a_field_error() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = LoginFixture::new().await;
    let flow_id = fixture.start().await.flow_id;

    let rejected = fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
            InputData::new().with("email", "nobody@example.com"),
        )
        .await?;

    assert_eq!(rejected.response.state, state_names::LOGIN_INIT);
    let error = rejected.response.error.as_ref().expect("error expected");
    assert_eq!(error.code(), ErrorCode::UnknownUser);
    assert_eq!(error.field_errors["email"].code, ErrorCode::UnknownUser);
    Ok(())
}

#[tokio::test]
async fn test_password_login_not_permitted_without_password(
) -> Result<(), Box<dyn std::error::Error>> {
    // Given a user who only has a passkey
    let fixture = LoginFixture::new().await;
    assert!(!fixture.passkey_user.has_password);
    let flow_id = fixture.start().await.flow_id;
    fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
            InputData::new().with("email", TestUsers::PASSKEY_ONLY_EMAIL),
        )
        .await?;

    // When asking for the password step
    let rejected = fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_TO_PASSWORD_LOGIN,
            InputData::new(),
        )
        .await?;

    // Then it is refused and the chooser stays
    assert_eq!(rejected.response.state, state_names::LOGIN_METHOD_CHOOSER);
    assert_eq!(
        rejected.response.error.as_ref().map(|e| e.code()),
        Some(ErrorCode::OperationNotPermitted)
    );
    Ok(())
}

/// Test the third-party journey through the identity provider and token exchange
#[tokio::test]
async fn test_thirdparty_login_journey() -> Result<(), Box<dyn std::error::Error>> {
    // Given a fresh login flow
    let fixture = LoginFixture::new().await;
    let flow_id = fixture.start().await.flow_id;

    // When choosing the identity provider by domain
    let redirect = fixture
        .invoke(
            flow_id,
            action_names::THIRDPARTY_OAUTH,
            InputData::new()
                .with("provider", "idp.example.com")
                .with("redirect_to", "https://app.example.com/dashboard"),
        )
        .await?;

    // Then the client is sent to the provider's SSO endpoint
    assert_eq!(redirect.response.state, state_names::THIRDPARTY_OAUTH);
    let payload = redirect.response.payload.as_ref().expect("payload expected");
    assert_eq!(payload["provider"], json!("Example IdP"));
    let redirect_url = payload["redirect_url"].as_str().unwrap_or_default();
    assert!(redirect_url.starts_with("https://idp.example.com/saml/sso?redirect_to="));

    // When the provider hands back a token for the user
    let token = fixture.users.issue_token(&fixture.password_user.id).await;
    let done = fixture
        .invoke(
            flow_id,
            action_names::EXCHANGE_TOKEN,
            InputData::new().with("token", token.as_str()),
        )
        .await?;

    // Then the flow completes
    assert_eq!(done.response.state, state_names::SUCCESS);
    Ok(())
}

#[tokio::test]
async fn test_thirdparty_rejects_unknown_domain_and_foreign_redirect(
) -> Result<(), Box<dyn std::error::Error>> {
    let fixture = LoginFixture::new().await;
    let flow_id = fixture.start().await.flow_id;

    let unknown = fixture
        .invoke(
            flow_id,
            action_names::THIRDPARTY_OAUTH,
            InputData::new().with("provider", "idp.unknown.test"),
        )
        .await?;
    let error = unknown.response.error.as_ref().expect("error expected");
    assert_eq!(
        error.field_errors["provider"].message,
        "unknown provider for domain idp.unknown.test"
    );

    let foreign = fixture
        .invoke(
            flow_id,
            action_names::THIRDPARTY_OAUTH,
            InputData::new()
                .with("provider", "idp.example.com")
                .with("redirect_to", "https://evil.example.net/steal"),
        )
        .await?;
    let error = foreign.response.error.as_ref().expect("error expected");
    assert!(error.field_errors.contains_key("redirect_to"));
    assert_eq!(foreign.response.state, state_names::LOGIN_INIT);
    Ok(())
}

#[tokio::test]
async fn test_invalid_action_and_back() -> Result<(), Box<dyn std::error::Error>> {
    // Given a flow at the method chooser
    let fixture = LoginFixture::new().await;
    let flow_id = fixture.start().await.flow_id;
    fixture
        .invoke(
            flow_id,
            action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
            InputData::new().with("email", TestUsers::PASSWORD_USER_EMAIL),
        )
        .await?;

    // When invoking an action that belongs to another state
    let rejected = fixture
        .invoke(
            flow_id,
            action_names::PASSWORD_LOGIN,
            InputData::new().with("password", TestUsers::PASSWORD),
        )
        .await?;

    // Then it is an invalid action and nothing moves
    assert_eq!(rejected.response.state, state_names::LOGIN_METHOD_CHOOSER);
    assert_eq!(
        rejected.response.error.as_ref().map(|e| e.code()),
        Some(ErrorCode::InvalidAction)
    );

    // And going back returns to the identifier step without an error
    let back = fixture
        .invoke(flow_id, action_names::BACK, InputData::new())
        .await?;
    assert_eq!(back.response.state, state_names::LOGIN_INIT);
    assert!(back.response.error.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unknown_flow_path_and_id() {
    let fixture = LoginFixture::new().await;

    assert!(matches!(
        fixture.host.start("/registration").await,
        Err(FlowError::UnknownFlow(_))
    ));
    assert!(matches!(
        fixture
            .invoke(uuid::Uuid::new_v4(), action_names::BACK, InputData::new())
            .await,
        Err(FlowError::NotFound { .. })
    ));
}
