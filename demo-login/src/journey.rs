use flowpilot::flow::InputData;
use flowpilot::flows::shared::action_names;
use flowpilot::{ActionName, FlowError, FlowHost, FlowRequest, HostResponse};
use uuid::Uuid;

pub(crate) const DEMO_EMAIL: &str = "demo@example.com";
pub(crate) const DEMO_PASSWORD: &str = "demo-password";

fn print_response(step: &str, response: &HostResponse) -> Result<(), FlowError> {
    println!("--- {step}");
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

async fn submit(
    host: &FlowHost,
    flow_id: Uuid,
    action: ActionName,
    data: InputData,
) -> Result<HostResponse, FlowError> {
    let step = action.to_string();
    let response = host
        .invoke(FlowRequest {
            flow_id,
            action,
            data,
        })
        .await?;
    print_response(&step, &response)?;
    Ok(response)
}

/// Identifier, a mistyped password, then the right one
pub(crate) async fn run_password_journey(host: &FlowHost) -> Result<(), FlowError> {
    let started = host.start("/login").await?;
    print_response("start /login", &started)?;
    let flow_id = started.flow_id;

    submit(
        host,
        flow_id,
        action_names::CONTINUE_WITH_LOGIN_IDENTIFIER,
        InputData::new().with("email", DEMO_EMAIL),
    )
    .await?;
    submit(
        host,
        flow_id,
        action_names::CONTINUE_TO_PASSWORD_LOGIN,
        InputData::new(),
    )
    .await?;
    submit(
        host,
        flow_id,
        action_names::PASSWORD_LOGIN,
        InputData::new().with("password", "wrong-password"),
    )
    .await?;
    let done = submit(
        host,
        flow_id,
        action_names::PASSWORD_LOGIN,
        InputData::new().with("password", DEMO_PASSWORD),
    )
    .await?;

    tracing::info!("Password journey ended in state {}", done.response.state);
    Ok(())
}

/// Sign-in through an identity provider, completed with an exchanged token
pub(crate) async fn run_thirdparty_journey(
    host: &FlowHost,
    domain: &str,
    token: &str,
) -> Result<(), FlowError> {
    let started = host.start("/login").await?;
    let flow_id = started.flow_id;

    submit(
        host,
        flow_id,
        action_names::THIRDPARTY_OAUTH,
        InputData::new().with("provider", domain),
    )
    .await?;
    let done = submit(
        host,
        flow_id,
        action_names::EXCHANGE_TOKEN,
        InputData::new().with("token", token),
    )
    .await?;

    tracing::info!("Third-party journey ended in state {}", done.response.state);
    Ok(())
}
