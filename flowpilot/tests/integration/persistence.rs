use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Barrier;

use flowpilot::flow::{ErrorCode, ExecutionOutcome, InputData};
use flowpilot::{ActionName, FlowEngine, FlowError, FlowHost, FlowRequest, FlowStore, StateName};

use crate::common::{gated_flow, stepping_flow};

const STEP: ActionName = ActionName::from_static("step");

/// Test that a flow used after its ttl is reported expired and left untouched
#[tokio::test]
async fn test_expired_flow_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    // Given a flow that lives for one second in the in-memory store
    let host = FlowHost::new(FlowStore::in_memory());
    host.register(stepping_flow(Duration::from_secs(1))).await;
    let flow_id = host.start("/stepping").await?.flow_id;

    // When invoking it after the ttl elapsed
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let result = host
        .invoke(FlowRequest {
            flow_id,
            action: STEP,
            data: InputData::new(),
        })
        .await;

    // Then it is expired and gone afterwards
    let Err(err) = result else {
        panic!("expired flow must not execute");
    };
    assert!(matches!(err, FlowError::Expired { flow_id: id } if id == flow_id));
    assert_eq!(err.error_type().code, ErrorCode::FlowExpired);
    assert!(matches!(
        host.current(flow_id).await,
        Err(FlowError::NotFound { .. })
    ));
    Ok(())
}

/// Test that the engine refuses an expired context it is handed directly
#[tokio::test]
async fn test_engine_refuses_expired_context() -> Result<(), Box<dyn std::error::Error>> {
    let definition = stepping_flow(Duration::from_secs(1));
    let store = FlowStore::in_memory();
    let context = store.create(&definition).await?;

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let result = FlowEngine::default()
        .execute(&definition, &context, &STEP, InputData::new())
        .await;

    assert!(matches!(result, Err(FlowError::Expired { .. })));
    assert_eq!(context.current_state(), &StateName::from_static("start"));
    assert!(context.stash().get("steps").is_none());
    Ok(())
}

/// Test that two invocations racing on one flow produce exactly one transition
#[tokio::test]
async fn test_concurrent_invocations_conflict() -> Result<(), Box<dyn std::error::Error>> {
    // Given two requests that loaded the same flow version
    let definition = stepping_flow(Duration::from_secs(60));
    let store = FlowStore::in_memory();
    let engine = FlowEngine::default();
    let created = store.create(&definition).await?;
    let first = store.load(created.flow_id()).await?;
    let second = store.load(created.flow_id()).await?;

    // When both execute the same action and commit
    let first_run = engine
        .execute(&definition, &first, &STEP, InputData::new().with("note", "a"))
        .await?;
    let second_run = engine
        .execute(&definition, &second, &STEP, InputData::new().with("note", "b"))
        .await?;
    assert_eq!(first_run.outcome, ExecutionOutcome::Transitioned);
    assert_eq!(second_run.outcome, ExecutionOutcome::Transitioned);

    let winner = store.commit(&first_run.context, first.version()).await;
    let loser = store.commit(&second_run.context, second.version()).await;

    // Then only the first commit applies
    assert!(winner.is_ok());
    let Err(conflict) = loser else {
        panic!("second commit must conflict");
    };
    assert!(matches!(conflict, FlowError::PersistenceConflict { .. }));
    assert_eq!(conflict.error_type().code, ErrorCode::PersistenceConflict);

    let stored = store.load(created.flow_id()).await?;
    assert_eq!(stored.version(), 1);
    assert_eq!(stored.current_state(), &StateName::from_static("middle"));
    assert_eq!(stored.stash().get_str("note"), Some("a"));
    Ok(())
}

/// Test two host invocations racing on one flow through load, execute and commit
#[tokio::test]
async fn test_concurrent_host_invocations_conflict() -> Result<(), Box<dyn std::error::Error>> {
    // Given a flow whose step holds both invocations until each has loaded the flow
    let gate = Arc::new(Barrier::new(2));
    let host = FlowHost::new(FlowStore::in_memory());
    host.register(gated_flow(gate)).await;
    let flow_id = host.start("/stepping").await?.flow_id;
    let request = || FlowRequest {
        flow_id,
        action: STEP,
        data: InputData::new(),
    };

    // When both run at the same time
    let (first, second) = tokio::join!(host.invoke(request()), host.invoke(request()));

    // Then exactly one commits and the other reports the conflict
    let results = [first, second];
    let committed = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(FlowError::PersistenceConflict { .. })))
        .count();
    assert_eq!(committed, 1);
    assert_eq!(conflicts, 1);

    let stored = host.store().load(flow_id).await?;
    assert_eq!(stored.version(), 1);
    assert_eq!(stored.current_state(), &StateName::from_static("middle"));
    Ok(())
}

/// Test that a load followed by a commit without any action changes nothing
#[tokio::test]
async fn test_commit_without_action_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    // Given a flow that already moved once
    let definition = stepping_flow(Duration::from_secs(60));
    let store = FlowStore::in_memory();
    let created = store.create(&definition).await?;
    let moved = FlowEngine::default()
        .execute(&definition, &created, &STEP, InputData::new().with("note", "x"))
        .await?;
    store.commit(&moved.context, created.version()).await?;

    // When loading it and committing it back untouched
    let loaded = store.load(created.flow_id()).await?;
    let committed = store.commit(&loaded, loaded.version()).await?;

    // Then state and stash are the same, only the version moved on
    assert_eq!(committed.current_state(), loaded.current_state());
    assert_eq!(committed.stash(), loaded.stash());
    assert_eq!(committed.version(), loaded.version() + 1);
    let reloaded = store.load(created.flow_id()).await?;
    assert_eq!(reloaded.current_state(), loaded.current_state());
    assert_eq!(reloaded.stash(), loaded.stash());
    Ok(())
}

/// Test that a rejected action in a state with no actions keeps the flow intact
#[tokio::test]
async fn test_invalid_action_keeps_state() -> Result<(), Box<dyn std::error::Error>> {
    let host = FlowHost::new(FlowStore::in_memory());
    host.register(stepping_flow(Duration::from_secs(60))).await;
    let flow_id = host.start("/stepping").await?.flow_id;

    let moved = host
        .invoke(FlowRequest {
            flow_id,
            action: STEP,
            data: InputData::new(),
        })
        .await?;
    assert_eq!(moved.response.state, StateName::from_static("middle"));
    assert!(moved.response.actions.is_empty());

    let again = host
        .invoke(FlowRequest {
            flow_id,
            action: STEP,
            data: InputData::new(),
        })
        .await?;
    assert_eq!(again.response.state, StateName::from_static("middle"));
    assert_eq!(
        again.response.error.as_ref().map(|e| e.code()),
        Some(ErrorCode::InvalidAction)
    );
    Ok(())
}
