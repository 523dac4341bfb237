//! Shared helpers for unit tests across the crate

use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;

use crate::flow::{
    ActionName, FlowBuilder, FlowDefinition, Method, MethodContext, MethodError, MethodOutcome,
    StateName,
};

pub(crate) const START: StateName = StateName::from_static("start");
pub(crate) const DONE: StateName = StateName::from_static("done");
pub(crate) const ERROR: StateName = StateName::from_static("error");

/// Loads `.env_test` (falling back to `.env`) once per test binary
pub(crate) fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// Method without inputs that always moves to its first target
pub(crate) struct StaticMethod {
    name: &'static str,
    targets: Vec<StateName>,
}

impl StaticMethod {
    pub(crate) fn new(name: &'static str, targets: impl IntoIterator<Item = StateName>) -> Self {
        Self {
            name,
            targets: targets.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Method for StaticMethod {
    fn name(&self) -> ActionName {
        ActionName::from_static(self.name)
    }

    fn allowed_targets(&self) -> Vec<StateName> {
        self.targets.clone()
    }

    async fn execute(&self, _ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError> {
        let next = self.targets.first().cloned().unwrap_or(ERROR);
        Ok(MethodOutcome::transition(next))
    }
}

/// `start --go--> done` with an `error` state and a 60 second ttl
pub(crate) fn test_definition() -> FlowDefinition {
    init_test_environment();
    match FlowBuilder::new("/test")
        .ttl(Duration::from_secs(60))
        .state(START)
        .method(StaticMethod::new("go", [DONE]))
        .state(DONE)
        .state(ERROR)
        .fixed_states(START, ERROR, DONE)
        .build()
    {
        Ok(definition) => definition,
        Err(e) => panic!("test definition must build: {e}"),
    }
}
