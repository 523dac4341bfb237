//! flowpilot - State-machine orchestration for multi-step authentication flows
//!
//! A flow is a named state machine whose transitions are actions submitted by a
//! client. Each action validates its inputs, runs a method against the flow's
//! stash and moves the flow to one of the states it is allowed to reach. Flow
//! contexts live in a cache store and are committed with optimistic versioning.
//!
//! The [`flows`] module carries the login flow built on this engine.

mod config;
pub mod flow;
pub mod flows;
pub mod host;
pub mod providers;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use config::{
    FLOW_CACHE_PREFIX, FLOW_DEFAULT_TTL, FLOW_EXPIRED_RETENTION, FLOW_ID_COLLISION_ATTEMPTS,
};

pub use flow::{
    ActionName, FlowBuilder, FlowContext, FlowDefinition, FlowEngine, FlowError, FlowResponse,
    FlowStore, StateName,
};

pub use host::{FlowHost, FlowRegistry, FlowRequest, HostResponse};
