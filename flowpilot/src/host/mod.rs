//! Glue between a request handler, the engine and the flow store

mod handler;
mod registry;

pub use handler::{FlowHost, FlowRequest, HostResponse};
pub use registry::FlowRegistry;
