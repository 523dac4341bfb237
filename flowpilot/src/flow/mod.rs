mod audit;
mod context;
mod definition;
mod engine;
mod errors;
mod input;
mod method;
mod response;
mod stash;
mod storage;
mod types;

pub use audit::{AuditSink, FatalFailure, TracingAuditSink};
pub use context::FlowContext;
pub use definition::{FlowBuilder, FlowDefinition};
pub use engine::{Execution, ExecutionOutcome, FlowEngine};
pub use errors::{ErrorCode, ErrorInfo, ErrorType, FlowError};
pub use input::{Input, InputData, InputType, PublicInput};
pub use method::{Method, MethodContext, MethodError, MethodOutcome, Transition};
pub use response::{FlowResponse, PublicAction};
pub use stash::Stash;
pub use storage::FlowStore;
pub use types::{ActionName, StateName};
