//! Flows built on the engine

pub mod login;
pub mod shared;
