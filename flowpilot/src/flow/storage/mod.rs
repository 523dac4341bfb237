mod store;

pub use store::FlowStore;
