// MCP tool surface over the local task store

pub mod api;
pub mod tools;

pub use tools::DevFlowServer;
