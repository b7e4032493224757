//! Agent-facing surface: tool definitions, the tool executor and the
//! agent manifest.

pub mod manifest;
pub mod tools;

pub use manifest::AgentManifest;
pub use tools::{ToolCall, ToolExecutor};
