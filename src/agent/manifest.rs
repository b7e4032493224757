//! Agent manifest handed to the external agent framework.
//!
//! The framework owns the model and the conversation; this crate only
//! describes the agent and the tools it may call.

use crate::agent::tools::{get_tool_definitions, ToolDefinition};
use crate::config::AgentConfig;
use serde::Serialize;

/// Everything the framework needs to construct the agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentManifest {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<ToolDefinition>,
}

impl AgentManifest {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            name: config.name.clone(),
            model: config.model.clone(),
            description: config.description.clone(),
            instruction: config.instruction.clone(),
            tools: get_tool_definitions(),
        }
    }
}
