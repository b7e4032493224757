//! Tool definitions for the marketing data agent.
//!
//! This module defines the tools that the LLM can invoke and the
//! executor that runs them. Every tool answers with a status-tagged
//! object: `{"status": "success", ...}` or
//! `{"status": "error", "error_message": "..."}`.

use crate::analysis::{analyze_marketing_data, analyze_mom_data};
use crate::dataset::DatasetLoader;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

pub const ANALYZE_MARKETING_DATA: &str = "analyze_marketing_data";
pub const ANALYZE_MOM_DATA: &str = "analyze_mom_data";

/// Tool definition in the function-calling format.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool call made by the LLM.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// Status-tagged result of executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResponse {
    /// Payload fields sit next to `"status": "success"`.
    Success(Map<String, Value>),
    Error { error_message: String },
}

impl ToolResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ToolResponse::Error {
            error_message: message.into(),
        }
    }

    /// Flatten an analysis result into a response.
    pub fn from_result<T: Serialize>(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(Value::Object(fields)) => ToolResponse::Success(fields),
                Ok(other) => ToolResponse::error(format!(
                    "Tool produced a non-object payload: {}",
                    other
                )),
                Err(e) => ToolResponse::error(format!("Failed to encode tool output: {}", e)),
            },
            Err(e) => ToolResponse::error(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success(_))
    }

    /// The response as a JSON value, for handing back to the framework.
    pub fn to_value(&self) -> Value {
        match self {
            ToolResponse::Success(fields) => {
                let mut object = Map::with_capacity(fields.len() + 1);
                object.insert("status".to_string(), json!("success"));
                object.extend(fields.clone());
                Value::Object(object)
            }
            ToolResponse::Error { error_message } => json!({
                "status": "error",
                "error_message": error_message,
            }),
        }
    }
}

/// Runs tool calls against the dataset.
pub struct ToolExecutor {
    loader: DatasetLoader,
}

impl ToolExecutor {
    /// Create a new tool executor reading through `loader`.
    pub fn new(loader: DatasetLoader) -> Self {
        Self { loader }
    }

    /// Execute a tool call and return the result.
    pub fn execute(&self, tool_call: &ToolCall) -> ToolResponse {
        let name = &tool_call.function.name;
        let args = &tool_call.function.arguments;

        debug!("Executing tool: {} with args: {:?}", name, args);

        let response = match name.as_str() {
            ANALYZE_MARKETING_DATA => {
                ToolResponse::from_result(analyze_marketing_data(&self.loader))
            }
            ANALYZE_MOM_DATA => self.mom_data(args),
            _ => ToolResponse::error(format!("Unknown tool: {}", name)),
        };

        if let ToolResponse::Error { error_message } = &response {
            warn!("Tool {} failed: {}", name, error_message);
        }
        response
    }

    /// Compare two periods month over month.
    fn mom_data(&self, args: &Value) -> ToolResponse {
        let period1 = match string_arg(args, "period1") {
            Ok(p) => p,
            Err(response) => return response,
        };
        let period2 = match string_arg(args, "period2") {
            Ok(p) => p,
            Err(response) => return response,
        };

        ToolResponse::from_result(analyze_mom_data(&self.loader, period1, period2))
    }
}

fn string_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolResponse> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolResponse::error(format!("Missing required parameter: {}", name)))
}

/// Get the tool definitions exposed to the LLM.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: ANALYZE_MARKETING_DATA.to_string(),
                description: "Analyzes the marketing campaign dataset and provides basic insights. Use this tool when the user asks about marketing data, campaign performance, or wants statistics about the data.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
        },
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: ANALYZE_MOM_DATA.to_string(),
                description: "Analyzes Month-over-Month (MoM) marketing data comparing two periods. Use this tool when the user wants to compare marketing performance between two periods. Periods look like 'Feb 24', 'March 2025' or 'Jan 2025'.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "period1": {
                            "type": "string",
                            "description": "First period to compare (e.g., 'Feb 24', 'March 2025')"
                        },
                        "period2": {
                            "type": "string",
                            "description": "Second period to compare (e.g., 'Feb 25', 'March 2024')"
                        }
                    },
                    "required": ["period1", "period2"]
                }),
            },
        },
    ]
}
