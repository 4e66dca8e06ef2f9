//! Built-in `clock` tool API

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde_json::{Value, json};
use std::fmt::Display;
use xai_conversation_core::tooling::{ToolApi, ToolError};
use xai_conversation_core::types::{ToolInput, ToolSpec};

pub const CLOCK_API_ID: &str = "clock";
const GET_TIME: &str = "get_current_time";

pub struct ClockApi;

#[async_trait]
impl ToolApi for ClockApi {
    fn id(&self) -> &str {
        CLOCK_API_ID
    }

    fn prompt(&self) -> Option<String> {
        Some("Use get_current_time when asked about the current date or time.".to_string())
    }

    fn tools(&self) -> Vec<ToolSpec> {
        vec![ToolSpec {
            name: GET_TIME.to_string(),
            description: Some("Current date and time, local unless utc is true".to_string()),
            parameters: json!({
                "type": "object",
                "properties": {
                    "utc": {"type": "boolean", "description": "Report UTC instead of local time"}
                }
            }),
        }]
    }

    async fn call_tool(&self, input: &ToolInput) -> Result<Value, ToolError> {
        if input.tool_name != GET_TIME {
            return Err(ToolError::UnknownTool {
                api: CLOCK_API_ID.to_string(),
                tool: input.tool_name.clone(),
            });
        }
        let utc = match input.tool_args.get("utc") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(ToolError::invalid_arguments(
                    GET_TIME,
                    format!("utc must be a boolean, got {other}"),
                ));
            }
        };
        Ok(if utc { describe(Utc::now()) } else { describe(Local::now()) })
    }
}

fn describe<Tz>(now: DateTime<Tz>) -> Value
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    json!({
        "iso8601": now.to_rfc3339(),
        "date": now.format("%Y-%m-%d").to_string(),
        "time": now.format("%H:%M:%S").to_string(),
        "weekday": now.format("%A").to_string(),
        "utc_offset": now.format("%:z").to_string(),
    })
}
