use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control request envelope.
#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    pub seq: i64,
    #[serde(rename = "type")]
    pub r#type: String,
    pub command: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Control response envelope.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    pub seq: i64,
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub request_seq: i64,
    pub success: bool,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(request_seq: i64, command: &str, body: Option<Value>) -> Self {
        Self {
            seq: 0,
            r#type: "response",
            request_seq,
            success: true,
            command: command.to_string(),
            message: None,
            body,
        }
    }

    pub fn error(request_seq: i64, command: &str, message: impl ToString) -> Self {
        Self {
            seq: 0,
            r#type: "response",
            request_seq,
            success: false,
            command: command.to_string(),
            message: Some(message.to_string()),
            body: None,
        }
    }
}

/// Control event envelope.
#[derive(Debug, Serialize)]
pub struct EventEnvelope {
    pub seq: i64,
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl EventEnvelope {
    pub fn new(event: &'static str, body: Option<Value>) -> Self {
        Self {
            seq: 0,
            r#type: "event",
            event,
            body,
        }
    }
}

/// Names of events pushed to the client.
pub mod event {
    pub const BREAKPOINT: &str = "breakpoint";
    pub const STEP: &str = "step";
    pub const EXCEPTION: &str = "exception";
    pub const CLOCK: &str = "clock";
    pub const SYNCH: &str = "synch";
    pub const VALUE: &str = "value";
    pub const STOP: &str = "stop";
    pub const OUTPUT: &str = "output";
}
