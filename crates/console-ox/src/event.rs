use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One semantic event decoded from a console event stream.
///
/// The backend's frames are loosely typed JSON; [`StreamEvent::from_payload`]
/// normalizes every observed variant into this closed union so the rest of
/// the crate never touches raw wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// An incremental piece of generated text.
    Token { text: String },
    /// The backend is in an intermediate reasoning pass.
    Thinking { iteration: u32 },
    /// The backend is invoking a named capability.
    ToolCall {
        tool_name: String,
        arguments: serde_json::Map<String, Value>,
    },
    /// Outcome of a prior tool call.
    ToolResult {
        tool_name: String,
        result: Value,
        succeeded: bool,
    },
    /// Progress marker in a multi-agent or multi-step plan.
    AgentStep {
        role: String,
        iteration: u32,
        total_iterations: u32,
    },
    /// Terminal success event.
    Completion {
        final_text: String,
        tools_used: Vec<String>,
        elapsed_ms: u64,
    },
    /// Terminal failure event.
    StreamError { message: String },
}

/// Loose view of one wire frame, before classification.
///
/// Every field is optional because the backend only sends the ones relevant
/// to the frame's `type`; classification decides what is required.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    iteration: Option<u32>,
    #[serde(default)]
    total_iterations: Option<u32>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    arguments: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    tools_used: Option<Vec<String>>,
    #[serde(default)]
    latency_ms: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

impl StreamEvent {
    /// Classify one decoded frame payload into an event.
    ///
    /// Returns `None` for anything that is not a well-formed frame of a known
    /// `type` — malformed JSON, heartbeat payloads, and frames from newer
    /// protocol revisions are all expected stream artifacts, not failures.
    /// Drops are logged at debug level so a protocol mismatch stays visible.
    pub fn from_payload(payload: &str) -> Option<Self> {
        let frame: RawFrame = match serde_json::from_str(payload) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(%err, payload = %snippet(payload), "dropping malformed frame");
                return None;
            }
        };

        let event = match frame.kind.as_str() {
            "token" => Self::Token {
                text: token_text(frame.data?)?,
            },
            "thinking" => Self::Thinking {
                iteration: frame.iteration.unwrap_or(0),
            },
            "tool_call" => Self::ToolCall {
                tool_name: frame.tool?,
                arguments: frame.arguments.unwrap_or_default(),
            },
            "tool_result" => Self::ToolResult {
                tool_name: frame.tool?,
                result: frame.result.unwrap_or(Value::Null),
                succeeded: frame.success.unwrap_or(true),
            },
            "agent_step" => Self::AgentStep {
                role: frame.role?,
                iteration: frame.iteration.unwrap_or(0),
                total_iterations: frame.total_iterations.unwrap_or(0),
            },
            "done" | "complete" => Self::Completion {
                final_text: frame.response.unwrap_or_default(),
                tools_used: frame.tools_used.unwrap_or_default(),
                elapsed_ms: frame.latency_ms.unwrap_or(0),
            },
            "error" => Self::StreamError {
                message: error_message(&frame)?,
            },
            other => {
                tracing::debug!(kind = %other, "dropping frame with unrecognized type");
                return None;
            }
        };

        Some(event)
    }

    /// Whether this event ends its transcript.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion { .. } | Self::StreamError { .. })
    }

    /// Returns a descriptive name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Token { .. } => "Token",
            Self::Thinking { .. } => "Thinking",
            Self::ToolCall { .. } => "ToolCall",
            Self::ToolResult { .. } => "ToolResult",
            Self::AgentStep { .. } => "AgentStep",
            Self::Completion { .. } => "Completion",
            Self::StreamError { .. } => "StreamError",
        }
    }
}

/// Normalize the two observed token payload shapes into one text fragment.
///
/// The chat endpoint sends `"data": "text"`, the agent endpoints send
/// `"data": {"chunk": "text"}` or `"data": {"content": "text"}`.
fn token_text(data: Value) -> Option<String> {
    match data {
        Value::String(text) => Some(text),
        Value::Object(mut obj) => match obj.remove("chunk").or_else(|| obj.remove("content")) {
            Some(Value::String(text)) => Some(text),
            _ => None,
        },
        _ => None,
    }
}

/// Error frames carry their message in `data` on most routes and in
/// `message` on older ones.
fn error_message(frame: &RawFrame) -> Option<String> {
    if let Some(Value::String(message)) = &frame.data {
        return Some(message.clone());
    }
    frame.message.clone()
}

/// Truncate a payload for diagnostics without splitting a code point.
fn snippet(payload: &str) -> String {
    payload.chars().take(120).collect()
}
