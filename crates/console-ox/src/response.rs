use serde::{Deserialize, Serialize};

/// Response of the one-shot (non-streaming) chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}
