use bon::Builder;
use serde::{Deserialize, Serialize};

/// Body for the chat surface, streaming and one-shot alike.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
pub struct ChatRequest {
    #[builder(into)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_tools: Option<bool>,
}

/// Body for the agent-execution surface.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
pub struct AgentRunRequest {
    #[builder(into)]
    pub agent_id: String,
    #[builder(into)]
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,
}

/// Body for the multi-agent collaboration surface.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
pub struct CollaborationRequest {
    #[builder(into)]
    pub task: String,
    /// Roles to recruit, in speaking order.
    pub agents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
}
