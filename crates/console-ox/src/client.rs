use std::collections::HashMap;

use bon::Builder;
use console_ox_common::request_builder::{Endpoint, HttpMethod};
use core::fmt;

use crate::{
    error::ConsoleRequestError,
    internal::ConsoleRequestHelper,
    request::{AgentRunRequest, ChatRequest, CollaborationRequest},
    response::ChatResponse,
    stream::StreamHandle,
};

const BASE_URL: &str = "http://localhost:8000";
const CHAT_URL: &str = "api/chat";
const CHAT_STREAM_URL: &str = "api/chat/stream";
const AGENT_STREAM_URL: &str = "api/agents/execute/stream";
const COLLABORATION_STREAM_URL: &str = "api/collaboration/stream";

/// Client for the console backend.
///
/// One instance serves every page: the one-shot endpoints return plain
/// responses, the streaming endpoints return a [`StreamHandle`] that owns the
/// request's lifecycle. Handles are independent; several may be live at once.
#[derive(Clone, Default, Builder)]
pub struct Console {
    #[builder(into)]
    pub(crate) api_key: Option<String>,
    #[builder(default)]
    pub(crate) client: reqwest::Client,
    #[builder(default = BASE_URL.to_string(), into)]
    pub(crate) base_url: String,
    #[builder(default)]
    pub(crate) headers: HashMap<String, String>,
}

impl Console {
    /// Create a new client against the given backend URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn load_from_env() -> Result<Self, std::env::VarError> {
        let base_url = std::env::var("CONSOLE_API_URL")?;
        let api_key = std::env::var("CONSOLE_API_KEY").ok();
        Ok(Console::builder()
            .maybe_api_key(api_key)
            .base_url(base_url)
            .build())
    }

    /// Add a custom header to the client
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Create a request helper instance for this client
    fn request_helper(&self) -> ConsoleRequestHelper {
        ConsoleRequestHelper::new(
            self.client.clone(),
            &self.base_url,
            &self.api_key,
            &self.headers,
        )
    }
}

impl Console {
    /// One-shot chat: post the message and wait for the full response.
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ConsoleRequestError> {
        let endpoint = Endpoint::new(CHAT_URL, HttpMethod::Post);
        self.request_helper()
            .request_json(&endpoint, Some(request))
            .await
    }

    /// Streaming chat: returns a handle whose transcript fills as the
    /// backend generates.
    pub fn stream_chat(&self, request: &ChatRequest) -> StreamHandle {
        self.stream(CHAT_STREAM_URL, request)
    }

    /// Execute an agent, streaming its thinking, tool calls, and tokens.
    pub fn run_agent(&self, request: &AgentRunRequest) -> StreamHandle {
        self.stream(AGENT_STREAM_URL, request)
    }

    /// Run a multi-agent collaboration, streaming per-agent progress.
    pub fn run_collaboration(&self, request: &CollaborationRequest) -> StreamHandle {
        self.stream(COLLABORATION_STREAM_URL, request)
    }

    /// Every streaming surface funnels through the same read loop; only the
    /// endpoint path and body differ.
    fn stream<B: serde::Serialize>(&self, path: &str, request: &B) -> StreamHandle {
        let endpoint = Endpoint::new(path, HttpMethod::Post);
        let payloads = self.request_helper().stream_payloads(&endpoint, Some(request));
        StreamHandle::spawn(payloads)
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
