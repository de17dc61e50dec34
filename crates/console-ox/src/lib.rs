#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Client for the AI platform console backend.
//!
//! Every streaming surface of the console (chat, agent execution, multi-agent
//! collaboration) delivers `data:`-prefixed JSON frames over one HTTP
//! response body. This crate decodes those frames into a closed
//! [`StreamEvent`] union, accumulates them into a [`Transcript`], and exposes
//! the whole lifecycle through a cancellable [`StreamHandle`] so that callers
//! render state instead of parsing wire payloads.

pub mod client;
pub mod error;
pub mod event;
mod internal;
pub mod request;
pub mod response;
pub mod stream;
pub mod transcript;

// Re-export main types
pub use client::Console;
pub use error::{ConsoleRequestError, ErrorKind};
pub use event::StreamEvent;
pub use request::{AgentRunRequest, ChatRequest, CollaborationRequest};
pub use response::ChatResponse;
pub use stream::{StreamHandle, StreamStatus};
pub use transcript::{Transcript, TranscriptSnapshot};
