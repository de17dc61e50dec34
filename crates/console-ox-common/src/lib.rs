#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Shared HTTP and SSE plumbing for clients of the console backend
//!
//! This crate carries the transport-level pieces that every console surface
//! needs: request building with auth and headers, error decoding for non-2xx
//! responses, and the line-framing decoder for `data:`-prefixed event streams.

pub mod error;
pub mod request_builder;
pub mod sse;

pub use error::CommonRequestError;
pub use request_builder::{AuthMethod, Endpoint, HttpMethod, RequestBuilder, RequestConfig};
pub use sse::SseLineDecoder;

/// Re-export common types for convenience
pub use futures_util::stream::BoxStream;
pub use serde::{Deserialize, Serialize};
