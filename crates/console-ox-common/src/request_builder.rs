use std::collections::HashMap;

use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::{Method, RequestBuilder as ReqwestRequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::{
    error::{self, CommonRequestError},
    sse,
};

/// HTTP method for API endpoints
#[derive(Debug, Clone)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Authentication method for API requests
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Bearer token authentication (Authorization: Bearer <token>)
    Bearer(String),
    /// API key header (e.g., x-api-key: <key>)
    ApiKey { header_name: String, key: String },
}

/// Represents an API endpoint with its configuration
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub query_params: Option<Vec<(String, String)>>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            query_params: None,
        }
    }

    pub fn with_query_params(mut self, params: Vec<(String, String)>) -> Self {
        self.query_params = Some(params);
        self
    }
}

/// Configuration for request building
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    pub auth: Option<AuthMethod>,
    pub default_headers: HashMap<String, String>,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            default_headers: HashMap::new(),
        }
    }

    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

/// Generic request builder that handles the HTTP patterns shared by every
/// console endpoint: URL joining, auth, default headers, JSON bodies.
#[derive(Clone)]
pub struct RequestBuilder {
    client: reqwest::Client,
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    /// Build a reqwest RequestBuilder for the given endpoint
    pub fn build_request(&self, endpoint: &Endpoint) -> ReqwestRequestBuilder {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.path.trim_start_matches('/')
        );
        let method: Method = endpoint.method.clone().into();

        let mut req = self.client.request(method, &url);

        if let Some(ref params) = endpoint.query_params {
            req = req.query(&params);
        }

        if let Some(ref auth) = self.config.auth {
            req = match auth {
                AuthMethod::Bearer(token) => req.bearer_auth(token),
                AuthMethod::ApiKey { header_name, key } => req.header(header_name, key),
            };
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if matches!(endpoint.method, HttpMethod::Post) {
            req = req.header("content-type", "application/json");
        }

        req
    }

    /// Execute a request with an optional JSON body and return the
    /// deserialized response
    pub async fn request_json<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<T, CommonRequestError> {
        let mut req = self.build_request(endpoint);

        if let Some(body) = body {
            tracing::debug!(path = %endpoint.path, "sending JSON request");
            req = req.json(body);
        }

        let res = req.send().await?;
        self.handle_response(res).await
    }

    /// Execute a request without body and return the deserialized response
    pub async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<T, CommonRequestError> {
        let req = self.build_request(endpoint);
        let res = req.send().await?;
        self.handle_response(res).await
    }

    /// Execute a request and return unit type (for delete operations)
    pub async fn request_unit(&self, endpoint: &Endpoint) -> Result<(), CommonRequestError> {
        let req = self.build_request(endpoint);
        let res = req.send().await?;

        if res.status().is_success() {
            Ok(())
        } else {
            let status = res.status();
            let bytes = res.bytes().await?;
            Err(error::parse_error_response(status, &bytes))
        }
    }

    /// Execute a streaming request and return the decoded event payloads.
    ///
    /// A non-success status is reported as the first (and only) `Err` item;
    /// after that the stream yields one payload string per `data:` line, in
    /// delivery order.
    pub fn stream_sse<B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> BoxStream<'static, Result<String, CommonRequestError>> {
        let mut req = self.build_request(endpoint);

        if let Some(body) = body {
            req = req.json(body);
        }

        Box::pin(
            stream::once(async move {
                tracing::debug!("opening event stream");
                let response = req.send().await?;
                let status = response.status();

                if status.is_success() {
                    Ok(sse::sse_payload_stream(response))
                } else {
                    let bytes = response.bytes().await?;
                    Err(error::parse_error_response(status, &bytes))
                }
            })
            .map(|result| match result {
                Ok(payloads) => payloads,
                Err(err) => stream::once(async move { Err(err) }).boxed(),
            })
            .flatten(),
        )
    }

    /// Handle response and parse errors
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        res: Response,
    ) -> Result<T, CommonRequestError> {
        let status = res.status();
        let bytes = res.bytes().await?;

        if status.is_success() {
            match serde_json::from_slice::<T>(&bytes) {
                Ok(val) => Ok(val),
                Err(e) => {
                    let body_str = String::from_utf8_lossy(&bytes);
                    Err(CommonRequestError::UnexpectedResponse(format!(
                        "HTTP {} but failed to decode JSON: {}; body: {}",
                        status.as_u16(),
                        e,
                        body_str
                    )))
                }
            }
        } else {
            Err(error::parse_error_response(status, &bytes))
        }
    }
}
