use std::collections::HashMap;

use console_ox_common::{
    BoxStream,
    error::CommonRequestError,
    request_builder::{AuthMethod, Endpoint, RequestBuilder, RequestConfig},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ConsoleRequestError;

/// Console client helper methods using the common `RequestBuilder`.
#[derive(Clone)]
pub(crate) struct ConsoleRequestHelper {
    request_builder: RequestBuilder,
}

impl ConsoleRequestHelper {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &Option<String>,
        headers: &HashMap<String, String>,
    ) -> Self {
        let mut config = RequestConfig::new(base_url).with_header("accept", "application/json");

        if let Some(key) = api_key {
            config = config.with_auth(AuthMethod::Bearer(key.clone()));
        }
        for (key, value) in headers {
            config = config.with_header(key.clone(), value.clone());
        }

        Self {
            request_builder: RequestBuilder::new(client, config),
        }
    }

    /// Send a JSON request and deserialize the response
    pub async fn request_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<T, ConsoleRequestError> {
        Ok(self.request_builder.request_json(endpoint, body).await?)
    }

    /// Open a streaming request and return the decoded event payloads
    pub fn stream_payloads<B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> BoxStream<'static, Result<String, CommonRequestError>> {
        self.request_builder.stream_sse(endpoint, body)
    }
}
