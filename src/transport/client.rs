//! HTTP client endpoint
//!
//! Calls a remote gateway's `POST /push`. Wrap it in
//! [`PushClient`](crate::endpoint::PushClient) to use it as an `Operation`.

use async_trait::async_trait;

use super::TRACEPARENT;
use crate::context::Context;
use crate::endpoint::{Endpoint, EndpointError};
use crate::error::PushError;
use crate::types::{PushRequest, PushResponse};

/// `Endpoint` backed by a remote HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    /// Endpoint for the gateway at `base_url` (e.g., "http://127.0.0.1:8080")
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/push", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    async fn call(
        &self,
        ctx: Context,
        request: PushRequest,
    ) -> Result<PushResponse, EndpointError> {
        let mut req = self.client.post(&self.url).json(&request);
        if let Some(span) = ctx.span() {
            req = req.header(TRACEPARENT, span.to_traceparent());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PushError::Transport(format!("{}: {}", self.url, e)))?;
        let status = resp.status();

        let body: PushResponse = resp.json().await.map_err(|e| {
            PushError::Transport(format!("invalid response (status {}): {}", status, e))
        })?;

        let remote = body.error.as_deref().and_then(PushError::from_wire);
        match remote {
            Some(error) => Err(EndpointError {
                response: body,
                error,
            }),
            None if status.is_success() => Ok(body),
            None => Err(PushError::Transport(format!("unexpected status {}", status)).into()),
        }
    }
}
