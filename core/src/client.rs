//! The request dispatcher.
//!
//! # Design
//! `ApiClient` owns an immutable `ClientConfig` and a pooled `reqwest::Client`;
//! nothing else is shared between calls. `dispatch` is the single entry point
//! every accessor goes through: build (encode), send, classify, decode. The
//! only suspension point is the network exchange, which races the caller's
//! cancellation token.

use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::{Error, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::request::Request;

/// Client for the accounts API. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.max_request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("building http client failed: {e}")))?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute `request` end to end.
    ///
    /// Encoding and URL errors return before anything is sent. A status other
    /// than the expected one is classified and returned after the body has
    /// been read. With a sink registered the body is decoded into it.
    pub async fn dispatch(&self, ctx: &CallContext, request: Request<'_>) -> Result<(), Error> {
        let http_request = request.build(self.config.base_url())?;

        if self.config.debug() {
            debug!(
                method = %http_request.method,
                url = %http_request.url,
                body = http_request.body.as_deref().unwrap_or(""),
                "sending request"
            );
        }

        let exchange = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => Err(TransportError::Cancelled),
            result = self.send(ctx, &http_request) => result.map_err(TransportError::Http),
        };
        let response = exchange.map_err(|source| Error::Transport {
            method: http_request.method,
            url: http_request.url.clone(),
            source,
        })?;

        if self.config.debug() {
            debug!(
                status = response.status,
                body = %response.body,
                "received response"
            );
        }

        request.parse(&http_request.url, response)
    }

    async fn send(
        &self,
        ctx: &CallContext,
        request: &HttpRequest,
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(request.method.into(), request.url.as_str())
            .timeout(ctx.effective_timeout(self.config.max_request_timeout()));
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Read to the end even on a status mismatch so the connection is reusable.
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
