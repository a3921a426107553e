//! Transport seam for configuration requests.
//!
//! The refresher only builds the request and interprets the response.
//! Delivery (direct, fronted, proxied) belongs to whatever implements
//! [`Transport`].

use std::time::Duration;

use async_trait::async_trait;

/// Executes a fully built configuration request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error>;
}

/// Sends requests straight to the URL they are addressed to.
///
/// Ignores the fronting hint header; idle connections are never pooled.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    client: reqwest::Client,
}

impl DirectTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one configured with a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        tracing::trace!(url = %request.url(), "Sending configuration request");
        self.client.execute(request).await
    }
}
