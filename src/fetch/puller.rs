//! Conditional pull of the compressed configuration document.

use std::io::Read;
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use reqwest::header::{HeaderName, HeaderValue, CACHE_CONTROL, CONNECTION, ETAG, IF_NONE_MATCH};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{RefreshError, RefreshResult};
use crate::fetch::etag::EtagCache;
use crate::fetch::transport::Transport;
use crate::observability::metrics;
use crate::settings::{EtagPolicy, RefreshSettings};

/// Header carrying the alternate route for the same document.
pub const FRONTED_URL_HEADER: HeaderName = HeaderName::from_static("lantern-fronted-url");

/// A decompressed document and the validator it was served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: Vec<u8>,
    pub etag: Option<String>,
}

/// Pulls the configuration document through an injected transport.
pub struct ConfigFetcher {
    transport: Arc<dyn Transport>,
    primary_url: Url,
    fronted_url: Url,
    max_body_bytes: usize,
    etag_policy: EtagPolicy,
}

impl ConfigFetcher {
    pub fn new(transport: Arc<dyn Transport>, settings: &RefreshSettings) -> RefreshResult<Self> {
        let parse = |value: &str| {
            Url::parse(value).map_err(|e| RefreshError::InvalidRequest(format!("'{}': {}", value, e)))
        };

        Ok(Self {
            transport,
            primary_url: parse(&settings.endpoints.primary_url)?,
            fronted_url: parse(&settings.endpoints.fronted_url)?,
            max_body_bytes: settings.fetch.max_body_bytes,
            etag_policy: settings.fetch.etag_policy,
        })
    }

    pub fn etag_policy(&self) -> EtagPolicy {
        self.etag_policy
    }

    /// Fetch and decompress the document.
    ///
    /// Returns `Unchanged` on 304 and `RequestFailed` on any other non-200.
    /// With [`EtagPolicy::OnFetch`] a 200 overwrites `etag` before the body is
    /// even read, whatever the caller later decides about its content.
    pub async fn pull(&self, etag: &EtagCache) -> RefreshResult<Fetched> {
        let request = self.build_request(etag.get().as_deref())?;
        let mut response = self.transport.execute(request).await?;

        let status = response.status();
        metrics::record_fetch_status(status.as_u16());

        if status == StatusCode::NOT_MODIFIED {
            tracing::debug!("Configuration file has not changed since last pull");
            return Err(RefreshError::Unchanged);
        }
        if status != StatusCode::OK {
            return Err(RefreshError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let new_etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        if self.etag_policy == EtagPolicy::OnFetch {
            if let Some(value) = &new_etag {
                etag.store(value.as_str());
            }
        }

        let compressed = read_body(&mut response, self.max_body_bytes).await?;
        let body = gunzip(&compressed, self.max_body_bytes)?;

        tracing::debug!(
            compressed_bytes = compressed.len(),
            bytes = body.len(),
            etag = ?new_etag,
            "Configuration file pulled"
        );

        Ok(Fetched {
            body,
            etag: new_etag,
        })
    }

    fn build_request(&self, etag: Option<&str>) -> RefreshResult<reqwest::Request> {
        let mut request = reqwest::Request::new(Method::GET, self.primary_url.clone());
        let headers = request.headers_mut();

        if let Some(etag) = etag {
            match HeaderValue::from_str(etag) {
                Ok(value) => {
                    headers.insert(IF_NONE_MATCH, value);
                }
                Err(_) => tracing::warn!(etag = %etag, "Cached ETag is not a valid header value, fetching unconditionally"),
            }
        }

        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let fronted = HeaderValue::from_str(self.fronted_url.as_str())
            .map_err(|e| RefreshError::InvalidRequest(e.to_string()))?;
        headers.insert(FRONTED_URL_HEADER, fronted);

        Ok(request)
    }
}

impl std::fmt::Debug for ConfigFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFetcher")
            .field("primary_url", &self.primary_url.as_str())
            .field("fronted_url", &self.fronted_url.as_str())
            .field("max_body_bytes", &self.max_body_bytes)
            .field("etag_policy", &self.etag_policy)
            .finish()
    }
}

async fn read_body(response: &mut reqwest::Response, limit: usize) -> RefreshResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(RefreshError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Drain a gzip stream, refusing output beyond `limit` bytes.
fn gunzip(compressed: &[u8], limit: usize) -> RefreshResult<Vec<u8>> {
    if compressed.is_empty() {
        return Err(RefreshError::Decompress(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "empty body",
        )));
    }

    let mut body = Vec::new();
    MultiGzDecoder::new(compressed)
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(RefreshError::Decompress)?;

    if body.len() > limit {
        return Err(RefreshError::BodyTooLarge { limit });
    }
    Ok(body)
}
