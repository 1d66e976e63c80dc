//! HTTP seam between the sweep and the remote catalog.
//!
//! Everything above this module talks to [`CatalogTransport`]; the production
//! implementation is [`HttpTransport`], tests substitute in-memory doubles.

use crate::auth::SignedHeaders;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A GET request whose headers were signed for exactly this URL.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub url: Url,
    pub headers: SignedHeaders,
}

/// Status and raw body of a response. The body is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues signed GET requests.
///
/// Implementations must be thread-safe (Send + Sync); one instance is shared
/// by every concurrent fetch.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// Send the request and return whatever the server answered.
    ///
    /// # Errors
    /// Returns error only when no response body could be obtained.
    async fn get(&self, request: &SignedRequest) -> Result<HttpReply, TransportError>;
}

/// `reqwest`-backed transport with a cookie store, so session cookies set
/// during bootstrap are sent with every later request.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(&self, request: &SignedRequest) -> Result<HttpReply, TransportError> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Http(e)
            }
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::trace!(url = %request.url, status, bytes = body.len(), "catalog response");
        Ok(HttpReply { status, body })
    }
}
