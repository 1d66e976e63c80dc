//! Request signing and session bootstrap.
//!
//! Every request to the catalog carries a fixed set of identity headers plus
//! a `Timestamp`/`Hash` pair:
//!
//! ```text
//! Hash = "v1:" + hex(md5(secret + canonical_url + timestamp))
//! ```
//!
//! The canonical URL is the exact URL that goes on the wire, with query
//! parameters in a fixed order. Signing is a pure function of its inputs and
//! produces a fresh [`SignedHeaders`] value per call, so concurrent fetches
//! never share mutable header state.

use crate::error::{AuthError, Result, SweepError};
use crate::transport::{CatalogTransport, SignedRequest};
use harvest_core::ApiConfig;
use md5::{Digest, Md5};
use reqwest::header::HeaderValue;
use url::Url;

/// Version tag prepended to the hex digest.
pub const HASH_VERSION: &str = "v1:";

/// Header carrying the unix timestamp used in the signature.
pub const TIMESTAMP_HEADER: &str = "Timestamp";

/// Header carrying the versioned signature.
pub const HASH_HEADER: &str = "Hash";

/// Headers for one outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    headers: Vec<(&'static str, String)>,
}

impl SignedHeaders {
    /// Look up a header by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(key, value)| (*key, value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Signs requests with a shared secret.
///
/// Holds only read-only state and is shared across workers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    secret: String,
    identity: Vec<(&'static str, String)>,
}

impl RequestAuthenticator {
    /// Create an authenticator.
    ///
    /// # Errors
    /// Returns error if the secret is empty or the user agent is not a valid
    /// header value.
    pub fn new(secret: impl Into<String>, user_agent: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::EmptySecret.into());
        }

        let user_agent = user_agent.into();
        HeaderValue::from_str(&user_agent).map_err(|e| AuthError::InvalidHeaderValue {
            header: "User-Agent",
            reason: e.to_string(),
        })?;

        Ok(Self {
            secret,
            identity: vec![
                ("X-Service", "true".to_string()),
                ("Connection", "Keep-Alive".to_string()),
                ("User-Agent", user_agent),
            ],
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.secret_salt.clone(), config.user_agent.clone())
    }

    /// Build the canonical URL: the endpoint with `pairs` appended in order,
    /// form-urlencoded.
    #[must_use]
    pub fn canonical_url(endpoint: &Url, pairs: &[(String, String)]) -> Url {
        let mut url = endpoint.clone();
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        url
    }

    /// Hex digest over `secret + canonical_url + timestamp`.
    #[must_use]
    pub fn signature(&self, canonical_url: &str, timestamp: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(canonical_url.as_bytes());
        hasher.update(timestamp.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Headers for a request to `canonical_url` made at `timestamp` (unix
    /// seconds).
    #[must_use]
    pub fn sign(&self, canonical_url: &Url, timestamp: i64) -> SignedHeaders {
        let timestamp = timestamp.to_string();
        let hash = format!(
            "{HASH_VERSION}{}",
            self.signature(canonical_url.as_str(), &timestamp)
        );

        let mut headers = self.identity.clone();
        headers.push((TIMESTAMP_HEADER, timestamp));
        headers.push((HASH_HEADER, hash));
        SignedHeaders { headers }
    }

    /// Sign with the current wall-clock time.
    #[must_use]
    pub fn sign_now(&self, canonical_url: &Url) -> SignedHeaders {
        self.sign(canonical_url, chrono::Utc::now().timestamp())
    }

    /// A ready-to-send request for `canonical_url`, signed now.
    #[must_use]
    pub fn request(&self, canonical_url: Url) -> SignedRequest {
        let headers = self.sign_now(&canonical_url);
        SignedRequest {
            url: canonical_url,
            headers,
        }
    }

    /// Establish session state by calling each bootstrap endpoint once, in
    /// order.
    ///
    /// # Errors
    /// Returns `SweepError::Bootstrap` when no endpoint is given, or on the
    /// first call that fails or answers with a non-success status. Nothing
    /// is retried.
    pub async fn bootstrap(
        &self,
        transport: &dyn CatalogTransport,
        endpoints: &[Url],
    ) -> Result<()> {
        if endpoints.is_empty() {
            return Err(SweepError::Bootstrap {
                url: "<none>".to_string(),
                reason: "no session endpoints configured".to_string(),
            });
        }

        for endpoint in endpoints {
            let request = self.request(endpoint.clone());
            let reply = transport
                .get(&request)
                .await
                .map_err(|e| SweepError::Bootstrap {
                    url: endpoint.to_string(),
                    reason: e.to_string(),
                })?;

            if !reply.is_success() {
                return Err(SweepError::Bootstrap {
                    url: endpoint.to_string(),
                    reason: format!("HTTP {}", reply.status),
                });
            }

            tracing::info!(url = %endpoint, status = reply.status, "bootstrap call succeeded");
        }

        Ok(())
    }
}

/// Parse an endpoint URL, accepting only http and https.
///
/// # Errors
/// Returns `SweepError::InvalidEndpoint` for unparseable or non-HTTP URLs.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| SweepError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SweepError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
