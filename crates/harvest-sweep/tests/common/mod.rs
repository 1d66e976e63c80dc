//! In-memory catalog used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use harvest_sweep::{
    parse_endpoint, CatalogTransport, HttpReply, PageFetcher, RequestAuthenticator,
    SignedRequest, TransportError,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const SECRET: &str = "test-secret";
pub const OFFERS_URL: &str = "https://offers.example.test/research/v5/offers/";

/// Dimension whose value selects the scripted pages.
pub const SCRIPT_KEY: &str = "combo";

/// Catalog that answers from a script keyed by (`combo` value, offset).
///
/// Unscripted pages answer with an empty item list.
#[derive(Default)]
pub struct ScriptedCatalog {
    pages: HashMap<(String, u64), String>,
    delays: HashMap<String, Duration>,
    statuses: HashMap<String, u16>,
    requests: Mutex<Vec<SignedRequest>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful page with the given items.
    pub fn items(mut self, combo: &str, offset: u64, items: Vec<Value>) -> Self {
        let body = json!({ "success": true, "result": { "items": items } }).to_string();
        self.pages.insert((combo.to_string(), offset), body);
        self
    }

    /// Script a raw body.
    pub fn body(mut self, combo: &str, offset: u64, body: &str) -> Self {
        self.pages.insert((combo.to_string(), offset), body.to_string());
        self
    }

    /// Delay every response for `combo`.
    pub fn delay(mut self, combo: &str, delay: Duration) -> Self {
        self.delays.insert(combo.to_string(), delay);
        self
    }

    /// Answer requests whose path ends with `path_suffix` with `status`.
    pub fn status(mut self, path_suffix: &str, status: u16) -> Self {
        self.statuses.insert(path_suffix.to_string(), status);
        self
    }

    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Offsets requested for `combo`, in request order.
    pub fn offsets_for(&self, combo: &str) -> Vec<u64> {
        self.requests()
            .iter()
            .filter(|r| query_value(&r.url, SCRIPT_KEY).as_deref() == Some(combo))
            .filter_map(|r| query_value(&r.url, "offset").and_then(|o| o.parse().ok()))
            .collect()
    }
}

#[async_trait]
impl CatalogTransport for ScriptedCatalog {
    async fn get(&self, request: &SignedRequest) -> Result<HttpReply, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        if let Some((_, status)) = self
            .statuses
            .iter()
            .find(|(suffix, _)| request.url.path().ends_with(suffix.as_str()))
        {
            return Ok(HttpReply::new(*status, "{}"));
        }

        let combo = query_value(&request.url, SCRIPT_KEY).unwrap_or_default();
        if let Some(delay) = self.delays.get(&combo) {
            tokio::time::sleep(*delay).await;
        }

        let offset = query_value(&request.url, "offset")
            .and_then(|o| o.parse().ok())
            .unwrap_or(0);
        let body = self
            .pages
            .get(&(combo, offset))
            .cloned()
            .unwrap_or_else(|| r#"{"success": true, "result": {"items": []}}"#.to_string());

        Ok(HttpReply::new(200, body))
    }
}

pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn authenticator() -> Arc<RequestAuthenticator> {
    Arc::new(RequestAuthenticator::new(SECRET, "sweep-tests/1.0").expect("valid authenticator"))
}

pub fn fetcher(catalog: Arc<ScriptedCatalog>) -> PageFetcher {
    let endpoint = parse_endpoint(OFFERS_URL).expect("valid offers url");
    PageFetcher::new(catalog, authenticator(), endpoint)
}

/// `count` items with consecutive ids starting at `first`.
pub fn offers(first: i64, count: i64) -> Vec<Value> {
    (first..first + count)
        .map(|id| json!({ "id": id, "price_info": { "price": id * 1000 } }))
        .collect()
}
