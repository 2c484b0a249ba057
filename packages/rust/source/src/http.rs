//! HTTP Record Source speaking the `/api/keywords` and `/api/ai-visibility`
//! JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use rankscope_shared::{AiEngineRecord, Domain, KeywordRecord, RankScopeError, Region, Result};

use crate::RecordSource;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("RankScope/", env!("CARGO_PKG_VERSION"));

const KEYWORDS_PATH: &str = "api/keywords";
const AI_VISIBILITY_PATH: &str = "api/ai-visibility";

#[derive(Debug, Deserialize)]
struct KeywordsEnvelope {
    keywords: Vec<KeywordRecord>,
}

#[derive(Debug, Deserialize)]
struct AiVisibilityEnvelope {
    results: Vec<AiEngineRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Record Source backed by a remote provider.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    /// Create a source rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RankScopeError::config(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RankScopeError::config(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RankScopeError::source_unavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RankScopeError::config(format!("invalid endpoint '{path}': {e}")))
    }

    #[instrument(skip_all, fields(endpoint = path, %domain, %region))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        domain: &Domain,
        region: Region,
    ) -> Result<T> {
        let url = self.endpoint(path)?;

        let response = self
            .client
            .get(url.clone())
            .query(&[("domain", domain.as_str()), ("region", region.code())])
            .send()
            .await
            .map_err(|e| RankScopeError::source_unavailable(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            RankScopeError::source_unavailable(format!("{url}: failed to read body: {e}"))
        })?;

        if status == StatusCode::BAD_REQUEST {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("{url}: HTTP {status}"));
            return Err(RankScopeError::invalid_query(message));
        }
        if !status.is_success() {
            return Err(RankScopeError::source_unavailable(format!(
                "{url}: HTTP {status}"
            )));
        }

        debug!(bytes = body.len(), "provider response received");
        decode_body(&url, &body)
    }
}

/// Decode a provider body. Well-formed JSON whose records break the
/// schema (unknown engine, negative volume) is a contract violation;
/// anything else is a failed round trip.
fn decode_body<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => {
            RankScopeError::contract(format!("{url}: {e}"))
        }
        _ => RankScopeError::source_unavailable(format!("{url}: undecodable body: {e}")),
    })
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch_keyword_records(
        &self,
        domain: &Domain,
        region: Region,
    ) -> Result<Vec<KeywordRecord>> {
        let envelope: KeywordsEnvelope = self.get_json(KEYWORDS_PATH, domain, region).await?;
        Ok(envelope.keywords)
    }

    async fn fetch_ai_engine_records(
        &self,
        domain: &Domain,
        region: Region,
    ) -> Result<Vec<AiEngineRecord>> {
        let envelope: AiVisibilityEnvelope =
            self.get_json(AI_VISIBILITY_PATH, domain, region).await?;
        Ok(envelope.results)
    }

    fn name(&self) -> &str {
        "http"
    }
}
