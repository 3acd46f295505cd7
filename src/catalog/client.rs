use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::models::{CatalogStats, Cycle, Milestone};

use super::cache::ResponseCache;
use super::CatalogSource;

const USER_AGENT: &str = concat!("eol-scanner/", env!("CARGO_PKG_VERSION"));

/// endoflife.date client: `GET {base}/api/all.json` and `GET {base}/api/{product}.json`.
///
/// Requests are sequential, spaced by `request_delay`, and transient failures are
/// retried with exponential backoff.
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    cache: ResponseCache,
    refresh: bool,
    request_delay: Duration,
    max_retries: u32,
    backoff: Duration,
    last_request: Option<Instant>,
    stats: CatalogStats,
}

impl HttpCatalog {
    /// `refresh` skips cache reads but still stores fresh responses.
    pub fn new(config: &CatalogConfig, cache: ResponseCache, refresh: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(HttpCatalog {
            client,
            base_url: normalize_base_url(&config.base_url),
            cache,
            refresh,
            request_delay: config.request_delay(),
            max_retries: config.max_retries,
            backoff: config.backoff(),
            last_request: None,
            stats: CatalogStats::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json(&mut self, cache_key: &str, url: &str) -> Result<Value, CatalogError> {
        if !self.refresh {
            if let Some(value) = self.cache.get(cache_key) {
                tracing::debug!("cache hit: {cache_key}");
                self.stats.cache_hits += 1;
                return Ok(value);
            }
        }

        let value = self.fetch_with_retry(url).await?;
        if let Err(e) = self.cache.put(cache_key, &value) {
            tracing::warn!("Could not cache {url}: {e:#}");
        }
        Ok(value)
    }

    async fn fetch_with_retry(&mut self, url: &str) -> Result<Value, CatalogError> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff.saturating_mul(1 << (attempt - 1).min(16));
                    self.stats.retries += 1;
                    tracing::debug!(
                        "Retry {attempt}/{} for {url} in {delay:?}: {e}",
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&mut self, url: &str) -> Result<Value, CatalogError> {
        self.pace().await;
        self.stats.api_calls += 1;
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                CatalogError::Parse {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                network_error(url, &e)
            }
        })
    }

    /// A payload that does not parse is not kept for the next run.
    fn drop_cached(&self, key: &str) {
        if let Err(e) = self.cache.invalidate(key) {
            tracing::warn!("Could not drop cache entry {key}: {e:#}");
        }
    }

    /// Hold back until `request_delay` has passed since the previous request.
    async fn pace(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                tokio::time::sleep(self.request_delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

impl CatalogSource for HttpCatalog {
    async fn product_list(&mut self) -> Result<Vec<String>, CatalogError> {
        let url = self.url("all.json");
        let value = self.get_json(LIST_KEY, &url).await?;
        let parsed = parse_product_list(&value, &url);
        if parsed.is_err() {
            self.drop_cached(LIST_KEY);
        }
        parsed
    }

    async fn product_cycles(&mut self, product: &str) -> Result<Vec<Cycle>, CatalogError> {
        let url = self.url(&format!("{product}.json"));
        let key = format!("cycles-{product}");
        let value = self.get_json(&key, &url).await?;
        let parsed = parse_cycles(value, &url);
        if parsed.is_err() {
            self.drop_cached(&key);
        }
        parsed
    }

    fn stats(&self) -> CatalogStats {
        self.stats.clone()
    }
}

const LIST_KEY: &str = "all";

fn network_error(url: &str, e: &reqwest::Error) -> CatalogError {
    CatalogError::Network {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Strip a trailing `/` and a trailing `/api`, so both `https://endoflife.date`
/// and `https://endoflife.date/api/` work as overrides.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/api")
        .unwrap_or(trimmed)
        .to_string()
}

/// The product list is published as an array of slugs; an object keyed by slug is
/// accepted too.
pub fn parse_product_list(value: &Value, url: &str) -> Result<Vec<String>, CatalogError> {
    match value {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()),
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        other => Err(CatalogError::Parse {
            url: url.to_string(),
            message: format!("expected an array of products, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Cycle payload
// ---------------------------------------------------------------------------

/// A cycle as published by the API. Field shapes vary between products.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCycle {
    cycle: Scalar,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    eol: Option<DateOrBool>,
    #[serde(default)]
    support: Option<DateOrBool>,
    #[serde(default)]
    latest: Option<Scalar>,
    #[serde(default)]
    lts: Option<DateOrBool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DateOrBool {
    Bool(bool),
    Text(String),
    Other(Value),
}

impl DateOrBool {
    fn into_milestone(self) -> Milestone {
        match self {
            DateOrBool::Bool(b) => Milestone::Flag(b),
            DateOrBool::Text(s) => match parse_date(&s) {
                Some(d) => Milestone::Date(d),
                None => Milestone::Unpublished(s),
            },
            DateOrBool::Other(v) => Milestone::Unpublished(v.to_string()),
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

impl From<ApiCycle> for Cycle {
    fn from(api: ApiCycle) -> Self {
        let lts = match &api.lts {
            Some(DateOrBool::Bool(b)) => *b,
            Some(DateOrBool::Text(_)) => true,
            _ => false,
        };
        Cycle {
            label: api.cycle.into_string(),
            release_date: api.release_date.as_deref().and_then(parse_date),
            eol: api.eol.map(DateOrBool::into_milestone),
            support: api.support.map(DateOrBool::into_milestone),
            latest: api.latest.map(Scalar::into_string),
            lts,
        }
    }
}

pub fn parse_cycles(value: Value, url: &str) -> Result<Vec<Cycle>, CatalogError> {
    let cycles: Vec<ApiCycle> = serde_json::from_value(value).map_err(|e| CatalogError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(cycles.into_iter().map(Cycle::from).collect())
}
