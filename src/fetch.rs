//! The source client: fetches raw quote records for one category tag from
//! an upstream HTTP source.
//!
//! One parametrized client covers every category — the tag is an argument,
//! not a copy of the fetch logic. The client owns its retry, backoff,
//! timeout, and politeness policy and never touches the store.

use std::time::Duration;

use serde::Deserialize;

use crate::config::FetchConfig;
use crate::error::SourceError;
use crate::models::RawRecord;

/// Upstream page shape: records live under `results`. A missing field is
/// treated as an empty page, matching how the upstream paginates past the
/// end.
#[derive(Debug, Deserialize)]
struct QuotePage {
    #[serde(default)]
    results: Vec<RawRecord>,
}

pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
    label: Option<String>,
    max_attempts: u32,
    backoff_base: Duration,
    throttle: Duration,
    retry_statuses: Vec<u16>,
    max_quotes: usize,
    fetch_limit: usize,
}

impl SourceClient {
    /// Build a client for one source. `base_url` and `label` come from the
    /// binding; everything else from the fetch policy.
    pub fn new(
        fetch: &FetchConfig,
        base_url: &str,
        label: Option<&str>,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            label: label.map(String::from),
            max_attempts: fetch.max_attempts.max(1),
            backoff_base: Duration::from_millis(fetch.backoff_base_ms),
            throttle: Duration::from_millis(fetch.throttle_ms),
            retry_statuses: fetch.retry_statuses.clone(),
            max_quotes: fetch.max_quotes,
            fetch_limit: fetch.fetch_limit,
        })
    }

    /// Fetch the records for one category tag.
    ///
    /// Transient failures (timeouts, network errors, retryable statuses)
    /// are retried with exponential backoff up to the attempt ceiling;
    /// anything else fails immediately. The politeness throttle is charged
    /// once per call, after success or after retries are exhausted — not
    /// during backoff. Records beyond the per-category cap are discarded
    /// in arrival order.
    pub async fn fetch(&self, tag: &str) -> Result<Vec<RawRecord>, SourceError> {
        let mut attempt = 1u32;
        let mut delay = self.backoff_base;

        let result = loop {
            match self.fetch_once(tag).await {
                Ok(records) => break Ok(records),
                Err(err) if attempt < self.max_attempts && err.is_transient(&self.retry_statuses) => {
                    tracing::warn!(
                        tag,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying source fetch"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => break Err(err),
            }
        };

        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }

        result.map(|mut records| {
            records.truncate(self.max_quotes);
            if let Some(label) = &self.label {
                for record in &mut records {
                    record.source = Some(label.clone());
                }
            }
            records
        })
    }

    async fn fetch_once(&self, tag: &str) -> Result<Vec<RawRecord>, SourceError> {
        let url = format!("{}/quotes", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("tags", tag), ("limit", &self.fetch_limit.to_string())])
            .send()
            .await
            .map_err(SourceError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(SourceError::from_reqwest)?;
        let page: QuotePage =
            serde_json::from_str(&body).map_err(|e| SourceError::Malformed(e.to_string()))?;

        Ok(page.results)
    }
}
