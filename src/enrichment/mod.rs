//! Similar-listings enrichment.
//!
//! A detail URL ends in a five-part listing id. That id is sent to the
//! recommendation GraphQL endpoint and every `items` array in the response is
//! attached to the record as opaque JSON. Failures never affect the record
//! beyond leaving `similar_cars` empty.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error_handling::{ErrorType, InfoType, InitializationError, ProcessingStats, WarningType};
use crate::initialization::{init_enrichment_client, init_semaphore};
use crate::models::EnrichmentResult;
use crate::utils::sanitize::sanitize_and_truncate_error_message;

/// GraphQL document for the recommendation lookup.
pub const FETCH_RECOMMENDATIONS_QUERY: &str = include_str!("query.graphql");

const OPERATION_NAME: &str = "FetchRecommendations";
const KEY_SEGMENTS: usize = 5;

/// Derives the listing id used by the recommendation API.
///
/// Takes the last path segment (query and fragment ignored) and keeps its last
/// five `-`-separated parts. Returns `None` unless all five are non-empty and
/// alphanumeric.
///
/// ```
/// use car_crawler::enrichment::correlation_key;
/// assert_eq!(
///     correlation_key("https://x.test/offers/audi-a4-0b9c4f4e-59b4-4c8e-9d1a-6a2b3c4d5e6f?src=1"),
///     Some("0b9c4f4e-59b4-4c8e-9d1a-6a2b3c4d5e6f".to_string())
/// );
/// assert_eq!(correlation_key("https://x.test/offers/audi-a4"), None);
/// ```
pub fn correlation_key(detail_url: &str) -> Option<String> {
    let path = match url::Url::parse(detail_url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => detail_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let segment = path.trim_end_matches('/').rsplit('/').next()?;

    let parts: Vec<&str> = segment.split('-').collect();
    if parts.len() < KEY_SEGMENTS {
        return None;
    }
    let tail = &parts[parts.len() - KEY_SEGMENTS..];
    if tail
        .iter()
        .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return None;
    }
    Some(tail.join("-"))
}

/// Collects every value stored under an `items` key at any depth.
///
/// Arrays are flattened into the result; other values are kept as they are.
/// Matched values are not searched further.
pub fn collect_items(value: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    collect_items_into(value, &mut out);
    out
}

fn collect_items_into(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "items" {
                    match child {
                        Value::Array(items) => out.extend(items.iter().cloned()),
                        Value::Null => {}
                        other => out.push(other.clone()),
                    }
                } else {
                    collect_items_into(child, out);
                }
            }
        }
        Value::Array(values) => {
            for child in values {
                collect_items_into(child, out);
            }
        }
        _ => {}
    }
}

/// Builds the request body for one listing id.
pub fn build_payload(guid: &str, locale: &str) -> Value {
    json!({
        "operationName": OPERATION_NAME,
        "query": FETCH_RECOMMENDATIONS_QUERY,
        "variables": {
            "guid": guid,
            "locale": locale,
        },
    })
}

/// Client for the recommendation endpoint.
///
/// Owns its HTTP client and its own concurrency limit, separate from the
/// page-fetch permits.
pub struct EnrichmentClient {
    client: Arc<reqwest::Client>,
    endpoint: String,
    auth: Option<String>,
    locale: String,
    permits: Arc<Semaphore>,
}

impl EnrichmentClient {
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        Ok(Self {
            client: init_enrichment_client(config)?,
            endpoint: config.enrichment_endpoint.clone(),
            auth: config.enrichment_auth.clone(),
            locale: config.enrichment_locale.clone(),
            permits: init_semaphore(config.enrichment_concurrency.max(1)),
        })
    }

    /// Looks up similar listings for `detail_url`.
    ///
    /// Never fails: an underivable key skips the call, and any transport,
    /// status or decoding error yields empty items. Neither case is retried.
    pub async fn enrich(&self, detail_url: &str, stats: &ProcessingStats) -> EnrichmentResult {
        let Some(key) = correlation_key(detail_url) else {
            log::debug!("No correlation key in {}, skipping enrichment", detail_url);
            stats.increment_warning(WarningType::BadCorrelationKey);
            stats.increment_info(InfoType::EnrichmentSkipped);
            return EnrichmentResult::empty(None);
        };

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                log::warn!("Enrichment semaphore closed, skipping {}", detail_url);
                stats.increment_info(InfoType::EnrichmentSkipped);
                return EnrichmentResult::empty(Some(key));
            }
        };

        match self.fetch_items(&key).await {
            Ok(items) => {
                log::debug!("{} similar listings for {}", items.len(), key);
                EnrichmentResult {
                    correlation_key: Some(key),
                    items,
                }
            }
            Err(e) => {
                log::warn!(
                    "Enrichment failed for {}: {}",
                    detail_url,
                    sanitize_and_truncate_error_message(&format!("{:#}", e))
                );
                stats.increment_error(ErrorType::EnrichmentError);
                EnrichmentResult::empty(Some(key))
            }
        }
    }

    async fn fetch_items(&self, guid: &str) -> Result<Vec<Value>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&build_payload(guid, &self.locale));
        if let Some(auth) = &self.auth {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .context("Failed to send enrichment request")?
            .error_for_status()
            .context("Enrichment endpoint returned an error status")?;
        let body: Value = response
            .json()
            .await
            .context("Failed to decode enrichment response")?;

        Ok(collect_items(&body))
    }
}
