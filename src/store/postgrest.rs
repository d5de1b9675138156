use super::traits::ListingStore;
use super::types::Page;
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::facets::SortKey;
use crate::models::ListingSummary;
use crate::query::{Condition, Direction, OrderTerm, Predicate};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Listing store backed by a PostgREST endpoint of the hosted database
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    table: String,
}

impl PostgrestStore {
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let base_url = config
            .url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::NotConfigured {
                message: "backend.url is not set".to_string(),
            })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref() {
            let apikey = HeaderValue::from_str(key).map_err(|_| Error::ConfigError {
                message: "backend.api_key contains invalid header characters".to_string(),
            })?;
            let bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                Error::ConfigError {
                    message: "backend.api_key contains invalid header characters".to_string(),
                }
            })?;
            headers.insert("apikey", apikey);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("rentals-discover/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            table: config.table.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl ListingStore for PostgrestStore {
    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let mut params = filter_params(predicate);
        params.push(("select".to_string(), "id".to_string()));

        debug!("Counting {} where {}", self.table, predicate);

        let response = self
            .client
            .head(self.endpoint())
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Count request returned status: {}", response.status());
            return Err(Error::BackendStatus {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::MalformedResponse {
                message: "missing Content-Range header".to_string(),
            })?;

        let count = parse_content_range_total(header)?;
        debug!("Count settled at {}", count);
        Ok(count)
    }

    async fn fetch(
        &self,
        predicate: &Predicate,
        sort: SortKey,
        page: Page,
    ) -> Result<Vec<ListingSummary>> {
        let mut params = filter_params(predicate);
        params.push(("select".to_string(), "*".to_string()));
        params.push(("order".to_string(), order_param(sort.order_by())));
        params.push(("limit".to_string(), page.size.to_string()));
        params.push(("offset".to_string(), page.offset().to_string()));

        info!(
            "Fetching page {} of {} sorted by {}",
            page.index,
            self.table,
            sort.as_str()
        );

        let response = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Fetch request returned status: {}", status);
            return Err(Error::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let rows: Vec<ListingSummary> = serde_json::from_slice(&bytes)?;
        debug!("Fetched {} listings", rows.len());
        Ok(rows)
    }

    fn backend_name(&self) -> &'static str {
        "postgrest"
    }
}

/// Render predicate conditions as PostgREST horizontal-filter parameters.
pub fn filter_params(predicate: &Predicate) -> Vec<(String, String)> {
    predicate
        .conditions()
        .iter()
        .map(|condition| {
            let column = condition.field().column();
            match condition {
                Condition::Eq { value, .. } => (column.to_string(), format!("eq.{value}")),
                Condition::Gte { value, .. } => (column.to_string(), format!("gte.{value}")),
                Condition::Lte { value, .. } => (column.to_string(), format!("lte.{value}")),
                Condition::In { values, .. } => {
                    let list: Vec<String> = values.iter().map(|v| quote(v)).collect();
                    (column.to_string(), format!("in.({})", list.join(",")))
                }
                Condition::InIgnoreCase { values, .. } => {
                    let alternatives: Vec<String> = values
                        .iter()
                        .map(|v| format!("{column}.imatch.{}", quote(&anchored_regex(v))))
                        .collect();
                    ("or".to_string(), format!("({})", alternatives.join(",")))
                }
                Condition::ContainsAll { values, .. } => {
                    let list: Vec<String> = values.iter().map(|v| quote(v)).collect();
                    (column.to_string(), format!("cs.{{{}}}", list.join(",")))
                }
            }
        })
        .collect()
}

pub fn order_param(terms: &[OrderTerm]) -> String {
    terms
        .iter()
        .map(|term| {
            let direction = match term.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            if term.nulls_last {
                format!("{}.{}.nullslast", term.column, direction)
            } else {
                format!("{}.{}", term.column, direction)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Result<u64> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| Error::MalformedResponse {
            message: format!("unusable Content-Range: {header}"),
        })
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Case-insensitive whole-value match: `*`, `%` and `_` are wildcards in
/// PostgREST `like` patterns, so exact matching goes through an anchored regex.
fn anchored_regex(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('^');
    for ch in value.chars() {
        if "\\.^$*+?()[]{}|".contains(ch) {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('$');
    pattern
}
