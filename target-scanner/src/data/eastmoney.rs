//! Eastmoney adapter for real-time quote snapshots.
//!
//! Uses the public quote-list endpoint (`/api/qt/clist/get`), the same one
//! behind Eastmoney's A-share and HK spot tables. Single listings go through
//! `/api/qt/ulist.np/get`, which returns the same field ids for a `secid`.
//!
//! # Advantages
//! - No API key required
//! - One request per page covers hundreds of listings

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use target_common::QuoteProviderConfig;
use tracing::{debug, warn};

use super::provider::{ProviderError, QuoteProvider};
use super::{columns, MarketSegment, QuoteRow, QuoteSnapshot};

// ============================================================================
// Constants
// ============================================================================

/// Quote-list path on the push2 hosts
const CLIST_PATH: &str = "/api/qt/clist/get";

/// Per-listing quote path, keyed by `secids`
const ULIST_PATH: &str = "/api/qt/ulist.np/get";

/// Public token expected by the endpoint
const UT_TOKEN: &str = "bd1d9ddb04089700cf9c27f6f7426281";

/// Field ids mapped to row columns.
///
/// `f2` is the latest price; with `fltt=2` numbers arrive as decimals and
/// suspended listings send `"-"`.
const FIELD_COLUMNS: &[(&str, &str)] = &[
    ("f12", columns::CODE),
    ("f14", columns::NAME),
    ("f13", columns::MARKET),
    ("f2", columns::LATEST_PRICE),
    ("f3", columns::CHANGE_PCT),
    ("f4", columns::CHANGE),
    ("f5", columns::VOLUME),
    ("f6", columns::TURNOVER),
    ("f15", columns::HIGH),
    ("f16", columns::LOW),
    ("f17", columns::OPEN),
    ("f18", columns::PREV_CLOSE),
];

/// Upper bound on pages per snapshot
const MAX_PAGES: u32 = 500;

// ============================================================================
// Symbol Mapping
// ============================================================================

/// Eastmoney market id and code width of a segment.
///
/// Beijing listings share the Shenzhen market id.
fn market_of(segment: MarketSegment) -> (&'static str, usize) {
    match segment {
        MarketSegment::Shanghai => ("1", 6),
        MarketSegment::Shenzhen => ("0", 6),
        MarketSegment::Beijing => ("0", 6),
        MarketSegment::HongKong => ("116", 5),
    }
}

/// Convert a listing code to secid format ("1.600000", "116.03690").
fn to_secid(segment: MarketSegment, code: &str) -> Option<String> {
    let (market, width) = market_of(segment);
    if code.len() != width || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}.{}", market, code))
}

fn field_list() -> String {
    FIELD_COLUMNS
        .iter()
        .map(|(field, _)| *field)
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Eastmoney Adapter
// ============================================================================

/// Eastmoney quote-list adapter.
pub struct EastmoneyAdapter {
    /// HTTP client
    client: reqwest::Client,
    /// Scheme + host, no trailing slash
    base_url: String,
    /// Rows per page
    page_size: u32,
}

impl EastmoneyAdapter {
    /// Create an adapter with default settings.
    pub fn new() -> Result<Self, ProviderError> {
        Self::from_config(&QuoteProviderConfig::default())
    }

    /// Create from config.
    ///
    /// Fails when the HTTP client rejects the settings, e.g. a user agent
    /// that is not a valid header value.
    pub fn from_config(config: &QuoteProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                ProviderError::InvalidRequest(format!("Invalid HTTP client settings: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
        })
    }

    /// Fetch one page of a segment's listings.
    async fn fetch_page(
        &self,
        segment: MarketSegment,
        page: u32,
    ) -> Result<ClistPage, ProviderError> {
        let fields = field_list();
        let page_str = page.to_string();
        let page_size_str = self.page_size.to_string();

        debug!(segment = segment.code(), page, "Fetching quote page from eastmoney");

        let data = self
            .get_json(
                CLIST_PATH,
                &[
                    ("pn", page_str.as_str()),
                    ("pz", page_size_str.as_str()),
                    ("po", "1"),
                    ("np", "1"),
                    ("ut", UT_TOKEN),
                    ("fltt", "2"),
                    ("invt", "2"),
                    ("fid", "f12"),
                    ("fs", segment.eastmoney_filter()),
                    ("fields", fields.as_str()),
                ],
            )
            .await?;

        Ok(match data {
            Some(data) => ClistPage {
                total: data.total,
                rows: data.diff.into_rows(),
            },
            None => ClistPage::default(),
        })
    }

    /// Issue a GET against the quote host and unwrap the `{rc, data}` envelope.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<ClistData>, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ProviderError::RateLimited { retry_after_secs });
        }
        if status.is_server_error() {
            return Err(ProviderError::Unavailable(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        let body: ClistResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("Failed to parse response: {}", e)))?;

        if body.rc != 0 {
            return Err(ProviderError::Internal(format!(
                "Eastmoney API error: rc={}",
                body.rc
            )));
        }

        Ok(body.data)
    }
}

/// Map one `diff` entry to a row, renaming field ids to column names.
///
/// Fields the provider omitted stay absent so the estimator can tell a
/// missing price from a malformed one.
fn to_quote_row(mut entry: Map<String, Value>) -> QuoteRow {
    QuoteRow::from_pairs(
        FIELD_COLUMNS
            .iter()
            .filter_map(|(field, column)| entry.remove(*field).map(|v| (*column, v))),
    )
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for EastmoneyAdapter {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    async fn fetch_snapshot(&self, segment: MarketSegment) -> Result<QuoteSnapshot, ProviderError> {
        let mut rows = Vec::new();
        let mut total = None;

        for page in 1..=MAX_PAGES {
            let ClistPage {
                total: page_total,
                rows: page_rows,
            } = self.fetch_page(segment, page).await?;

            if page_rows.is_empty() {
                break;
            }

            total.get_or_insert(page_total);
            rows.extend(page_rows.into_iter().map(to_quote_row));

            if rows.len() as u64 >= total.unwrap_or(0) {
                break;
            }
            if page == MAX_PAGES {
                warn!(
                    segment = segment.code(),
                    fetched = rows.len(),
                    "Page limit reached before snapshot was complete"
                );
            }
        }

        debug!(segment = segment.code(), rows = rows.len(), "Fetched snapshot");

        Ok(QuoteSnapshot::new(segment, rows))
    }

    async fn fetch_quote(
        &self,
        segment: MarketSegment,
        code: &str,
    ) -> Result<QuoteRow, ProviderError> {
        let code = code.trim();
        let secid = to_secid(segment, code).ok_or_else(|| {
            ProviderError::InvalidRequest(format!(
                "Invalid symbol format: '{}' for {}",
                code,
                segment.code()
            ))
        })?;
        let fields = field_list();

        debug!(secid = %secid, "Fetching quote from eastmoney");

        let data = self
            .get_json(
                ULIST_PATH,
                &[
                    ("fltt", "2"),
                    ("invt", "2"),
                    ("ut", UT_TOKEN),
                    ("secids", secid.as_str()),
                    ("fields", fields.as_str()),
                ],
            )
            .await?;

        data.map(|d| d.diff.into_rows())
            .unwrap_or_default()
            .into_iter()
            .map(to_quote_row)
            .find(|row| row.code() == Some(code))
            .ok_or_else(|| {
                ProviderError::DataNotAvailable(format!("{} not listed in {}", code, segment.code()))
            })
    }
}

// ============================================================================
// Eastmoney API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClistResponse {
    /// Return code (0 = success)
    rc: i32,
    /// Data, null when the filter matches nothing
    data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
struct ClistData {
    /// Listings matching the filter across all pages
    #[serde(default)]
    total: u64,
    /// Listings on this page
    #[serde(default)]
    diff: ClistDiff,
}

/// `np=1` returns a list; older hosts return an object keyed by row index.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClistDiff {
    List(Vec<Map<String, Value>>),
    Keyed(BTreeMap<String, Map<String, Value>>),
}

impl Default for ClistDiff {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ClistDiff {
    fn into_rows(self) -> Vec<Map<String, Value>> {
        match self {
            Self::List(rows) => rows,
            Self::Keyed(keyed) => {
                let mut indexed: Vec<(u64, Map<String, Value>)> = keyed
                    .into_iter()
                    .map(|(k, v)| (k.parse().unwrap_or(u64::MAX), v))
                    .collect();
                indexed.sort_by_key(|(i, _)| *i);
                indexed.into_iter().map(|(_, v)| v).collect()
            }
        }
    }
}

#[derive(Debug, Default)]
struct ClistPage {
    total: u64,
    rows: Vec<Map<String, Value>>,
}

// ============================================================================
// Tests
// ============================================================================
