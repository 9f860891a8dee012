//! Market data module.
//!
//! Provides quote snapshots for whole market segments and the row type the
//! valuation estimator consumes.
//!
//! # Data Sources
//! - **Eastmoney** (only source): public quote-list API, no key, no rate limit

mod eastmoney;
mod provider;

pub use eastmoney::EastmoneyAdapter;
pub use provider::{ProviderError, QuoteProvider};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Column names used in [`QuoteRow`].
pub mod columns {
    /// Listing code, e.g. "000001" or "03690"
    pub const CODE: &str = "code";
    /// Short display name
    pub const NAME: &str = "name";
    /// Provider market id
    pub const MARKET: &str = "market";
    /// Latest traded price
    pub const LATEST_PRICE: &str = "latest_price";
    /// Change vs previous close (%)
    pub const CHANGE_PCT: &str = "change_pct";
    /// Change vs previous close (absolute)
    pub const CHANGE: &str = "change";
    /// Volume (lots)
    pub const VOLUME: &str = "volume";
    /// Turnover (currency)
    pub const TURNOVER: &str = "turnover";
    pub const HIGH: &str = "high";
    pub const LOW: &str = "low";
    pub const OPEN: &str = "open";
    pub const PREV_CLOSE: &str = "prev_close";
}

// ============================================================================
// Market Segment
// ============================================================================

/// A listed-equity segment queried as one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketSegment {
    /// Shanghai A-shares (沪A)
    #[serde(rename = "sh")]
    Shanghai,
    /// Shenzhen A-shares (深A)
    #[serde(rename = "sz")]
    Shenzhen,
    /// Beijing A-shares (京A)
    #[serde(rename = "bj")]
    Beijing,
    /// Hong Kong main board (港股)
    #[serde(rename = "hk")]
    HongKong,
}

impl MarketSegment {
    /// All supported segments.
    pub const ALL: [MarketSegment; 4] = [
        Self::Shanghai,
        Self::Shenzhen,
        Self::Beijing,
        Self::HongKong,
    ];

    /// Short code used in config and on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Shanghai => "sh",
            Self::Shenzhen => "sz",
            Self::Beijing => "bj",
            Self::HongKong => "hk",
        }
    }

    /// Eastmoney `fs` filter selecting this segment's listings.
    pub fn eastmoney_filter(&self) -> &'static str {
        match self {
            Self::Shanghai => "m:1 t:2,m:1 t:23",
            Self::Shenzhen => "m:0 t:6,m:0 t:80",
            Self::Beijing => "m:0 t:81 s:2048",
            Self::HongKong => "m:128 t:3,m:128 t:4,m:128 t:1,m:128 t:2",
        }
    }

    /// Currency prefix used when printing prices.
    pub fn currency_prefix(&self) -> &'static str {
        match self {
            Self::HongKong => "HK$",
            _ => "¥",
        }
    }
}

impl fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shanghai => write!(f, "沪A"),
            Self::Shenzhen => write!(f, "深A"),
            Self::Beijing => write!(f, "京A"),
            Self::HongKong => write!(f, "港股"),
        }
    }
}

impl FromStr for MarketSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sh" | "sse" | "shanghai" => Ok(Self::Shanghai),
            "sz" | "szse" | "shenzhen" => Ok(Self::Shenzhen),
            "bj" | "bse" | "beijing" => Ok(Self::Beijing),
            "hk" | "hkex" | "hongkong" => Ok(Self::HongKong),
            other => Err(format!(
                "unknown market segment '{}', expected one of: sh, sz, bj, hk",
                other
            )),
        }
    }
}

// ============================================================================
// Quote Row
// ============================================================================

/// One row of a quote snapshot.
///
/// Values stay as the provider sent them; the estimator decides whether the
/// price column is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteRow {
    columns: Map<String, Value>,
}

impl QuoteRow {
    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            columns: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Raw value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Listing code, if present.
    pub fn code(&self) -> Option<&str> {
        self.get(columns::CODE).and_then(Value::as_str)
    }

    /// Display name, if present.
    pub fn name(&self) -> Option<&str> {
        self.get(columns::NAME).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Quote Snapshot
// ============================================================================

/// Rows for one segment as returned by a single fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub segment: MarketSegment,
    pub rows: Vec<QuoteRow>,
    pub fetched_at: DateTime<Utc>,
}

impl QuoteSnapshot {
    pub fn new(segment: MarketSegment, rows: Vec<QuoteRow>) -> Self {
        Self {
            segment,
            rows,
            fetched_at: Utc::now(),
        }
    }

    /// Find the row for a listing code.
    pub fn find(&self, code: &str) -> Option<&QuoteRow> {
        self.rows.iter().find(|row| row.code() == Some(code))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
