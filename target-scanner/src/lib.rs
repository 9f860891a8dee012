//! Target Scanner Library
//!
//! Fetches real-time quote snapshots for A-share and Hong Kong segments and
//! runs a fixed set of target-price heuristics over every listing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   snapshot   ┌──────────────┐   price   ┌────────────────────┐
//! │  QuoteProvider   │ ───────────▶ │   Scanner    │ ────────▶ │ ValuationEstimator │
//! │  (Eastmoney)     │              │  (per row)   │ ◀──────── │  (pure function)   │
//! └──────────────────┘              └──────┬───────┘  result   └────────────────────┘
//!                                          │ report
//!                                          ▼
//!                                        stdout
//! ```
//!
//! # Key Concepts
//!
//! - **Target price**: a projected price under one named heuristic
//! - **Upside**: percentage gap between the average target and the current price
//! - **Recommendation**: strong buy / buy / hold / watch, by upside thresholds 25 / 15 / 5

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod report;
pub mod scanner;
pub mod valuation;

pub use data::{EastmoneyAdapter, MarketSegment, ProviderError, QuoteProvider, QuoteRow, QuoteSnapshot};
pub use scanner::{OutputFormat, ScanOptions, ScanSummary, Scanner};
pub use valuation::{
    IndustryMetrics, Recommendation, TargetPrices, ValuationError, ValuationEstimator,
    ValuationResult,
};
