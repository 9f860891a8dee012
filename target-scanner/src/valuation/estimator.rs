//! Target-price estimator.
//!
//! Four multiplicative heuristics over the current price, averaged into a
//! single target and classified by upside.

use serde_json::Value;
use target_common::ValuationSettings;
use thiserror::Error;

use super::types::{Recommendation, TargetPrices, ValuationResult};
use crate::data::{columns, QuoteRow};

/// Uplift of the conservative scenario.
pub const CONSERVATIVE_MULTIPLIER: f64 = 1.15;

/// Uplift of the optimistic scenario.
pub const OPTIMISTIC_MULTIPLIER: f64 = 1.35;

/// Margin improvement is scaled by this factor before being applied to price.
pub const MARGIN_LEVERAGE: f64 = 5.0;

/// Why a row could not be valued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("row has no columns")]
    EmptyRow,

    #[error("row has no '{}' column", columns::LATEST_PRICE)]
    MissingPrice,

    #[error("price {0:?} is not a number")]
    NonNumericPrice(String),

    #[error("price {0} must be a positive finite number")]
    InvalidPrice(f64),
}

// ============================================================================
// Industry Metrics
// ============================================================================

/// Industry assumptions behind the growth- and margin-based targets.
///
/// `industry_ps_ratio` and `discount_rate` are kept alongside the others but
/// no formula reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryMetrics {
    /// Expected revenue growth (0.20 = 20%)
    pub revenue_growth_rate: f64,
    /// Expected profit margin improvement (0.02 = 2 points)
    pub profit_margin_improvement: f64,
    /// Industry price/sales ratio
    pub industry_ps_ratio: f64,
    /// Discount rate
    pub discount_rate: f64,
}

impl Default for IndustryMetrics {
    fn default() -> Self {
        Self::from(ValuationSettings::default())
    }
}

impl From<ValuationSettings> for IndustryMetrics {
    fn from(settings: ValuationSettings) -> Self {
        Self {
            revenue_growth_rate: settings.revenue_growth_rate,
            profit_margin_improvement: settings.profit_margin_improvement,
            industry_ps_ratio: settings.industry_ps_ratio,
            discount_rate: settings.discount_rate,
        }
    }
}

// ============================================================================
// Estimator
// ============================================================================

/// Stateless target-price estimator.
#[derive(Debug, Clone, Default)]
pub struct ValuationEstimator {
    metrics: IndustryMetrics,
}

impl ValuationEstimator {
    pub fn new(metrics: IndustryMetrics) -> Self {
        Self { metrics }
    }

    /// Value a current price.
    pub fn estimate(&self, price: f64) -> Result<ValuationResult, ValuationError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(ValuationError::InvalidPrice(price));
        }

        let growth_based = price * (1.0 + self.metrics.revenue_growth_rate);
        let margin_based =
            price * (1.0 + self.metrics.profit_margin_improvement * MARGIN_LEVERAGE);
        let conservative = price * CONSERVATIVE_MULTIPLIER;
        let optimistic = price * OPTIMISTIC_MULTIPLIER;
        let average = (growth_based + margin_based + conservative + optimistic) / 4.0;

        let upside_potential = (average - price) / price * 100.0;

        Ok(ValuationResult {
            current_price: price,
            target_prices: TargetPrices {
                growth_based,
                margin_based,
                conservative,
                optimistic,
                average,
            },
            upside_potential,
            recommendation: Recommendation::from_upside(upside_potential),
        })
    }

    /// Value the latest price of a quote row.
    pub fn estimate_row(&self, row: &QuoteRow) -> Result<ValuationResult, ValuationError> {
        self.estimate(row_price(row)?)
    }
}

/// Read the latest price column.
///
/// Numbers and numeric strings are accepted; `null` counts as missing.
fn row_price(row: &QuoteRow) -> Result<f64, ValuationError> {
    if row.is_empty() {
        return Err(ValuationError::EmptyRow);
    }

    match row.get(columns::LATEST_PRICE) {
        None | Some(Value::Null) => Err(ValuationError::MissingPrice),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ValuationError::NonNumericPrice(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValuationError::NonNumericPrice(s.clone())),
        Some(other) => Err(ValuationError::NonNumericPrice(other.to_string())),
    }
}
