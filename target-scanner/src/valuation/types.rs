//! Valuation result types.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Recommendation
// ============================================================================

/// Categorical recommendation derived from upside potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Recommendation {
    /// Upside above 25% (强烈买入)
    #[serde(rename = "strong buy")]
    StrongBuy,
    /// Upside above 15%, up to 25% (买入)
    #[serde(rename = "buy")]
    Buy,
    /// Upside above 5%, up to 15% (持有)
    #[serde(rename = "hold")]
    Hold,
    /// Upside of 5% or less (观望)
    #[serde(rename = "watch")]
    Watch,
}

impl Recommendation {
    /// All recommendations, strongest first.
    pub const ALL: [Recommendation; 4] = [Self::StrongBuy, Self::Buy, Self::Hold, Self::Watch];

    /// Classify an upside percentage.
    ///
    /// Thresholds are strict, so a boundary value belongs to the lower bucket
    /// (25.0 is `Buy`). NaN falls through to `Watch`.
    pub fn from_upside(upside: f64) -> Self {
        if upside > 25.0 {
            Self::StrongBuy
        } else if upside > 15.0 {
            Self::Buy
        } else if upside > 5.0 {
            Self::Hold
        } else {
            Self::Watch
        }
    }

    /// Fixed label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongBuy => "strong buy",
            Self::Buy => "buy",
            Self::Hold => "hold",
            Self::Watch => "watch",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::StrongBuy => "🔥",
            Self::Buy => "👍",
            Self::Hold => "✋",
            Self::Watch => "👀",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Valuation Result
// ============================================================================

/// Named target-price estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPrices {
    /// Price grown by the revenue growth rate
    pub growth_based: f64,
    /// Price lifted by five times the margin improvement
    pub margin_based: f64,
    /// Fixed 15% uplift
    pub conservative: f64,
    /// Fixed 35% uplift
    pub optimistic: f64,
    /// Arithmetic mean of the four estimates above
    pub average: f64,
}

/// Outcome of valuing one current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub current_price: f64,
    pub target_prices: TargetPrices,
    /// (average - current) / current * 100
    pub upside_potential: f64,
    pub recommendation: Recommendation,
}
