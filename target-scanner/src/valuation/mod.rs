//! Valuation Module.
//!
//! Turns a current price into four heuristic target prices, their average,
//! an upside percentage and a recommendation.
//!
//! | Estimate | Formula |
//! |---|---|
//! | growth-based | P × (1 + revenue growth) |
//! | margin-based | P × (1 + margin improvement × 5) |
//! | conservative | P × 1.15 |
//! | optimistic | P × 1.35 |
//!
//! # Usage
//!
//! ```
//! use target_scanner::valuation::{Recommendation, ValuationEstimator};
//!
//! let estimator = ValuationEstimator::default();
//! let result = estimator.estimate(100.0).unwrap();
//!
//! assert!((result.target_prices.average - 120.0).abs() < 1e-9);
//! assert_eq!(result.recommendation, Recommendation::Buy);
//! ```

pub mod estimator;
pub mod types;

pub use estimator::{IndustryMetrics, ValuationError, ValuationEstimator};
pub use types::{Recommendation, TargetPrices, ValuationResult};
