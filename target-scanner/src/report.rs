//! Console report rendering.
//!
//! Human-readable output is informational only; `--json` output uses
//! [`RowValuation`], one object per line.

use serde::Serialize;

use crate::data::MarketSegment;
use crate::valuation::ValuationResult;

/// Text report for one valued listing.
#[derive(Debug, Clone, Copy)]
pub struct ValuationReport<'a> {
    pub code: Option<&'a str>,
    pub name: Option<&'a str>,
    /// Prefix printed before every price, e.g. "¥" or "HK$"
    pub currency: &'a str,
    pub result: &'a ValuationResult,
}

impl<'a> ValuationReport<'a> {
    pub fn new(result: &'a ValuationResult, currency: &'a str) -> Self {
        Self {
            code: None,
            name: None,
            currency,
            result,
        }
    }

    pub fn with_listing(mut self, code: Option<&'a str>, name: Option<&'a str>) -> Self {
        self.code = code;
        self.name = name;
        self
    }

    /// Render as text, one line per figure.
    pub fn to_text(&self) -> String {
        let r = self.result;
        let t = &r.target_prices;
        let c = self.currency;

        let title = match (self.code, self.name) {
            (Some(code), Some(name)) => format!("{} {}", code, name),
            (Some(code), None) => code.to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => "Target price".to_string(),
        };

        let mut out = String::new();
        out.push_str(&format!("=== {} ===\n", title));
        out.push_str(&format!("Current price: {}{:.2}\n", c, r.current_price));
        out.push_str("\n📊 Target price range:\n");
        out.push_str(&format!("Growth-based: {}{:.2}\n", c, t.growth_based));
        out.push_str(&format!("Margin-based: {}{:.2}\n", c, t.margin_based));
        out.push_str(&format!("Conservative: {}{:.2}\n", c, t.conservative));
        out.push_str(&format!("Optimistic: {}{:.2}\n", c, t.optimistic));
        out.push_str(&format!("Average target: {}{:.2}\n", c, t.average));
        out.push_str(&format!("Upside: {:.1}%\n", r.upside_potential));
        out.push_str(&format!(
            "Recommendation: {} {}\n",
            r.recommendation,
            r.recommendation.emoji()
        ));
        out
    }
}

/// Machine-readable form of one valued listing.
#[derive(Debug, Clone, Serialize)]
pub struct RowValuation<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<MarketSegment>,
    #[serde(flatten)]
    pub result: &'a ValuationResult,
}

impl RowValuation<'_> {
    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> String {
        // Only plain strings and finite floats reach here.
        serde_json::to_string(self).unwrap_or_default()
    }
}
