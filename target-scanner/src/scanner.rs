//! Snapshot scanner.
//!
//! Drives the estimator over every row of one or more segment snapshots.
//! A row that cannot be valued is reported and skipped; a segment that cannot
//! be fetched is reported and the next segment still runs.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{info, warn};
use uuid::Uuid;

use crate::data::{MarketSegment, ProviderError, QuoteProvider, QuoteRow};
use crate::report::{RowValuation, ValuationReport};
use crate::valuation::{Recommendation, ValuationEstimator, ValuationResult};

/// Output style for valued rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Multi-line human report
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Scanner options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub format: OutputFormat,
    /// Stop after this many rows per segment
    pub limit: Option<usize>,
    /// Replaces the segment's own currency prefix
    pub currency_prefix: Option<String>,
}

/// Per-segment scan statistics.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub scan_id: Uuid,
    pub segment: MarketSegment,
    pub fetched_at: DateTime<Utc>,
    /// Rows evaluated (after the limit)
    pub rows: usize,
    pub valued: usize,
    pub failed: usize,
    pub by_recommendation: BTreeMap<Recommendation, usize>,
}

impl ScanSummary {
    fn new(segment: MarketSegment, fetched_at: DateTime<Utc>) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            segment,
            fetched_at,
            rows: 0,
            valued: 0,
            failed: 0,
            by_recommendation: BTreeMap::new(),
        }
    }

    fn record(&mut self, outcome: Option<&ValuationResult>) {
        self.rows += 1;
        match outcome {
            Some(result) => {
                self.valued += 1;
                *self.by_recommendation.entry(result.recommendation).or_default() += 1;
            }
            None => self.failed += 1,
        }
    }

    /// One-line human summary.
    pub fn to_line(&self) -> String {
        let buckets = Recommendation::ALL
            .iter()
            .map(|r| format!("{}={}", r, self.by_recommendation.get(r).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "[{}] {} rows, {} valued, {} failed ({})",
            self.segment, self.rows, self.valued, self.failed, buckets
        )
    }
}

/// Runs valuations over provider snapshots.
pub struct Scanner<P> {
    provider: P,
    estimator: ValuationEstimator,
    options: ScanOptions,
}

impl<P: QuoteProvider> Scanner<P> {
    pub fn new(provider: P, estimator: ValuationEstimator, options: ScanOptions) -> Self {
        Self {
            provider,
            estimator,
            options,
        }
    }

    /// Value one row and write its report.
    ///
    /// Failures are reported to `out` and logged; the caller only sees `None`.
    pub fn evaluate_row<W: Write>(
        &self,
        out: &mut W,
        segment: MarketSegment,
        row: &QuoteRow,
    ) -> Option<ValuationResult> {
        match self.estimator.estimate_row(row) {
            Ok(result) => {
                let rendered = match self.options.format {
                    OutputFormat::Text => ValuationReport::new(&result, self.currency(segment))
                        .with_listing(row.code(), row.name())
                        .to_text(),
                    OutputFormat::Json => {
                        let mut line = RowValuation {
                            code: row.code(),
                            name: row.name(),
                            segment: Some(segment),
                            result: &result,
                        }
                        .to_json_line();
                        line.push('\n');
                        line
                    }
                };
                emit(out, &rendered);
                Some(result)
            }
            Err(e) => {
                let code = row.code().unwrap_or("?");
                warn!(segment = segment.code(), code, error = %e, "Valuation failed");
                if self.options.format == OutputFormat::Text {
                    emit(out, &format!("Target price calculation failed for {}: {}\n", code, e));
                }
                None
            }
        }
    }

    /// Fetch one segment and value every row.
    pub async fn scan_segment<W: Write>(
        &self,
        out: &mut W,
        segment: MarketSegment,
    ) -> Result<ScanSummary, ProviderError> {
        let snapshot = self.provider.fetch_snapshot(segment).await?;
        info!(
            provider = self.provider.name(),
            segment = segment.code(),
            rows = snapshot.len(),
            "Snapshot fetched"
        );

        let mut summary = ScanSummary::new(segment, snapshot.fetched_at);
        let limit = self.options.limit.unwrap_or(usize::MAX);

        for row in snapshot.rows.iter().take(limit) {
            let outcome = self.evaluate_row(out, segment, row);
            summary.record(outcome.as_ref());
        }

        info!(
            scan_id = %summary.scan_id,
            segment = segment.code(),
            valued = summary.valued,
            failed = summary.failed,
            "Segment scan complete"
        );

        Ok(summary)
    }

    /// Scan several segments in order.
    ///
    /// A failed fetch is logged and yields an `Err` entry; later segments run
    /// regardless.
    pub async fn scan<W: Write>(
        &self,
        out: &mut W,
        segments: &[MarketSegment],
    ) -> Vec<(MarketSegment, Result<ScanSummary, ProviderError>)> {
        let mut outcomes = Vec::with_capacity(segments.len());

        for &segment in segments {
            let outcome = self.scan_segment(out, segment).await;
            match &outcome {
                Ok(summary) => {
                    if self.options.format == OutputFormat::Text {
                        emit(out, &format!("{}\n", summary.to_line()));
                    }
                }
                Err(e) => {
                    warn!(
                        segment = segment.code(),
                        error = %e,
                        recoverable = e.is_recoverable(),
                        "Snapshot fetch failed"
                    );
                }
            }
            outcomes.push((segment, outcome));
        }

        outcomes
    }

    /// Value a single listing.
    pub async fn evaluate_code<W: Write>(
        &self,
        out: &mut W,
        segment: MarketSegment,
        code: &str,
    ) -> Result<Option<ValuationResult>, ProviderError> {
        let row = self.provider.fetch_quote(segment, code).await?;
        Ok(self.evaluate_row(out, segment, &row))
    }

    fn currency(&self, segment: MarketSegment) -> &str {
        self.options
            .currency_prefix
            .as_deref()
            .unwrap_or_else(|| segment.currency_prefix())
    }
}

/// Write rendered output; a broken sink is logged, not fatal.
fn emit<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()) {
        warn!(error = %e, "Failed to write report");
    }
}
