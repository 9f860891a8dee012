//! Quote provider abstraction.
//!
//! Defines the `QuoteProvider` trait that every snapshot source implements.

use async_trait::async_trait;
use std::fmt;

use super::{MarketSegment, QuoteRow, QuoteSnapshot};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to quote providers.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network error (connection failed, timeout, unexpected HTTP status)
    Network(String),
    /// Rate limit exceeded
    RateLimited { retry_after_secs: Option<u64> },
    /// Data not available for the requested segment/code
    DataNotAvailable(String),
    /// Provider is temporarily unavailable
    Unavailable(String),
    /// Invalid request parameters
    InvalidRequest(String),
    /// Internal provider error (bad payload, non-zero return code)
    Internal(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::RateLimited { retry_after_secs } => {
                write!(f, "Rate limited")?;
                if let Some(secs) = retry_after_secs {
                    write!(f, ", retry after {} seconds", secs)?;
                }
                Ok(())
            }
            Self::DataNotAvailable(msg) => write!(f, "Data not available: {}", msg),
            Self::Unavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            Self::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Whether running the same command again later could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::Unavailable(_)
        )
    }
}

// ============================================================================
// Quote Provider Trait
// ============================================================================

/// Source of real-time quote snapshots.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name (e.g., "eastmoney")
    fn name(&self) -> &'static str;

    /// Fetch every listing of a segment.
    async fn fetch_snapshot(&self, segment: MarketSegment) -> Result<QuoteSnapshot, ProviderError>;

    /// Fetch the row of a single listing.
    ///
    /// Default implementation fetches the whole segment and filters by code.
    async fn fetch_quote(
        &self,
        segment: MarketSegment,
        code: &str,
    ) -> Result<QuoteRow, ProviderError> {
        let snapshot = self.fetch_snapshot(segment).await?;
        snapshot.find(code).cloned().ok_or_else(|| {
            ProviderError::DataNotAvailable(format!("{} not listed in {}", code, segment.code()))
        })
    }
}

#[async_trait]
impl<P: QuoteProvider + ?Sized> QuoteProvider for std::sync::Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_snapshot(&self, segment: MarketSegment) -> Result<QuoteSnapshot, ProviderError> {
        (**self).fetch_snapshot(segment).await
    }

    async fn fetch_quote(
        &self,
        segment: MarketSegment,
        code: &str,
    ) -> Result<QuoteRow, ProviderError> {
        (**self).fetch_quote(segment, code).await
    }
}
