//! Configuration validation for target-scanner.
//!
//! Checks that every configured value is present and within a range the
//! scanner can work with before any request is made.

use thiserror::Error;

use crate::config::{
    Config, ObservabilityConfig, QuoteProviderConfig, ScanConfig, ValuationSettings, SEGMENT_NAMES,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.observability.validate(),
            self.provider.validate(),
            self.valuation.validate(),
            self.scan.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for QuoteProviderConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "provider.base_url".into(),
            });
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| ValidationError::InvalidValue {
            field: "provider.base_url".into(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidValue {
                field: "provider.base_url".into(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "provider.timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.page_size == 0 {
            return Err(ValidationError::InvalidValue {
                field: "provider.page_size".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

impl Validate for ValuationSettings {
    fn validate(&self) -> ValidationResult<()> {
        let fields = [
            ("valuation.revenue_growth_rate", self.revenue_growth_rate),
            ("valuation.profit_margin_improvement", self.profit_margin_improvement),
            ("valuation.industry_ps_ratio", self.industry_ps_ratio),
            ("valuation.discount_rate", self.discount_rate),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "must be a finite number".into(),
                });
            }
        }

        // Target prices must stay positive for any positive current price.
        if 1.0 + self.revenue_growth_rate <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "valuation.revenue_growth_rate".into(),
                reason: "must be greater than -1".into(),
            });
        }
        if 1.0 + self.profit_margin_improvement * 5.0 <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "valuation.profit_margin_improvement".into(),
                reason: "must be greater than -0.2".into(),
            });
        }

        Ok(())
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.segments.is_empty() {
            return Err(ValidationError::MissingField {
                field: "scan.segments".into(),
            });
        }

        let unknown: Vec<&str> = self
            .segments
            .iter()
            .map(String::as_str)
            .filter(|s| !SEGMENT_NAMES.contains(&s.trim().to_lowercase().as_str()))
            .collect();
        if !unknown.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "scan.segments".into(),
                reason: format!(
                    "unknown segment(s) {:?}, expected one of: sh, sz, bj, hk",
                    unknown
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.observability.log_level = "loud".into();
        let result = config.validate();
        if let Err(ValidationError::InvalidValue { field, .. }) = result {
            assert_eq!(field, "observability.log_level");
        } else {
            panic!("expected InvalidValue, got {:?}", result);
        }
    }

    #[test_case("" ; "empty")]
    #[test_case("not a url" ; "unparseable")]
    #[test_case("ftp://example.com" ; "wrong scheme")]
    fn test_invalid_base_url(url: &str) {
        let provider = QuoteProviderConfig {
            base_url: url.into(),
            ..Default::default()
        };
        assert!(provider.validate().is_err());
    }

    #[test]
    fn test_zero_page_size() {
        let provider = QuoteProviderConfig {
            page_size: 0,
            ..Default::default()
        };
        let err = provider.validate().unwrap_err();
        assert!(err.to_string().contains("provider.page_size"));
    }

    #[test]
    fn test_non_finite_metric() {
        let settings = ValuationSettings {
            discount_rate: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_growth_rate_must_keep_multiplier_positive() {
        let settings = ValuationSettings {
            revenue_growth_rate: -1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test_case(&["xx"] ; "unknown code")]
    #[test_case(&["bj", "nyse"] ; "one bad entry")]
    #[test_case(&[""] ; "blank")]
    fn test_unknown_segment_rejected(segments: &[&str]) {
        let scan = ScanConfig {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let err = scan.validate().unwrap_err();
        assert!(err.to_string().contains("scan.segments"));
    }

    #[test]
    fn test_segment_names_case_insensitive() {
        let scan = ScanConfig {
            segments: vec!["SH".into(), " hk ".into(), "Beijing".into()],
            ..Default::default()
        };
        assert!(scan.validate().is_ok());
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.observability.log_format = "xml".into();
        config.scan.segments.clear();
        assert!(matches!(config.validate(), Err(ValidationError::Multiple(errs)) if errs.len() == 2));
    }
}
