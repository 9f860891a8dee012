//! Target Common - shared configuration, validation and logging for target-scanner.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod validation;

pub use config::{
    Config, ObservabilityConfig, QuoteProviderConfig, ScanConfig, ValuationSettings, SEGMENT_NAMES,
};
pub use validation::{Validate, ValidationError, ValidationResult};
