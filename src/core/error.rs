//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`BarcoError`] which covers every failure mode of a
//! checkout session. It uses `thiserror` for ergonomic error definitions and
//! provides constructor helpers for the common cases.
//!
//! # Public API
//! - [`BarcoError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, BarcoError>`
//!
//! # Error Categories
//! - **Scanner**: Device missing or not readable
//! - **Lookup**: Catalog unreachable, malformed response, unknown product
//! - **Edits**: Invalid quantity, price or barcode; editing an absent row
//! - **Configuration**: Config directory or file problems

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for barco-bill
#[derive(Error, Debug)]
pub enum BarcoError {
    // Scanner errors
    #[error("Scanner unavailable at '{path}': {source}")]
    ScannerUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scanner is already running")]
    ScannerAlreadyRunning,

    #[error("Scanner is not running")]
    ScannerNotRunning,

    // Lookup errors
    #[error("Lookup failed for {barcode}: {reason}")]
    LookupFailed { barcode: String, reason: String },

    #[error("Product {barcode} not found in catalog")]
    ProductNotFound { barcode: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Cart edit errors
    #[error("Invalid barcode: '{input}'")]
    InvalidBarcode { input: String },

    #[error("Invalid quantity: {input}. Quantity must be a whole number of at least 1")]
    InvalidQuantity { input: String },

    #[error("Invalid price: {input}. Price must be a non-negative amount")]
    InvalidPrice { input: String },

    #[error("No item with barcode {barcode} in the cart")]
    ItemNotFound { barcode: String },

    // Console errors
    #[error("Unknown command: '{command}'. Type 'help' for the list of commands")]
    UnknownCommand { command: String },

    #[error("Usage: {usage}")]
    Usage { usage: String },

    // Configuration errors
    #[error("Could not find config directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read config file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using BarcoError
pub type Result<T> = std::result::Result<T, BarcoError>;

impl BarcoError {
    /// Create a scanner unavailable error
    pub fn scanner_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ScannerUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a lookup failed error
    pub fn lookup_failed(barcode: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LookupFailed {
            barcode: barcode.into(),
            reason: reason.into(),
        }
    }

    /// Create a product not found error
    pub fn product_not_found(barcode: impl Into<String>) -> Self {
        Self::ProductNotFound {
            barcode: barcode.into(),
        }
    }

    /// Create an invalid barcode error
    pub fn invalid_barcode(input: impl Into<String>) -> Self {
        Self::InvalidBarcode {
            input: input.into(),
        }
    }

    /// Create an invalid quantity error
    pub fn invalid_quantity(input: impl ToString) -> Self {
        Self::InvalidQuantity {
            input: input.to_string(),
        }
    }

    /// Create an invalid price error
    pub fn invalid_price(input: impl ToString) -> Self {
        Self::InvalidPrice {
            input: input.to_string(),
        }
    }

    /// Create an item not found error
    pub fn item_not_found(barcode: impl Into<String>) -> Self {
        Self::ItemNotFound {
            barcode: barcode.into(),
        }
    }

    /// Create an unknown command error
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Create a usage error
    pub fn usage(usage: impl Into<String>) -> Self {
        Self::Usage {
            usage: usage.into(),
        }
    }

    /// Create a config read failed error
    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a config parse failed error
    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure should prompt the operator for a manual price
    pub fn needs_manual_price(&self) -> bool {
        matches!(
            self,
            Self::LookupFailed { .. } | Self::ProductNotFound { .. } | Self::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BarcoError::ScannerNotRunning;
        assert_eq!(err.to_string(), "Scanner is not running");
    }

    #[test]
    fn test_invalid_quantity_error() {
        let err = BarcoError::invalid_quantity(0);
        assert_eq!(
            err.to_string(),
            "Invalid quantity: 0. Quantity must be a whole number of at least 1"
        );
    }

    #[test]
    fn test_invalid_price_error() {
        let err = BarcoError::invalid_price("-3");
        assert!(err.to_string().contains("-3"));
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_scanner_unavailable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such device");
        let err = BarcoError::scanner_unavailable("/dev/scanner0", io_err);
        assert!(err.to_string().contains("/dev/scanner0"));
        assert!(err.to_string().contains("no such device"));
    }

    #[test]
    fn test_lookup_errors_need_manual_price() {
        assert!(BarcoError::product_not_found("0002").needs_manual_price());
        assert!(BarcoError::lookup_failed("0002", "timeout").needs_manual_price());
        assert!(!BarcoError::item_not_found("0002").needs_manual_price());
    }

    #[test]
    fn test_lookup_not_found_and_failed_are_distinct() {
        let not_found = BarcoError::product_not_found("0002");
        let failed = BarcoError::lookup_failed("0002", "connection refused");
        assert!(matches!(not_found, BarcoError::ProductNotFound { .. }));
        assert!(matches!(failed, BarcoError::LookupFailed { .. }));
        assert_ne!(not_found.to_string(), failed.to_string());
    }

    #[test]
    fn test_config_parse_failed() {
        let path = std::path::PathBuf::from("/test/config.json");
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json").unwrap_err();
        let err = BarcoError::config_parse_failed(&path, json_err);
        assert!(err.to_string().contains("/test/config.json"));
        assert!(err.to_string().contains("Failed to parse"));
    }
}
