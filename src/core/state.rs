//! Cart state data structures.
//!
//! This module defines the plain data carried by a checkout session. The
//! [`Cart`](crate::core::cart::Cart) is the only owner allowed to mutate these
//! values; everything else reads them through shared references.
//!
//! # Public API
//! - [`LineItem`]: One scanned product with quantity and optional unit price
//! - [`LineItemId`]: Stable identifier handed out when a row is created
//! - [`TransactionId`]: Session identifier embedded in the receipt
//! - [`Product`]: Catalog metadata used to patch a provisional row
//! - [`validate_barcode`]: Boundary check for scanned or typed barcodes
//!
//! # Derived values
//! - **Line total**: `quantity * unit_price`, computed on every read and never
//!   stored, so it cannot drift from its inputs

use crate::core::error::{BarcoError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name shown while the catalog lookup is in flight
pub const PENDING_NAME: &str = "Fetching...";

/// Name used when the catalog has no usable entry
pub const UNKNOWN_NAME: &str = "Unknown";

const MAX_BARCODE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineItemId(pub u64);

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate an id from the local wall clock, e.g. `TXN20250314093005`
    pub fn generate() -> Self {
        Self::at(chrono::Local::now())
    }

    pub fn at<Tz: chrono::TimeZone>(moment: chrono::DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(moment.format("TXN%Y%m%d%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub barcode: String,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
}

impl LineItem {
    pub fn new(id: LineItemId, barcode: impl Into<String>) -> Self {
        Self {
            id,
            barcode: barcode.into(),
            name: PENDING_NAME.to_string(),
            image: None,
            quantity: 1,
            unit_price: None,
        }
    }

    /// `quantity * unit_price`, or `None` while the price is unknown
    ///
    /// The cart refuses edits whose totals would not fit in a `Decimal`, so
    /// a priced row always has a line total.
    pub fn line_total(&self) -> Option<Decimal> {
        line_total(self.quantity, self.unit_price)
    }

    pub fn has_price(&self) -> bool {
        self.unit_price.is_some()
    }
}

/// Checked `quantity * price`; `None` when unpriced or out of range
pub fn line_total(quantity: u32, price: Option<Decimal>) -> Option<Decimal> {
    price?.checked_mul(Decimal::from(quantity))
}

/// Trim and check a barcode coming from a scanner or the console
///
/// Barcodes are opaque, but must be non-empty, free of whitespace and at most
/// 64 characters long.
pub fn validate_barcode(input: &str) -> Result<String> {
    let barcode = input.trim();
    if barcode.is_empty()
        || barcode.len() > MAX_BARCODE_LEN
        || barcode.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(BarcoError::invalid_barcode(input));
    }
    Ok(barcode.to_string())
}
