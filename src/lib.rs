//! BarCo Bill - a barcode scanning checkout counter for the terminal.
//!
//! Barcodes come from a scanner device or the keyboard, products are looked
//! up in the Open Food Facts catalog, and the session ends with a printable
//! receipt. The cart logic lives in [`core::cart`] and has no dependency on
//! any terminal, device or network code, so other front ends can reuse it.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - Cart reconciliation and line items
//! - Receipt projection and rendering
//! - Catalog lookup and scanner input
//! - Error handling and result types

pub mod commands;
pub mod core;

pub use core::{
    // Error handling
    BarcoError,
    Result,

    // Cart state
    Cart,
    LineItem,
    LineItemId,
    LookupDispatcher,
    LookupOutcome,
    LookupResult,
    Product,
    TransactionId,

    // Receipts
    render_receipt,
    ReceiptDocument,
    ReceiptFormat,
    ReceiptLine,

    // Collaborators
    BarcoConfig,
    OfflineCatalog,
    OpenFoodFacts,
    ProductCatalog,
};
