//! Core functionality for the barco-bill checkout tool.
//!
//! This module provides the cart reconciler, the receipt projection and the
//! collaborators around them: catalog lookup, scanner input, configuration
//! and console output.

pub mod cart;
pub mod config;
pub mod console;
pub mod dirs;
pub mod error;
pub mod lookup;
pub mod output;
pub mod printer;
pub mod receipt;
pub mod scanner;
pub mod state;
pub mod templates;

// === Error handling ===
pub use error::{BarcoError, Result};

// === Cart state ===
// Line items and the reconciler that owns them
pub use cart::{Cart, LookupDispatcher, LookupOutcome, LookupResult};
pub use state::{LineItem, LineItemId, Product, TransactionId};

// === Receipts ===
pub use printer::{render_receipt, ReceiptFormat};
pub use receipt::{ReceiptDocument, ReceiptLine};

// === Collaborators ===
pub use config::BarcoConfig;
pub use console::{ConsoleCommand, ConsoleParser};
pub use lookup::{LookupWorkers, OfflineCatalog, OpenFoodFacts, ProductCatalog};
pub use scanner::{ScanEvent, ScannerSession};

// === UI templates ===
pub use templates::{render_template, render_template_plain, TemplateContext, Templates, TEMPLATES};

// === Output formatting ===
pub use output::{
    print_error, print_info, print_section_header, print_success, print_usage, print_warning,
};
