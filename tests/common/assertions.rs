//! Common assertion helpers for test output validation
//!
//! Provides predicates for validating barco-bill session output, receipts and
//! error messages.

#![allow(dead_code)]

use predicates::prelude::*;

/// Checks for the transaction banner printed at session start
pub fn has_transaction_id() -> impl Predicate<str> {
    predicates::str::is_match(r"Transaction ID: TXN\d{14}").expect("valid regex")
}

/// Checks for a receipt total in dollars
pub fn has_total(amount: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Total Amount: ${amount}"))
}

/// Checks for a flagged line without price
pub fn has_unpriced_flag() -> impl Predicate<str> {
    predicates::str::contains("(price pending)")
}

/// Checks for an error line
pub fn has_error(message: &str) -> impl Predicate<str> {
    predicates::str::contains("Error:").and(predicates::str::contains(message.to_string()))
}

/// Checks for the end-of-session summary
pub fn session_closed_with(rows: usize) -> impl Predicate<str> {
    predicates::str::contains(format!("closed with {rows} row(s)"))
}
