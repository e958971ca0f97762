//! Receipt projection of a cart.
//!
//! [`ReceiptDocument::format`] is a pure function of the cart snapshot: it
//! never mutates the cart and can be called any number of times for
//! re-printing. Lines whose price is still unknown contribute zero to the
//! grand total and are flagged so the printed document never passes them off
//! as free.

use crate::core::cart::Cart;
use crate::core::state::TransactionId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub barcode: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
}

impl ReceiptLine {
    pub fn is_unpriced(&self) -> bool {
        self.line_total.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDocument {
    pub transaction_id: TransactionId,
    pub lines: Vec<ReceiptLine>,
    pub grand_total: Decimal,
    pub unpriced_lines: usize,
}

impl ReceiptDocument {
    pub fn format(cart: &Cart) -> Self {
        let lines: Vec<ReceiptLine> = cart
            .items()
            .iter()
            .map(|item| ReceiptLine {
                barcode: item.barcode.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total(),
            })
            .collect();

        let grand_total = cart.total();
        let unpriced_lines = lines.iter().filter(|line| line.is_unpriced()).count();

        Self {
            transaction_id: cart.transaction_id().clone(),
            lines,
            grand_total,
            unpriced_lines,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unpriced_lines == 0
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Two-decimal rendering used on every printed amount
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
