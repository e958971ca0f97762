//! The cart reconciler: single source of truth for a checkout session.
//!
//! [`Cart`] owns the ordered list of [`LineItem`]s and is the only code that
//! mutates it. Scans merge into existing rows, new barcodes get a provisional
//! row plus an asynchronous catalog request, and late catalog answers are
//! patched in only if their row still exists.
//!
//! # Public API
//! - [`Cart`]: State-owning reconciler with the scan/edit/remove operations
//! - [`LookupDispatcher`]: Seam through which new barcodes are sent for lookup
//! - [`LookupResult`]: What the catalog answered for one barcode
//! - [`LookupOutcome`]: What applying that answer did to the cart
//! - [`parse_price`] / [`parse_quantity`]: Edit-boundary parsing of operator input
//!
//! # Ordering
//! Rows are kept newest-scan-first. Merging a repeat scan never reorders.
//!
//! # In-flight lookups
//! A barcode is in the pending set from dispatch until its result is applied,
//! so one barcode never has two requests in flight. Removing a row leaves its
//! request running; the answer is discarded on arrival unless the barcode was
//! scanned again in the meantime, in which case it patches the new row.
//!
//! # Totals
//! Every line total and the grand total stay representable as a `Decimal`.
//! An edit or scan that would overflow them is rejected and leaves the cart
//! unchanged; a catalog price that would overflow is treated as missing.

use crate::core::error::{BarcoError, Result};
use crate::core::state::{
    line_total, validate_barcode, LineItem, LineItemId, Product, TransactionId, PENDING_NAME,
    UNKNOWN_NAME,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::mpsc::Sender;

/// Receives barcodes that need a catalog lookup
///
/// Implementations must not block: the request is handed off and the answer
/// comes back later through [`Cart::apply_lookup_result`].
pub trait LookupDispatcher {
    fn request(&mut self, barcode: &str);
}

/// Hands the barcode to a worker pool listening on the other end
impl LookupDispatcher for Sender<String> {
    fn request(&mut self, barcode: &str) {
        if self.send(barcode.to_string()).is_err() {
            log::warn!("Lookup workers are gone, {barcode} will need a manual price");
        }
    }
}

/// Discards every request; rows stay pending until priced by hand
impl LookupDispatcher for () {
    fn request(&mut self, _barcode: &str) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(Product),
    NotFound,
    Failed(String),
}

impl From<Result<Option<Product>>> for LookupResult {
    fn from(result: Result<Option<Product>>) -> Self {
        match result {
            Ok(Some(product)) => Self::Found(product),
            Ok(None) => Self::NotFound,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Row patched and it now has a price
    Patched,
    /// Row patched with name/image but the catalog carried no price
    PriceMissing,
    NotFound,
    Failed(String),
    /// Row was removed before the answer arrived; nothing changed
    Stale,
}

impl LookupOutcome {
    pub fn needs_manual_price(&self) -> bool {
        matches!(self, Self::PriceMissing | Self::NotFound | Self::Failed(_))
    }
}

pub struct Cart {
    transaction_id: TransactionId,
    items: Vec<LineItem>,
    pending: HashSet<String>,
    next_id: u64,
    dispatcher: Box<dyn LookupDispatcher>,
}

impl Cart {
    /// Start a new session with a freshly generated transaction id
    pub fn new(dispatcher: Box<dyn LookupDispatcher>) -> Self {
        Self::with_transaction_id(TransactionId::generate(), dispatcher)
    }

    pub fn with_transaction_id(
        transaction_id: TransactionId,
        dispatcher: Box<dyn LookupDispatcher>,
    ) -> Self {
        Self {
            transaction_id,
            items: Vec::new(),
            pending: HashSet::new(),
            next_id: 1,
            dispatcher,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Rows, newest scan first
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, barcode: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.barcode == barcode)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_lookup_pending(&self, barcode: &str) -> bool {
        self.pending.contains(barcode)
    }

    pub fn pending_lookups(&self) -> usize {
        self.pending.len()
    }

    /// Record one scan of `barcode`
    ///
    /// A known barcode gets its quantity bumped; an unknown one gets a new
    /// provisional row and a catalog request. Returns without waiting on the
    /// catalog.
    pub fn apply_scan(&mut self, barcode: &str) -> Result<LineItemId> {
        let barcode = validate_barcode(barcode)?;

        if let Some(item) = self.get(&barcode) {
            let (quantity, price) = (item.quantity, item.unit_price);
            let merged = quantity
                .checked_add(1)
                .filter(|&q| self.total_with(&barcode, q, price).is_some())
                .ok_or_else(|| BarcoError::invalid_quantity(u64::from(quantity) + 1))?;
            let Some(item) = self.item_mut(&barcode) else {
                return Err(BarcoError::item_not_found(&barcode));
            };
            item.quantity = merged;
            log::debug!("Merged scan of {barcode}, quantity now {merged}");
            return Ok(item.id);
        }

        let id = LineItemId(self.next_id);
        self.next_id += 1;
        self.items.insert(0, LineItem::new(id, barcode.as_str()));
        log::debug!("Inserted {barcode} as {id}");

        if self.pending.insert(barcode.clone()) {
            log::debug!("Dispatching lookup for {barcode}");
            self.dispatcher.request(&barcode);
        } else {
            log::debug!("Lookup for {barcode} already in flight");
        }

        Ok(id)
    }

    /// Patch the row for `barcode` with the catalog's answer
    ///
    /// An answer for a row that no longer exists is ignored. A catalog price
    /// never replaces a price the operator has already entered.
    pub fn apply_lookup_result(&mut self, barcode: &str, result: LookupResult) -> LookupOutcome {
        self.pending.remove(barcode);

        let Some(item) = self.item_mut(barcode) else {
            log::debug!("Discarding stale lookup result for {barcode}");
            return LookupOutcome::Stale;
        };

        match result {
            LookupResult::Found(product) => {
                item.name = product
                    .name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string());
                item.image = product.image_url.filter(|url| !url.trim().is_empty());
                if item.unit_price.is_none() {
                    item.unit_price = product.price.filter(|price| !price.is_sign_negative());
                }
                let (quantity, price) = (item.quantity, item.unit_price);
                if price.is_some() && self.total_with(barcode, quantity, price).is_none() {
                    log::warn!("Catalog price for {barcode} is out of range, ignoring it");
                    if let Some(item) = self.item_mut(barcode) {
                        item.unit_price = None;
                    }
                }
                let Some(item) = self.get(barcode) else {
                    return LookupOutcome::Stale;
                };
                if item.has_price() {
                    LookupOutcome::Patched
                } else {
                    LookupOutcome::PriceMissing
                }
            }
            LookupResult::NotFound => {
                mark_unknown(item);
                LookupOutcome::NotFound
            }
            LookupResult::Failed(reason) => {
                log::warn!("Lookup for {barcode} failed: {reason}");
                mark_unknown(item);
                LookupOutcome::Failed(reason)
            }
        }
    }

    /// Set the unit price entered by the operator
    pub fn set_manual_price(&mut self, barcode: &str, price: Decimal) -> Result<()> {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(BarcoError::invalid_price(price));
        }
        let quantity = self
            .get(barcode)
            .map(|item| item.quantity)
            .ok_or_else(|| BarcoError::item_not_found(barcode))?;
        if self.total_with(barcode, quantity, Some(price)).is_none() {
            return Err(BarcoError::invalid_price(price));
        }
        if let Some(item) = self.item_mut(barcode) {
            item.unit_price = Some(price);
        }
        Ok(())
    }

    pub fn set_quantity(&mut self, barcode: &str, quantity: i64) -> Result<()> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|&q| q >= 1)
            .ok_or_else(|| BarcoError::invalid_quantity(quantity))?;
        let price = self
            .get(barcode)
            .map(|item| item.unit_price)
            .ok_or_else(|| BarcoError::item_not_found(barcode))?;
        if self.total_with(barcode, quantity, price).is_none() {
            return Err(BarcoError::invalid_quantity(quantity));
        }
        if let Some(item) = self.item_mut(barcode) {
            item.quantity = quantity;
        }
        Ok(())
    }

    /// Sum of all priced rows
    pub fn total(&self) -> Decimal {
        checked_total(self.items.iter().map(|item| (item.quantity, item.unit_price)))
            .unwrap_or(Decimal::MAX)
    }

    /// Grand total if the row for `barcode` had `quantity` and `price`
    ///
    /// `None` when a line total or the sum does not fit in a `Decimal`.
    fn total_with(&self, barcode: &str, quantity: u32, price: Option<Decimal>) -> Option<Decimal> {
        checked_total(self.items.iter().map(|item| {
            if item.barcode == barcode {
                (quantity, price)
            } else {
                (item.quantity, item.unit_price)
            }
        }))
    }

    /// Delete the row for `barcode`; returns whether a row was removed
    pub fn remove_item(&mut self, barcode: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.barcode != barcode);
        before != self.items.len()
    }

    fn item_mut(&mut self, barcode: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.barcode == barcode)
    }
}

/// Checked sum of `quantity * price` over the priced rows
pub fn checked_total(rows: impl IntoIterator<Item = (u32, Option<Decimal>)>) -> Option<Decimal> {
    rows.into_iter()
        .filter(|(_, price)| price.is_some())
        .try_fold(Decimal::ZERO, |total, (quantity, price)| {
            total.checked_add(line_total(quantity, price)?)
        })
}

fn mark_unknown(item: &mut LineItem) {
    if item.name == PENDING_NAME {
        item.name = UNKNOWN_NAME.to_string();
    }
}

/// Symbols accepted in front of a typed price
pub const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£', '¥'];

/// Parse an operator-typed price such as `25`, `25.50` or `₹25.50`
///
/// At most one leading currency symbol is stripped; any other prefix is
/// rejected.
pub fn parse_price(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix(CURRENCY_SYMBOLS)
        .unwrap_or(trimmed)
        .trim_start();
    let price = Decimal::from_str(trimmed).map_err(|_| BarcoError::invalid_price(input.trim()))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(BarcoError::invalid_price(input.trim()));
    }
    Ok(price)
}

pub fn parse_quantity(input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| BarcoError::invalid_quantity(input.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::mpsc::{channel, Receiver};

    fn cart_with_channel() -> (Cart, Receiver<String>) {
        let (tx, rx) = channel::<String>();
        let cart = Cart::with_transaction_id(TransactionId::from("TXN-TEST"), Box::new(tx));
        (cart, rx)
    }

    fn juice() -> LookupResult {
        LookupResult::Found(Product {
            name: Some("Juice".to_string()),
            image_url: Some("https://images.example/juice.jpg".to_string()),
            price: Some(dec!(50)),
        })
    }

    #[test]
    fn test_repeat_scans_merge_into_one_row() {
        let (mut cart, rx) = cart_with_channel();
        let first = cart.apply_scan("0001").unwrap();
        assert_eq!(cart.apply_lookup_result("0001", juice()), LookupOutcome::Patched);
        let second = cart.apply_scan("0001").unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        let item = cart.get("0001").unwrap();
        assert_eq!(item.name, "Juice");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.line_total(), Some(dec!(100.00)));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["0001".to_string()]);
    }

    #[test]
    fn test_quantity_equals_scan_count() {
        let (mut cart, _rx) = cart_with_channel();
        for _ in 0..7 {
            cart.apply_scan("4006381333931").unwrap();
        }
        cart.set_manual_price("4006381333931", dec!(1.25)).unwrap();

        let item = cart.get("4006381333931").unwrap();
        assert_eq!(item.quantity, 7);
        assert_eq!(item.line_total(), Some(dec!(8.75)));
    }

    #[test]
    fn test_only_one_lookup_in_flight_per_barcode() {
        let (mut cart, rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.remove_item("0001");
        cart.apply_scan("0001").unwrap();

        assert_eq!(rx.try_iter().count(), 1);
        assert!(cart.is_lookup_pending("0001"));

        // The surviving request patches the re-scanned row
        assert_eq!(cart.apply_lookup_result("0001", juice()), LookupOutcome::Patched);
        assert_eq!(cart.get("0001").unwrap().name, "Juice");
        assert_eq!(cart.pending_lookups(), 0);
    }

    #[test]
    fn test_new_rows_are_newest_first() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("A").unwrap();
        cart.apply_scan("B").unwrap();
        cart.apply_scan("A").unwrap();

        let order: Vec<_> = cart.items().iter().map(|i| i.barcode.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_removed_row_is_not_resurrected_by_late_lookup() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0003").unwrap();
        assert!(cart.remove_item("0003"));

        assert_eq!(cart.apply_lookup_result("0003", juice()), LookupOutcome::Stale);
        assert!(cart.is_empty());
        assert!(!cart.is_lookup_pending("0003"));
    }

    #[test]
    fn test_not_found_then_manual_price() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0002").unwrap();
        let outcome = cart.apply_lookup_result("0002", LookupResult::NotFound);
        assert!(outcome.needs_manual_price());

        let item = cart.get("0002").unwrap();
        assert_eq!(item.name, UNKNOWN_NAME);
        assert_eq!(item.unit_price, None);
        assert_eq!(item.line_total(), None);

        cart.set_manual_price("0002", dec!(25)).unwrap();
        assert_eq!(cart.get("0002").unwrap().line_total(), Some(dec!(25.00)));
    }

    #[test]
    fn test_failed_lookup_keeps_row() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0004").unwrap();
        let outcome =
            cart.apply_lookup_result("0004", LookupResult::Failed("timed out".to_string()));
        assert_eq!(outcome, LookupOutcome::Failed("timed out".to_string()));
        assert!(outcome.needs_manual_price());
        assert_eq!(cart.get("0004").unwrap().name, UNKNOWN_NAME);
    }

    #[test]
    fn test_found_without_price_prompts() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0005").unwrap();
        let outcome = cart.apply_lookup_result(
            "0005",
            LookupResult::Found(Product {
                name: Some("  ".to_string()),
                image_url: None,
                price: None,
            }),
        );
        assert_eq!(outcome, LookupOutcome::PriceMissing);
        assert_eq!(cart.get("0005").unwrap().name, UNKNOWN_NAME);
    }

    #[test]
    fn test_catalog_price_does_not_override_manual_price() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.set_manual_price("0001", dec!(42)).unwrap();
        cart.apply_lookup_result("0001", juice());

        let item = cart.get("0001").unwrap();
        assert_eq!(item.name, "Juice");
        assert_eq!(item.unit_price, Some(dec!(42)));
    }

    #[test]
    fn test_invalid_quantity_leaves_cart_unchanged() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.apply_scan("0001").unwrap();

        for bad in [0, -1, -100, i64::from(u32::MAX) + 1] {
            let err = cart.set_quantity("0001", bad).unwrap_err();
            assert!(matches!(err, BarcoError::InvalidQuantity { .. }));
        }
        assert_eq!(cart.get("0001").unwrap().quantity, 2);

        cart.set_quantity("0001", 5).unwrap();
        assert_eq!(cart.get("0001").unwrap().quantity, 5);
    }

    #[test]
    fn test_invalid_price_leaves_cart_unchanged() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.set_manual_price("0001", dec!(10)).unwrap();

        let err = cart.set_manual_price("0001", dec!(-1)).unwrap_err();
        assert!(matches!(err, BarcoError::InvalidPrice { .. }));
        assert_eq!(cart.get("0001").unwrap().unit_price, Some(dec!(10)));
    }

    #[test]
    fn test_edits_on_missing_barcode_fail() {
        let (mut cart, _rx) = cart_with_channel();
        assert!(matches!(
            cart.set_quantity("nope", 2),
            Err(BarcoError::ItemNotFound { .. })
        ));
        assert!(matches!(
            cart.set_manual_price("nope", dec!(2)),
            Err(BarcoError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_missing_item_is_noop() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        assert!(!cart.remove_item("9999"));
        assert_eq!(cart.len(), 1);
        assert!(cart.remove_item("0001"));
        assert!(!cart.remove_item("0001"));
    }

    #[test]
    fn test_invalid_barcode_rejected() {
        let (mut cart, rx) = cart_with_channel();
        assert!(cart.apply_scan("   ").is_err());
        assert!(cart.is_empty());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_detached_cart_never_dispatches() {
        let mut cart = Cart::new(Box::new(()));
        cart.apply_scan("0001").unwrap();
        assert!(cart.is_lookup_pending("0001"));
        assert!(cart.transaction_id().as_str().starts_with("TXN"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("25").unwrap(), dec!(25));
        assert_eq!(parse_price(" 25.50 ").unwrap(), dec!(25.50));
        assert_eq!(parse_price("₹19.99").unwrap(), dec!(19.99));
        assert_eq!(parse_price("0").unwrap(), Decimal::ZERO);
        assert!(parse_price("-5").is_err());
        assert!(parse_price("abc").is_err());
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn test_parse_price_strips_only_currency_symbols() {
        assert_eq!(parse_price("$ 4.20").unwrap(), dec!(4.20));
        assert_eq!(parse_price("€3").unwrap(), dec!(3));
        assert!(parse_price("O5").is_err());
        assert!(parse_price("abc5").is_err());
        assert!(parse_price("$$5").is_err());
        assert!(parse_price("Rs5").is_err());
    }

    #[test]
    fn test_price_whose_line_total_overflows_is_rejected() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.apply_scan("0001").unwrap();

        let huge = parse_price("79228162514264337593543950335").unwrap();
        let err = cart.set_manual_price("0001", huge).unwrap_err();
        assert!(matches!(err, BarcoError::InvalidPrice { .. }));
        assert_eq!(cart.get("0001").unwrap().unit_price, None);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_price_whose_grand_total_overflows_is_rejected() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.apply_scan("0002").unwrap();
        cart.set_manual_price("0001", Decimal::MAX).unwrap();

        let err = cart.set_manual_price("0002", dec!(1)).unwrap_err();
        assert!(matches!(err, BarcoError::InvalidPrice { .. }));
        assert_eq!(cart.get("0002").unwrap().unit_price, None);
        assert_eq!(cart.total(), Decimal::MAX);
    }

    #[test]
    fn test_quantity_whose_line_total_overflows_is_rejected() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.set_manual_price("0001", Decimal::MAX).unwrap();

        let err = cart.set_quantity("0001", 2).unwrap_err();
        assert!(matches!(err, BarcoError::InvalidQuantity { .. }));
        let err = cart.apply_scan("0001").unwrap_err();
        assert!(matches!(err, BarcoError::InvalidQuantity { .. }));

        let item = cart.get("0001").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.line_total(), Some(Decimal::MAX));
    }

    #[test]
    fn test_quantity_limit_on_repeat_scan() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.set_quantity("0001", i64::from(u32::MAX)).unwrap();

        assert!(cart.apply_scan("0001").is_err());
        assert_eq!(cart.get("0001").unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_out_of_range_catalog_price_is_dropped() {
        let (mut cart, _rx) = cart_with_channel();
        cart.apply_scan("0001").unwrap();
        cart.apply_scan("0001").unwrap();

        let product = LookupResult::Found(Product {
            name: Some("Gold bar".to_string()),
            image_url: None,
            price: Some(Decimal::MAX),
        });
        assert_eq!(cart.apply_lookup_result("0001", product), LookupOutcome::PriceMissing);
        let item = cart.get("0001").unwrap();
        assert_eq!(item.name, "Gold bar");
        assert_eq!(item.unit_price, None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert_eq!(parse_quantity("-2").unwrap(), -2);
        assert!(parse_quantity("two").is_err());
        assert!(parse_quantity("1.5").is_err());
    }

    #[test]
    fn test_lookup_result_from_catalog_result() {
        assert_eq!(LookupResult::from(Ok(None)), LookupResult::NotFound);
        let failed = LookupResult::from(Err(BarcoError::lookup_failed("1", "boom")));
        assert!(matches!(failed, LookupResult::Failed(reason) if reason.contains("boom")));
    }
}
