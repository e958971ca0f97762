//! Parsing of operator input typed at the session console.
//!
//! Any line that is not a command is a manually entered barcode, just like a
//! scan. Commands refer to rows either by barcode or by the `#n` number shown
//! in the cart listing.
//!
//! # Commands
//! - `qty <item> <n>`: set the quantity of a row
//! - `price <item> <amount>`: set the unit price of a row
//! - `rm <item>`: remove a row
//! - `list`: show the cart
//! - `receipt [text|html|json] [PATH]`: print or export the receipt
//! - `start [PATH]` / `stop`: control the scanner device
//! - `help`, `quit`

use crate::core::cart::{parse_price, parse_quantity, Cart};
use crate::core::error::{BarcoError, Result};
use crate::core::printer::ReceiptFormat;
use crate::core::state::validate_barcode;
use rust_decimal::Decimal;
use std::path::PathBuf;

pub const HELP_LINES: &[(&str, &str)] = &[
    ("<barcode>", "Add one unit of a product"),
    ("qty <item> <n>", "Set the quantity of a row"),
    ("price <item> <amount>", "Set the unit price of a row"),
    ("rm <item>", "Remove a row"),
    ("list", "Show the cart"),
    ("receipt [text|html|json] [PATH]", "Print or export the receipt"),
    ("start [PATH]", "Start reading the scanner device"),
    ("stop", "Stop reading the scanner device"),
    ("quit", "End the session"),
];

/// A row reference: a barcode, or `#n` for the n-th row of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Barcode(String),
    Index(usize),
}

impl ItemRef {
    pub fn parse(input: &str) -> Result<Self> {
        match input.strip_prefix('#') {
            Some(number) => match number.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Self::Index(n)),
                _ => Err(BarcoError::invalid_barcode(input)),
            },
            None => Ok(Self::Barcode(validate_barcode(input)?)),
        }
    }

    /// Resolve to the barcode of an existing row
    pub fn resolve(&self, cart: &Cart) -> Result<String> {
        match self {
            Self::Barcode(barcode) => Ok(barcode.clone()),
            Self::Index(n) => cart
                .items()
                .get(n - 1)
                .map(|item| item.barcode.clone())
                .ok_or_else(|| BarcoError::item_not_found(format!("#{n}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Scan(String),
    Quantity { item: ItemRef, quantity: i64 },
    Price { item: ItemRef, price: Decimal },
    Remove(ItemRef),
    List,
    Receipt { format: ReceiptFormat, path: Option<PathBuf> },
    Start(Option<PathBuf>),
    Stop,
    Help,
    Quit,
    Empty,
}

pub struct ConsoleParser;

impl ConsoleParser {
    pub fn parse(line: &str) -> Result<ConsoleCommand> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&first, rest)) = words.split_first() else {
            return Ok(ConsoleCommand::Empty);
        };

        match first.to_ascii_lowercase().as_str() {
            "qty" | "quantity" => match rest {
                [item, quantity] => Ok(ConsoleCommand::Quantity {
                    item: ItemRef::parse(item)?,
                    quantity: parse_quantity(quantity)?,
                }),
                _ => Err(BarcoError::usage("qty <item> <n>")),
            },
            "price" => match rest {
                [item, price] => Ok(ConsoleCommand::Price {
                    item: ItemRef::parse(item)?,
                    price: parse_price(price)?,
                }),
                _ => Err(BarcoError::usage("price <item> <amount>")),
            },
            "rm" | "remove" | "del" => match rest {
                [item] => Ok(ConsoleCommand::Remove(ItemRef::parse(item)?)),
                _ => Err(BarcoError::usage("rm <item>")),
            },
            "list" | "ls" => Ok(ConsoleCommand::List),
            "receipt" | "print" => Self::parse_receipt(rest),
            "start" => match rest {
                [] => Ok(ConsoleCommand::Start(None)),
                [path] => Ok(ConsoleCommand::Start(Some(PathBuf::from(path)))),
                _ => Err(BarcoError::usage("start [PATH]")),
            },
            "stop" => Ok(ConsoleCommand::Stop),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            _ if rest.is_empty() => Ok(ConsoleCommand::Scan(validate_barcode(first)?)),
            _ => Err(BarcoError::unknown_command(first)),
        }
    }

    fn parse_receipt(args: &[&str]) -> Result<ConsoleCommand> {
        match args {
            [] => Ok(ConsoleCommand::Receipt {
                format: ReceiptFormat::Text,
                path: None,
            }),
            [single] => match single.parse::<ReceiptFormat>() {
                Ok(format) => Ok(ConsoleCommand::Receipt { format, path: None }),
                Err(_) => Ok(ConsoleCommand::Receipt {
                    format: format_for_path(single),
                    path: Some(PathBuf::from(single)),
                }),
            },
            [format, path] => Ok(ConsoleCommand::Receipt {
                format: format.parse()?,
                path: Some(PathBuf::from(path)),
            }),
            _ => Err(BarcoError::usage("receipt [text|html|json] [PATH]")),
        }
    }
}

/// Pick a format from a file extension, defaulting to text
fn format_for_path(path: &str) -> ReceiptFormat {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
            "htm" => Some(ReceiptFormat::Html),
            other => other.parse().ok(),
        })
        .unwrap_or_default()
}
