//! Template system for consistent receipt and cart output.
//!
//! This module provides the single-pass placeholder renderer used for every
//! line barco-bill prints: the plain-text receipt, and the colourised cart
//! listing shown during a session.
//!
//! # Public API
//! - [`Templates`]: Template definitions for receipt and cart lines
//! - [`TemplateContext`]: Context data for template rendering
//! - [`TEMPLATES`]: Global template instance with default formatting
//! - [`render_template`]: Rendering with colours for terminal output
//! - [`render_template_plain`]: Rendering without colours for receipts
//!
//! # Placeholders
//! `{store_name}`, `{title}`, `{transaction_id}`, `{n}`, `{barcode}`, `{name}`,
//! `{quantity}`, `{unit_price}`, `{line_total}`, `{flag}`, `{currency}`,
//! `{amount}`, `{count}`. Unknown placeholders are kept verbatim.

use colored::*;

/// Template definitions for all output formatting
pub struct Templates {
    // Receipt templates
    pub receipt_store: &'static str,
    pub receipt_title: &'static str,
    pub receipt_transaction: &'static str,
    pub receipt_rule: &'static str,
    pub receipt_line: &'static str,
    pub receipt_total: &'static str,
    pub receipt_unpriced: &'static str,

    // Cart listing templates
    pub cart_header: &'static str,
    pub cart_line: &'static str,
    pub cart_empty: &'static str,
}

/// Global templates instance
pub static TEMPLATES: Templates = Templates {
    receipt_store: "{store_name}",
    receipt_title: "{title}",
    receipt_transaction: "Transaction ID: {transaction_id}",
    receipt_rule: "======================================",
    receipt_line: "{name} x {quantity} @ {currency}{unit_price} = {currency}{line_total}{flag}",
    receipt_total: "Total Amount: {currency}{amount}",
    receipt_unpriced: "! {count} item(s) without a price are not included in the total",
    cart_header: "Transaction ID: {transaction_id}",
    cart_line: "   [{n}] {barcode}  {name}  x{quantity}  {unit_price}  {line_total}{flag}",
    cart_empty: "   (cart is empty)",
};

/// Marker appended to a line whose price is still unknown
pub const UNPRICED_FLAG: &str = "  (price pending)";

/// Shown in place of an unknown amount
pub const UNKNOWN_AMOUNT: &str = "--";

/// Context for template rendering
#[derive(Debug, Default)]
pub struct TemplateContext<'a> {
    pub store_name: Option<&'a str>,
    pub title: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
    pub n: Option<usize>,
    pub barcode: Option<&'a str>,
    pub name: Option<&'a str>,
    pub quantity: Option<u32>,
    pub unit_price: Option<&'a str>,
    pub line_total: Option<&'a str>,
    pub flag: Option<&'a str>,
    pub currency: Option<&'a str>,
    pub amount: Option<&'a str>,
    pub count: Option<usize>,
}

/// Render a template with context and apply colours
pub fn render_template(template: &str, context: &TemplateContext) -> String {
    let mut result = String::with_capacity(template.len() + 64);
    render_template_single_pass(template, context, &mut result);
    apply_colors(&result, template, context)
}

/// Render template without colours
pub fn render_template_plain(template: &str, context: &TemplateContext) -> String {
    let mut result = String::with_capacity(template.len() + 64);
    render_template_single_pass(template, context, &mut result);
    result
}

fn render_template_single_pass(template: &str, context: &TemplateContext, output: &mut String) {
    use std::fmt::Write;

    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            output.push(ch);
            continue;
        }

        let mut placeholder = String::new();
        let mut found_closing = false;
        for next_ch in chars.by_ref() {
            if next_ch == '}' {
                found_closing = true;
                break;
            }
            placeholder.push(next_ch);
        }

        if !found_closing {
            output.push(ch);
            output.push_str(&placeholder);
            continue;
        }

        let text = match placeholder.as_str() {
            "store_name" => context.store_name,
            "title" => context.title,
            "transaction_id" => context.transaction_id,
            "barcode" => context.barcode,
            "name" => context.name,
            "unit_price" => context.unit_price,
            "line_total" => context.line_total,
            "flag" => context.flag,
            "currency" => context.currency,
            "amount" => context.amount,
            "n" | "quantity" | "count" => {
                let number = match placeholder.as_str() {
                    "n" => context.n,
                    "quantity" => context.quantity.map(|q| q as usize),
                    _ => context.count,
                };
                if let Some(value) = number {
                    let _ = write!(output, "{value}");
                }
                continue;
            }
            _ => {
                output.push('{');
                output.push_str(&placeholder);
                output.push('}');
                continue;
            }
        };

        if let Some(value) = text {
            output.push_str(value);
        }
    }
}

fn apply_colors(text: &str, template: &str, context: &TemplateContext) -> String {
    use std::fmt::Write;

    let mut result = String::with_capacity(text.len() + 64);

    match template {
        t if t == TEMPLATES.cart_header => {
            let _ = write!(
                result,
                "Transaction ID: {}",
                context.transaction_id.unwrap_or_default().blue()
            );
        }
        t if t == TEMPLATES.cart_line => {
            let _ = write!(
                result,
                "   {}{}{} {}  {}  x{}  {}  {}",
                "[".bright_black(),
                context.n.unwrap_or_default().to_string().white(),
                "]".bright_black(),
                context.barcode.unwrap_or_default().bright_black(),
                context.name.unwrap_or_default().white(),
                context.quantity.unwrap_or_default(),
                context.unit_price.unwrap_or_default(),
                context.line_total.unwrap_or_default().green(),
            );
            if let Some(flag) = context.flag {
                let _ = write!(result, "{}", flag.yellow());
            }
        }
        t if t == TEMPLATES.cart_empty => {
            let _ = write!(result, "{}", text.bright_black());
        }
        _ => result.push_str(text),
    }

    result
}
