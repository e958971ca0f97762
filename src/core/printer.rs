//! Rendering and export of receipts.
//!
//! A [`ReceiptDocument`] can be printed as plain text (terminal or thermal
//! printer), as a self-printing HTML page, or as JSON for other tools.

use crate::core::config::ReceiptConfig;
use crate::core::error::{BarcoError, Result};
use crate::core::receipt::{format_money, ReceiptDocument};
use crate::core::templates::{
    render_template_plain, TemplateContext, TEMPLATES, UNKNOWN_AMOUNT, UNPRICED_FLAG,
};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiptFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl FromStr for ReceiptFormat {
    type Err = BarcoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(BarcoError::usage("receipt [text|html|json] [PATH]")),
        }
    }
}

pub fn render_receipt(
    receipt: &ReceiptDocument,
    format: ReceiptFormat,
    config: &ReceiptConfig,
) -> Result<String> {
    match format {
        ReceiptFormat::Text => Ok(render_text(receipt, config)),
        ReceiptFormat::Html => Ok(render_html(receipt, config)),
        ReceiptFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
    }
}

pub fn render_text(receipt: &ReceiptDocument, config: &ReceiptConfig) -> String {
    let currency = config.currency_symbol.as_str();
    let mut lines = Vec::with_capacity(receipt.lines.len() + 8);

    let header = TemplateContext {
        store_name: Some(&config.store_name),
        title: Some(&config.title),
        transaction_id: Some(receipt.transaction_id.as_str()),
        ..Default::default()
    };
    lines.push(render_template_plain(TEMPLATES.receipt_store, &header));
    lines.push(render_template_plain(TEMPLATES.receipt_title, &header));
    lines.push(render_template_plain(TEMPLATES.receipt_transaction, &header));
    lines.push(TEMPLATES.receipt_rule.to_string());

    for line in &receipt.lines {
        let unit_price = line.unit_price.map(format_money);
        let line_total = line.line_total.map(format_money);
        let context = TemplateContext {
            name: Some(&line.name),
            quantity: Some(line.quantity),
            currency: Some(currency),
            unit_price: Some(unit_price.as_deref().unwrap_or(UNKNOWN_AMOUNT)),
            line_total: Some(line_total.as_deref().unwrap_or(UNKNOWN_AMOUNT)),
            flag: line.is_unpriced().then_some(UNPRICED_FLAG),
            ..Default::default()
        };
        lines.push(render_template_plain(TEMPLATES.receipt_line, &context));
    }

    lines.push(TEMPLATES.receipt_rule.to_string());
    let amount = format_money(receipt.grand_total);
    let total = TemplateContext {
        currency: Some(currency),
        amount: Some(&amount),
        count: Some(receipt.unpriced_lines),
        ..Default::default()
    };
    lines.push(render_template_plain(TEMPLATES.receipt_total, &total));
    if !receipt.is_complete() {
        lines.push(render_template_plain(TEMPLATES.receipt_unpriced, &total));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub fn render_html(receipt: &ReceiptDocument, config: &ReceiptConfig) -> String {
    let currency = escape_html(&config.currency_symbol);
    let mut html = String::with_capacity(1024 + receipt.lines.len() * 160);

    let _ = write!(
        html,
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n\
         body {{ font-family: Arial, sans-serif; padding: 20px; }}\n\
         h1, h2 {{ text-align: center; }}\n\
         table {{ width: 100%; border-collapse: collapse; }}\n\
         th, td {{ border: 1px solid black; padding: 8px; text-align: left; }}\n\
         th {{ background-color: #f2f2f2; }}\n\
         .pending {{ color: #b00020; }}\n\
         </style>\n</head>\n<body>\n<h1>{store}</h1>\n<h2>{title}</h2>\n\
         <p><strong>Transaction ID:</strong> {txn}</p>\n<table>\n\
         <tr><th>Item</th><th>Quantity</th><th>Price ({currency})</th><th>Total ({currency})</th></tr>\n",
        title = escape_html(&config.title),
        store = escape_html(&config.store_name),
        txn = escape_html(receipt.transaction_id.as_str()),
    );

    for line in &receipt.lines {
        let (class, unit_price, line_total) = match (line.unit_price, line.line_total) {
            (Some(unit), Some(total)) => ("", format_money(unit), format_money(total)),
            _ => (
                " class=\"pending\"",
                "price pending".to_string(),
                UNKNOWN_AMOUNT.to_string(),
            ),
        };
        let _ = writeln!(
            html,
            "<tr{class}><td>{}</td><td>{}</td><td>{unit_price}</td><td>{line_total}</td></tr>",
            escape_html(&line.name),
            line.quantity,
        );
    }

    let _ = writeln!(
        html,
        "</table>\n<h3>Total: {currency}{}</h3>",
        format_money(receipt.grand_total)
    );
    if !receipt.is_complete() {
        let _ = writeln!(
            html,
            "<p class=\"pending\">{} item(s) without a price are not included in the total</p>",
            receipt.unpriced_lines
        );
    }
    html.push_str("<script>window.print();</script>\n</body>\n</html>\n");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Write a rendered receipt to `path`, or to stdout when no path is given
pub fn write_receipt(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)?;
            log::debug!("Receipt written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
