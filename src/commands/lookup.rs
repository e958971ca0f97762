use crate::core::{
    config::BarcoConfig,
    error::Result,
    lookup::{lookup_once, OpenFoodFacts},
    print_section_header,
    receipt::format_money,
    state::{validate_barcode, Product},
};
use colored::*;

pub fn execute_lookup(barcode: &str, json: bool, config: &BarcoConfig) -> Result<()> {
    let barcode = validate_barcode(barcode)?;
    let catalog = OpenFoodFacts::new(&config.lookup)?;
    let product = lookup_once(&catalog, &barcode)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        print_product(&barcode, &product, &config.receipt.currency_symbol);
    }
    Ok(())
}

fn print_product(barcode: &str, product: &Product, currency: &str) {
    print_section_header(&format!("Product {barcode}"));
    println!(
        "   Name:  {}",
        product.name.as_deref().unwrap_or("(no name)").white()
    );
    println!(
        "   Image: {}",
        product.image_url.as_deref().unwrap_or("-").bright_black()
    );
    match product.price {
        Some(price) => println!("   Price: {}", format!("{currency}{}", format_money(price)).green()),
        None => println!("   Price: {}", "not listed".yellow()),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BarcoError;

    #[test]
    fn test_lookup_rejects_invalid_barcode_before_network() {
        let result = execute_lookup("  ", false, &BarcoConfig::default());
        assert!(matches!(result, Err(BarcoError::InvalidBarcode { .. })));
    }

    #[test]
    fn test_print_product_does_not_panic() {
        let product = Product {
            name: None,
            image_url: None,
            price: None,
        };
        print_product("0002", &product, "₹");
    }
}
