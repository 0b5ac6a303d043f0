use orderscript_core::error::ImportError;
use orderscript_core::settings::schema::{AdjustmentKind, ImportSettings};
use std::path::Path;

use crate::output;

pub fn schema() -> Result<(), ImportError> {
    println!(
        r#"Import settings format (JSON)

Every field is optional. Omitted fields take the defaults shown by
`orderscript settings defaults`.

Fields:
  pricing_policy       "catalog_price_wins" (default): a matched product's
                       stored price replaces the price typed in the script.
                       "script_price_required": the typed price is used
                       as-is and a line without one blocks the batch.
  rates                Discount and tax applied to every order:
    discount_type      "percent" (default) or "amount"
    discount_value     Decimal string, e.g. "10" (percent must be 0-100)
    tax_type           "percent" (default) or "amount"
    tax_value          Decimal string, e.g. "14"
    calculation_order  "discount_then_tax" (default): tax on the discounted
                       subtotal. "tax_then_discount": discount on subtotal
                       plus tax.
  price_fields         Catalog keys tried in order when looking up a
                       product's price. Any other positive numeric key is
                       used as a last resort.
  name_line_max_chars  A first line longer than this is not taken as the
                       customer name (default 50).

Example:
{{
  "pricing_policy": "catalog_price_wins",
  "rates": {{
    "discount_type": "amount",
    "discount_value": "50",
    "tax_type": "percent",
    "tax_value": "14",
    "calculation_order": "discount_then_tax"
  }},
  "price_fields": ["sale_price", "price", "cost"]
}}

Note: rate values must be quoted strings, not bare numbers,
to preserve exact decimal precision (e.g., "2.5" not 2.5).
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), ImportError> {
    let settings = orderscript_core::settings::load_settings(file)?;
    let rates = &settings.rates;

    println!("Settings file '{}' is valid.", file.display());
    println!("  Pricing policy: {}", settings.pricing_policy);
    println!(
        "  Discount: {}, tax: {} ({})",
        describe_rate(rates.discount_type, &rates.discount_value.to_string()),
        describe_rate(rates.tax_type, &rates.tax_value.to_string()),
        rates.calculation_order
    );
    println!("  Price fields: {}", settings.price_fields.join(", "));

    let mut warnings = Vec::new();
    let mut seen = Vec::new();
    for field in &settings.price_fields {
        if seen.contains(&field) {
            warnings.push(format!("price field '{field}' is listed more than once"));
        }
        seen.push(field);
    }
    if rates.discount_type == AdjustmentKind::Amount && rates.discount_value.is_zero() {
        warnings.push("discount_type is 'amount' but discount_value is 0".to_string());
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

pub fn defaults() -> Result<(), ImportError> {
    output::json::print(&ImportSettings::default())
}

fn describe_rate(kind: AdjustmentKind, value: &str) -> String {
    match kind {
        AdjustmentKind::Percent => format!("{value}%"),
        AdjustmentKind::Amount => value.to_string(),
    }
}
