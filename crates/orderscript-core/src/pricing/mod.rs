pub mod totals;

use crate::catalog::schema::{Catalog, CatalogEntry};
use crate::model::{ParsedProductLine, PriceSource};
use crate::parsing::values::{coerce_json, line_amount};
use crate::settings::schema::{ImportSettings, PricingPolicy};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Key fragments that mark counters, references and timestamps. These are
/// never read as a price, even when numeric.
const NON_PRICE_KEY_PARTS: &[&str] = &[
    "stock", "quantity", "qty", "barcode", "sku", "date", "time",
];

/// Set `resolved_price`, `price_source`, `missing_price` and `line_total`.
///
/// Under `CatalogPriceWins` a matched line takes the first positive value
/// from the preferred price fields, then from any other field, then the
/// script price. Otherwise the script price is used verbatim.
pub fn resolve_prices(lines: &mut [ParsedProductLine], catalog: &Catalog, settings: &ImportSettings) {
    for line in lines.iter_mut() {
        let entry = line
            .resolved_product_id
            .as_deref()
            .and_then(|id| catalog.get(id));

        let (price, source) = match (settings.pricing_policy, entry) {
            (PricingPolicy::CatalogPriceWins, Some(entry)) => {
                catalog_price(entry, &settings.price_fields)
                    .unwrap_or_else(|| script_price(line))
            }
            _ => script_price(line),
        };

        let price = price.max(Decimal::ZERO);
        let (price, source, line_total) = match line_amount(price, line.quantity) {
            Some(total) => (price, source, total),
            None => {
                warn!(name = %line.name, %price, "line total out of range, price dropped");
                (Decimal::ZERO, PriceSource::None, Decimal::ZERO)
            }
        };
        line.resolved_price = price;
        line.price_source = source;
        line.missing_price = price <= Decimal::ZERO;
        line.line_total = line_total;

        debug!(
            name = %line.name,
            price = %line.resolved_price,
            source = %line.price_source,
            "price resolved"
        );
    }
}

/// First strictly positive price on a catalog entry.
pub fn catalog_price(entry: &CatalogEntry, preferred: &[String]) -> Option<(Decimal, PriceSource)> {
    let from_preferred = preferred.iter().find_map(|key| {
        let value = coerce_json(entry.fields.get(key)?);
        (value > Decimal::ZERO).then(|| (value, PriceSource::CatalogField(key.clone())))
    });
    if from_preferred.is_some() {
        return from_preferred;
    }

    entry
        .fields
        .iter()
        .filter(|(key, _)| !preferred.contains(*key) && !is_non_price_key(key))
        .find_map(|(key, value)| {
            let value = coerce_json(value);
            (value > Decimal::ZERO).then(|| (value, PriceSource::CatalogAnyField(key.clone())))
        })
}

fn script_price(line: &ParsedProductLine) -> (Decimal, PriceSource) {
    if line.script_price > Decimal::ZERO {
        (line.script_price, PriceSource::Script)
    } else {
        (Decimal::ZERO, PriceSource::None)
    }
}

fn is_non_price_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower == "id"
        || lower.ends_with("_id")
        || lower.ends_with("_at")
        || key.ends_with("Id")
        || NON_PRICE_KEY_PARTS.iter().any(|part| lower.contains(part))
}
