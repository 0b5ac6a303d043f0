use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default catalog price-field preference: sale prices first, then generic
/// price fields, then cost.
pub const DEFAULT_PRICE_FIELDS: &[&str] = &[
    "sale_price",
    "selling_price",
    "salePrice",
    "sellingPrice",
    "retail_price",
    "price",
    "unit_price",
    "unitPrice",
    "cost_price",
    "costPrice",
    "cost",
];

/// Which price is authoritative for a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPolicy {
    /// A matched product's stored price overrides the typed one.
    #[default]
    CatalogPriceWins,
    /// The typed price is used as-is; a missing one is an error.
    ScriptPriceRequired,
}

impl fmt::Display for PricingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingPolicy::CatalogPriceWins => write!(f, "catalog_price_wins"),
            PricingPolicy::ScriptPriceRequired => write!(f, "script_price_required"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    #[default]
    Percent,
    Amount,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentKind::Percent => write!(f, "percent"),
            AdjustmentKind::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationOrder {
    #[default]
    DiscountThenTax,
    TaxThenDiscount,
}

impl fmt::Display for CalculationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationOrder::DiscountThenTax => write!(f, "discount_then_tax"),
            CalculationOrder::TaxThenDiscount => write!(f, "tax_then_discount"),
        }
    }
}

/// Discount and tax configuration applied to every order in a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    #[serde(default)]
    pub discount_type: AdjustmentKind,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub tax_type: AdjustmentKind,
    #[serde(default)]
    pub tax_value: Decimal,
    #[serde(default)]
    pub calculation_order: CalculationOrder,
}

/// Everything the pipeline reads besides the script and the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    #[serde(default)]
    pub pricing_policy: PricingPolicy,
    #[serde(default)]
    pub rates: RateConfig,
    /// Catalog keys tried in order when looking up a product's price.
    #[serde(default = "default_price_fields")]
    pub price_fields: Vec<String>,
    /// A first line longer than this is not trusted as the customer name.
    #[serde(default = "default_name_line_max_chars")]
    pub name_line_max_chars: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            pricing_policy: PricingPolicy::default(),
            rates: RateConfig::default(),
            price_fields: default_price_fields(),
            name_line_max_chars: default_name_line_max_chars(),
        }
    }
}

fn default_price_fields() -> Vec<String> {
    DEFAULT_PRICE_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_name_line_max_chars() -> usize {
    50
}
