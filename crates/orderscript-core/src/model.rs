use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous span of normalized text believed to hold one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBlock {
    /// Position in the script, starting at 0.
    pub index: usize,
    /// The name label that opened this block (e.g. "الاسم:").
    pub label: String,
    /// Everything after the label up to the next name label.
    pub body: String,
}

/// Which decomposition rule produced a product line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineParseMode {
    /// `الكميه <qty> اسم <name> اللون <color> المقاس <size> [السعر <price>]`
    Structured,
    #[default]
    Heuristic,
}

impl fmt::Display for LineParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineParseMode::Structured => write!(f, "structured"),
            LineParseMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Which catalog matching tier found the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Name, color and size all equal (empty parsed color/size match anything).
    ExactVariant,
    ExactName,
    /// One name contains the other.
    Fuzzy,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::ExactVariant => write!(f, "exact variant"),
            MatchTier::ExactName => write!(f, "exact name"),
            MatchTier::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Where a line's authoritative unit price came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum PriceSource {
    /// A field from the configured preference list.
    CatalogField(String),
    /// Any other positive numeric field on the entry.
    CatalogAnyField(String),
    Script,
    #[default]
    None,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::CatalogField(key) => write!(f, "catalog '{key}'"),
            PriceSource::CatalogAnyField(key) => write!(f, "catalog '{key}' (fallback)"),
            PriceSource::Script => write!(f, "script"),
            PriceSource::None => write!(f, "none"),
        }
    }
}

/// One decomposed product mention within an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProductLine {
    pub raw_text: String,
    pub parse_mode: LineParseMode,
    /// Always >= 1; unparseable quantities default to 1.
    pub quantity: u32,
    /// No quantity was written, so `quantity` is the default.
    #[serde(default)]
    pub quantity_defaulted: bool,
    pub name: String,
    pub color: String,
    pub size: String,
    /// Price typed in the script, zero when absent.
    pub script_price: Decimal,
    /// `script_price × quantity`, kept for cross-checks only.
    pub script_line_total: Decimal,

    /// Catalog id of the matched entry. A lookup key, never owned data.
    pub resolved_product_id: Option<String>,
    pub match_tier: Option<MatchTier>,
    pub missing_product: bool,
    pub missing_size: bool,
    pub missing_color: bool,

    pub resolved_price: Decimal,
    pub price_source: PriceSource,
    pub missing_price: bool,
    /// `quantity × resolved_price`, exact.
    pub line_total: Decimal,
}

impl ParsedProductLine {
    /// Reset everything derived from the catalog and settings.
    pub fn clear_resolution(&mut self) {
        self.resolved_product_id = None;
        self.match_tier = None;
        self.missing_product = false;
        self.missing_size = false;
        self.missing_color = false;
        self.resolved_price = Decimal::ZERO;
        self.price_source = PriceSource::None;
        self.missing_price = false;
        self.line_total = Decimal::ZERO;
    }
}

/// Per-block extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOrder {
    /// Unique within a parse run: highest existing order number + block index + 1.
    pub sequence_number: u64,
    pub customer_name: String,
    pub governorate: String,
    /// Multi-line address collapsed to one line.
    pub address: String,
    /// Digits only.
    pub phone1: String,
    pub phone2: String,
    /// Kept verbatim for display.
    pub employee_raw: String,
    pub page_raw: String,
    pub notes: String,
    /// The script's goods price (before shipping), zero when absent.
    pub declared_price: Decimal,
    pub declared_shipping: Decimal,
    pub declared_total: Decimal,
    /// Raw product-details field before line parsing.
    pub product_details: String,
    pub lines: Vec<ParsedProductLine>,
}
