pub mod fields;
pub mod lines;
pub mod normalize;
pub mod segment;
pub mod values;

use crate::error::ImportError;
use crate::model::ParsedOrder;
use fields::{extract_fields, ExtractOptions};
use lines::parse_lines;
use normalize::normalize_text;
use segment::segment;
use tracing::debug;

/// Text-side result of one parse run, before any catalog lookups.
#[derive(Debug, Clone)]
pub struct ParsedScript {
    pub normalized: String,
    pub orders: Vec<ParsedOrder>,
    /// Text before the first name label, discarded.
    pub preamble: Option<String>,
    /// Name labels with nothing after them.
    pub empty_spans: usize,
}

/// Normalize, segment and extract every order in a pasted script.
///
/// Sequence numbers continue from `highest_existing`. A script without a
/// single customer-name label is a structural failure.
pub fn parse_orders(
    raw: &str,
    highest_existing: u64,
    options: &ExtractOptions,
) -> Result<ParsedScript, ImportError> {
    let normalized = normalize_text(raw);
    let segmentation = segment(&normalized);

    if segmentation.blocks.is_empty() {
        return Err(ImportError::NothingParsed);
    }

    let orders: Vec<ParsedOrder> = segmentation
        .blocks
        .iter()
        .map(|block| {
            let mut order = extract_fields(block, highest_existing, options);
            order.lines = parse_lines(&order.product_details);
            debug!(
                sequence = order.sequence_number,
                customer = %order.customer_name,
                lines = order.lines.len(),
                "extracted order block"
            );
            order
        })
        .collect();

    Ok(ParsedScript {
        normalized,
        orders,
        preamble: segmentation.preamble,
        empty_spans: segmentation.empty_spans,
    })
}
