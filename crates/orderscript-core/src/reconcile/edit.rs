use crate::error::ImportError;
use crate::model::{ParsedOrder, ParsedProductLine};
use crate::parsing::values::line_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operator correction to one product line. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEdit {
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    /// Replaces the script price.
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl LineEdit {
    fn apply(self, line: &mut ParsedProductLine) {
        if let Some(quantity) = self.quantity {
            line.quantity = quantity.max(1);
            line.quantity_defaulted = false;
        }
        if let Some(name) = self.name {
            line.name = name.trim().to_string();
        }
        if let Some(color) = self.color {
            line.color = color.trim().to_string();
        }
        if let Some(size) = self.size {
            line.size = size.trim().to_string();
        }
        if let Some(price) = self.price {
            line.script_price = price.max(Decimal::ZERO);
        }
        match line_amount(line.script_price, line.quantity) {
            Some(total) => line.script_line_total = total,
            None => {
                line.script_price = Decimal::ZERO;
                line.script_line_total = Decimal::ZERO;
            }
        }
        line.clear_resolution();
    }
}

/// Find an order in a batch by its sequence number.
pub fn find_order_mut(
    orders: &mut [ParsedOrder],
    sequence_number: u64,
) -> Result<&mut ParsedOrder, ImportError> {
    orders
        .iter_mut()
        .find(|o| o.sequence_number == sequence_number)
        .ok_or(ImportError::OrderNotFound(sequence_number))
}

/// Apply an edit to one line and drop its derived fields.
///
/// The caller re-runs `reconcile_order` on the same order afterwards; no
/// other order is touched.
pub fn apply_line_edit(
    orders: &mut [ParsedOrder],
    sequence_number: u64,
    line_index: usize,
    edit: LineEdit,
) -> Result<(), ImportError> {
    let order = find_order_mut(orders, sequence_number)?;
    let line = order
        .lines
        .get_mut(line_index)
        .ok_or(ImportError::LineOutOfRange {
            order: sequence_number,
            line: line_index,
        })?;
    edit.apply(line);
    Ok(())
}

/// Replace an order's shipping amount.
pub fn set_shipping(
    orders: &mut [ParsedOrder],
    sequence_number: u64,
    shipping: Decimal,
) -> Result<(), ImportError> {
    let order = find_order_mut(orders, sequence_number)?;
    order.declared_shipping = shipping.max(Decimal::ZERO);
    Ok(())
}
