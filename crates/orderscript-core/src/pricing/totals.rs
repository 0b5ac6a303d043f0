use crate::model::ParsedProductLine;
use crate::parsing::values::saturating_sum;
use crate::settings::schema::{AdjustmentKind, CalculationOrder, RateConfig};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Computed money figures for one order. All values are non-negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Subtotal, discount, tax and grand total under the configured order.
///
/// With `DiscountThenTax` the discount is taken from the subtotal and tax
/// is charged on what remains. With `TaxThenDiscount` tax is charged on the
/// subtotal and the discount is taken from subtotal plus tax. A discount
/// never exceeds its base.
pub fn compute_totals(
    lines: &[ParsedProductLine],
    shipping: Decimal,
    rates: &RateConfig,
) -> OrderTotals {
    let subtotal = non_negative(saturating_sum(lines.iter().map(|l| l.line_total)));
    let shipping = non_negative(shipping);

    let (discount, tax) = match rates.calculation_order {
        CalculationOrder::DiscountThenTax => {
            let discount = adjustment(rates.discount_type, rates.discount_value, subtotal).min(subtotal);
            let tax = adjustment(rates.tax_type, rates.tax_value, subtotal.saturating_sub(discount));
            (discount, tax)
        }
        CalculationOrder::TaxThenDiscount => {
            let tax = adjustment(rates.tax_type, rates.tax_value, subtotal);
            let base = subtotal.saturating_add(tax);
            let discount = adjustment(rates.discount_type, rates.discount_value, base).min(base);
            (discount, tax)
        }
    };

    OrderTotals {
        subtotal,
        discount,
        tax,
        shipping,
        total: non_negative(
            subtotal
                .saturating_sub(discount)
                .saturating_add(tax)
                .saturating_add(shipping),
        ),
    }
}

/// A percent of `base` (rounded to cents) or a fixed amount.
fn adjustment(kind: AdjustmentKind, value: Decimal, base: Decimal) -> Decimal {
    let amount = match kind {
        AdjustmentKind::Percent => {
            let base = non_negative(base);
            base.checked_mul(value)
                .map(|v| v / Decimal::ONE_HUNDRED)
                .unwrap_or_else(|| (base / Decimal::ONE_HUNDRED).saturating_mul(value))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        }
        AdjustmentKind::Amount => value,
    };
    non_negative(amount)
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
