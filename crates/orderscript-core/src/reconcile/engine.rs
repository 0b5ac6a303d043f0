use crate::catalog::matcher::resolve_products;
use crate::catalog::schema::Catalog;
use crate::model::ParsedOrder;
use crate::parsing::values::saturating_sum;
use crate::pricing::resolve_prices;
use crate::pricing::totals::{compute_totals, OrderTotals};
use crate::reconcile::outcome::{BatchDecision, Flag, FlagKind, OverrideSet, ReconciliationResult};
use crate::settings::schema::ImportSettings;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Largest difference between computed and declared sums treated as equal.
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Re-run product resolution, pricing, totals and validation for one order.
///
/// Only `order` is touched, and the result depends on nothing but the
/// arguments, so calling this after an edit leaves sibling orders as they were.
pub fn reconcile_order(
    order: &mut ParsedOrder,
    catalog: &Catalog,
    settings: &ImportSettings,
) -> ReconciliationResult {
    resolve_products(&mut order.lines, catalog);
    resolve_prices(&mut order.lines, catalog, settings);
    let totals = compute_totals(&order.lines, order.declared_shipping, &settings.rates);
    validate(order, totals)
}

/// Reconcile every order in a batch.
pub fn revalidate(
    orders: &mut [ParsedOrder],
    catalog: &Catalog,
    settings: &ImportSettings,
) -> Vec<ReconciliationResult> {
    orders
        .iter_mut()
        .map(|order| reconcile_order(order, catalog, settings))
        .collect()
}

/// Cross-check an already resolved order against what the script declared.
pub fn validate(order: &ParsedOrder, totals: OrderTotals) -> ReconciliationResult {
    let mut flags = Vec::new();

    if order.lines.is_empty() {
        flags.push(Flag::order(
            FlagKind::NoProductLines,
            "no product lines found".into(),
        ));
    }

    for (i, line) in order.lines.iter().enumerate() {
        if line.missing_product {
            flags.push(Flag::line(
                FlagKind::MissingProduct,
                i,
                format!("'{}' not found in catalog", line.name),
            ));
        }
        if line.missing_price {
            flags.push(Flag::line(
                FlagKind::MissingPrice,
                i,
                format!("no price for '{}'", line.name),
            ));
        }
        if line.missing_size {
            flags.push(Flag::line(
                FlagKind::MissingSize,
                i,
                format!("size '{}' does not match catalog", line.size),
            ));
        }
        if line.missing_color {
            flags.push(Flag::line(
                FlagKind::MissingColor,
                i,
                format!("color '{}' does not match catalog", line.color),
            ));
        }
    }

    if order.phone1.is_empty() {
        flags.push(Flag::order(FlagKind::MissingPhone, "no phone number".into()));
    }

    let computed_subtotal = saturating_sum(order.lines.iter().map(|l| l.line_total));
    let shipping = order.declared_shipping;
    let required_total = if order.declared_total.is_zero() {
        computed_subtotal.saturating_add(shipping)
    } else {
        order.declared_total
    };

    let price_off = !order.declared_price.is_zero()
        && computed_subtotal.saturating_sub(order.declared_price).abs() > tolerance();
    let total_off = computed_subtotal
        .saturating_add(shipping)
        .saturating_sub(required_total)
        .abs()
        > tolerance();
    let totals_mismatch = price_off || total_off;

    if totals_mismatch {
        let message = if total_off {
            format!(
                "computed {} + shipping {} does not match declared total {}",
                computed_subtotal, shipping, required_total
            )
        } else {
            format!(
                "computed subtotal {} does not match declared price {}",
                computed_subtotal, order.declared_price
            )
        };
        flags.push(Flag::order(FlagKind::TotalsMismatch, message));
    }

    debug!(
        sequence = order.sequence_number,
        subtotal = %computed_subtotal,
        total = %totals.total,
        mismatch = totals_mismatch,
        flags = flags.len(),
        "order validated"
    );

    ReconciliationResult {
        sequence_number: order.sequence_number,
        totals,
        computed_subtotal,
        required_total,
        totals_mismatch,
        flags,
    }
}

/// Decide whether a batch may be committed.
///
/// Any hard flag anywhere rejects the batch. Otherwise every order with a
/// soft flag must be covered by `overrides`.
pub fn assess_batch(results: &[ReconciliationResult], overrides: &OverrideSet) -> BatchDecision {
    let blocked: Vec<u64> = results
        .iter()
        .filter(|r| r.is_hard_blocked())
        .map(|r| r.sequence_number)
        .collect();
    if !blocked.is_empty() {
        warn!(orders = ?blocked, "batch has hard-blocked orders");
        return BatchDecision::Rejected { orders: blocked };
    }

    let unconfirmed: Vec<u64> = results
        .iter()
        .filter(|r| r.has_soft_flags() && !overrides.covers(r.sequence_number))
        .map(|r| r.sequence_number)
        .collect();
    if !unconfirmed.is_empty() {
        return BatchDecision::NeedsConfirmation {
            orders: unconfirmed,
        };
    }

    BatchDecision::Ready
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::CatalogEntry;
    use crate::model::ParsedProductLine;
    use crate::reconcile::outcome::Severity;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new("1", "قميص", "ازرق", "L").with_field("price", json!(240)),
            CatalogEntry::new("2", "شنطة", "", "").with_field("price", json!(300)),
        ])
    }

    fn order(seq: u64, lines: Vec<(&str, &str, &str, u32, Decimal)>) -> ParsedOrder {
        ParsedOrder {
            sequence_number: seq,
            customer_name: "علي".into(),
            phone1: "01012345678".into(),
            lines: lines
                .into_iter()
                .map(|(name, color, size, quantity, script_price)| ParsedProductLine {
                    name: name.into(),
                    color: color.into(),
                    size: size.into(),
                    quantity,
                    script_price,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_order() {
        let mut o = order(1, vec![("قميص", "ازرق", "L", 2, dec!(0))]);
        o.declared_total = dec!(530);
        o.declared_shipping = dec!(50);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert_eq!(r.computed_subtotal, dec!(480));
        assert_eq!(r.totals.total, dec!(530));
        assert!(!r.totals_mismatch);
        assert!(r.flags.is_empty());
    }

    #[test]
    fn test_declared_total_mismatch_is_soft() {
        let mut o = order(1, vec![("قميص", "ازرق", "L", 2, dec!(0))]);
        o.declared_total = dec!(500);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert!(r.totals_mismatch);
        assert!(!r.is_hard_blocked());
        assert!(r.has_soft_flags());
        assert_eq!(r.required_total, dec!(500));
    }

    #[test]
    fn test_declared_price_mismatch() {
        let mut o = order(1, vec![("شنطة", "", "", 1, dec!(0))]);
        o.declared_price = dec!(250);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert!(r.totals_mismatch);
    }

    #[test]
    fn test_within_tolerance() {
        let mut o = order(1, vec![("شنطة", "", "", 1, dec!(0))]);
        o.declared_total = dec!(300.01);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert!(!r.totals_mismatch);

        o.declared_total = dec!(300.02);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert!(r.totals_mismatch);
    }

    #[test]
    fn test_missing_product_is_hard() {
        let mut o = order(1, vec![("ساعة", "", "", 1, dec!(100))]);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        let hard: Vec<_> = r.flags_of(Severity::Hard).map(|f| f.kind).collect();
        assert_eq!(hard, vec![FlagKind::MissingProduct]);
        assert_eq!(r.flags[0].line, Some(0));
    }

    #[test]
    fn test_empty_order_is_hard_and_phone_soft() {
        let mut o = order(1, vec![]);
        o.phone1.clear();
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        let kinds: Vec<_> = r.flags.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FlagKind::NoProductLines, FlagKind::MissingPhone]);
        assert!(r.is_hard_blocked());
    }

    #[test]
    fn test_variant_flags_are_soft() {
        let mut o = order(1, vec![("قميص", "احمر", "L", 1, dec!(0))]);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert!(!r.is_hard_blocked());
        assert_eq!(r.flags[0].kind, FlagKind::MissingColor);
    }

    #[test]
    fn test_assess_batch() {
        let settings = ImportSettings::default();
        let mut orders = vec![
            order(1, vec![("قميص", "ازرق", "L", 1, dec!(0))]),
            order(2, vec![("قميص", "احمر", "L", 1, dec!(0))]),
        ];
        let results = revalidate(&mut orders, &catalog(), &settings);

        assert_eq!(
            assess_batch(&results, &OverrideSet::new()),
            BatchDecision::NeedsConfirmation { orders: vec![2] }
        );
        assert_eq!(
            assess_batch(&results, &OverrideSet::new().confirm(2)),
            BatchDecision::Ready
        );
        assert_eq!(
            assess_batch(&results, &OverrideSet::confirm_all()),
            BatchDecision::Ready
        );

        orders.push(order(3, vec![("ساعة", "", "", 1, dec!(0))]));
        let results = revalidate(&mut orders, &catalog(), &settings);
        assert_eq!(
            assess_batch(&results, &OverrideSet::confirm_all()),
            BatchDecision::Rejected { orders: vec![3] }
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut o = order(1, vec![("قميص", "", "", 3, dec!(0))]);
        let first = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        let snapshot = o.clone();
        let second = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert_eq!(first, second);
        assert_eq!(o, snapshot);
    }

    #[test]
    fn test_huge_script_prices_do_not_panic() {
        let mut o = order(
            9,
            vec![
                ("ساعة", "", "", 1, Decimal::MAX),
                ("خاتم", "", "", 1, Decimal::MAX),
            ],
        );
        o.declared_total = dec!(1);
        let r = reconcile_order(&mut o, &catalog(), &ImportSettings::default());
        assert!(r.is_hard_blocked());
        assert!(r.totals_mismatch);
    }
}
