//! Integration tests for the parse → resolve → price → validate → commit pipeline.
//!
//! Uses a MockSink that records submitted payloads instead of talking to a
//! persistence service, so the batch gate can be observed directly.

use orderscript_core::catalog::schema::{Catalog, CatalogEntry};
use orderscript_core::catalog::{load_catalog, parse_catalog_str};
use orderscript_core::commit::{commit_batch, JsonFileSink, OrderPayload, OrderSink};
use orderscript_core::error::ImportError;
use orderscript_core::model::{LineParseMode, PriceSource};
use orderscript_core::parsing::normalize::normalize_text;
use orderscript_core::parsing::segment::{count_name_labels, segment};
use orderscript_core::reconcile::{
    apply_line_edit, reconcile_order, set_shipping, BatchDecision, FlagKind, LineEdit, OverrideSet,
};
use orderscript_core::settings::load_settings;
use orderscript_core::settings::schema::{
    AdjustmentKind, CalculationOrder, ImportSettings, PricingPolicy, RateConfig,
};
use orderscript_core::{parse_script, preview_script, revalidate};
use rust_decimal_macros::dec;
use serde_json::json;
use std::io::Write;

#[derive(Default)]
struct MockSink {
    calls: usize,
    persisted: Vec<OrderPayload>,
}

impl OrderSink for MockSink {
    fn submit(&mut self, orders: &[OrderPayload]) -> Result<(), ImportError> {
        self.calls += 1;
        self.persisted.extend_from_slice(orders);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "mock"
    }
}

fn shirt_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogEntry::new("sh-1", "قميص", "ازرق", "L").with_field("sale_price", json!("240")),
        CatalogEntry::new("bg-1", "شنطة", "", "").with_field("price", json!(300)),
        CatalogEntry::new("jk-1", "جاكيت", "اسود", "XL").with_field("price", json!(1000)),
    ])
}

const SHIRT_SCRIPT: &str = "الاسم: علي حسن\n\
    الهاتف: 01012345678\n\
    المحافظة: الجيزة\n\
    العنوان: فيصل\n\
    تفاصيل الطلب:\n\
    الكميه 2 اسم قميص اللون ازرق المقاس L السعر 100\n\
    الاجمالي: 500";

// ---------------------------------------------------------------------------
// Test 1: Structured product line decomposes fully
// ---------------------------------------------------------------------------
#[test]
fn structured_line_scenario() {
    let parsed = parse_script(SHIRT_SCRIPT, 0, &ImportSettings::default()).unwrap();

    assert_eq!(parsed.orders.len(), 1);
    let order = &parsed.orders[0];
    assert_eq!(order.sequence_number, 1);
    assert_eq!(order.customer_name, "علي حسن");
    assert_eq!(order.governorate, "الجيزة");

    assert_eq!(order.lines.len(), 1);
    let line = &order.lines[0];
    assert_eq!(line.parse_mode, LineParseMode::Structured);
    assert_eq!(line.quantity, 2);
    assert_eq!(line.name, "قميص");
    assert_eq!(line.color, "ازرق");
    assert_eq!(line.size, "L");
    assert_eq!(line.script_price, dec!(100));
    assert_eq!(line.script_line_total, dec!(200));
}

// ---------------------------------------------------------------------------
// Test 2: Unknown product under script-price-required rejects the batch
// ---------------------------------------------------------------------------
#[test]
fn unknown_product_rejects_batch() {
    let settings = ImportSettings {
        pricing_policy: PricingPolicy::ScriptPriceRequired,
        ..Default::default()
    };
    let catalog = Catalog::new(vec![CatalogEntry::new("bg-1", "شنطة", "", "")]);

    let preview = preview_script(SHIRT_SCRIPT, 0, &catalog, &settings).unwrap();
    let line = &preview.orders[0].lines[0];
    assert!(line.missing_product);
    assert!(!line.missing_price);
    assert_eq!(line.resolved_price, dec!(100));
    assert_eq!(preview.decision, BatchDecision::Rejected { orders: vec![1] });

    let mut sink = MockSink::default();
    let err = commit_batch(&preview.orders, &catalog, &settings, OverrideSet::confirm_all(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ImportError::HardBlocked { .. }));
    assert_eq!(sink.calls, 0);
    assert_eq!(sink.persisted.len(), 0);
}

// ---------------------------------------------------------------------------
// Test 3: Declared total mismatch is a soft warning the operator may confirm
// ---------------------------------------------------------------------------
#[test]
fn totals_mismatch_is_soft() {
    let settings = ImportSettings::default();
    let preview = preview_script(SHIRT_SCRIPT, 0, &shirt_catalog(), &settings).unwrap();

    let result = &preview.results[0];
    // Catalog price 240 wins over the typed 100.
    assert_eq!(result.computed_subtotal, dec!(480));
    assert_eq!(result.required_total, dec!(500));
    assert!(result.totals_mismatch);
    assert!(!result.is_hard_blocked());
    assert_eq!(
        preview.decision,
        BatchDecision::NeedsConfirmation { orders: vec![1] }
    );

    let mut sink = MockSink::default();
    let catalog = shirt_catalog();
    let err = commit_batch(&preview.orders, &catalog, &settings, OverrideSet::new(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ImportError::ConfirmationRequired { .. }));
    assert_eq!(sink.calls, 0);

    let overrides = OverrideSet::new().confirm(1);
    let receipt =
        commit_batch(&preview.orders, &catalog, &settings, overrides, &mut sink).unwrap();
    assert_eq!(sink.calls, 1);
    assert_eq!(receipt.confirmed_with_warnings, vec![1]);
    assert_eq!(sink.persisted[0].items[0].product_id.as_deref(), Some("sh-1"));
    assert_eq!(sink.persisted[0].items[0].price, dec!(240));
    assert_eq!(sink.persisted[0].total, dec!(480));
}

// ---------------------------------------------------------------------------
// Test 4: Tax applied before discount
// ---------------------------------------------------------------------------
#[test]
fn tax_then_discount_totals() {
    let settings = ImportSettings {
        rates: RateConfig {
            discount_type: AdjustmentKind::Percent,
            discount_value: dec!(5),
            tax_type: AdjustmentKind::Percent,
            tax_value: dec!(10),
            calculation_order: CalculationOrder::TaxThenDiscount,
        },
        ..Default::default()
    };
    let script = "الاسم: سارة\n\
        الهاتف: 01198765432\n\
        تفاصيل الطلب:\n\
        - جاكيت اسود مقاس XL\n\
        الشحن: 50";

    let preview = preview_script(script, 0, &shirt_catalog(), &settings).unwrap();
    let totals = &preview.results[0].totals;
    assert_eq!(totals.subtotal, dec!(1000));
    assert_eq!(totals.tax, dec!(100));
    assert_eq!(totals.discount, dec!(55));
    assert_eq!(totals.shipping, dec!(50));
    assert_eq!(totals.total, dec!(1095));
}

// ---------------------------------------------------------------------------
// Test 5: Normalization is idempotent and segmentation matches label count
// ---------------------------------------------------------------------------
#[test]
fn normalization_and_segmentation_invariants() {
    let raw = "\u{FEFF}طلبات اليوم\r\n\
        الاسم:  منى\u{200F}\r\n\
        الموبايل: ٠١٢٣٤٥٦٧٨٩٠\r\n\
        \r\n\r\n\r\n\
        الإسم: سارة\t\tمحمود\r\n\
        اسم العميل : احمد\r\n\
        تفاصيل الطلب:\r\n\
        ١- شنطة ٣٠٠";

    let once = normalize_text(raw);
    assert_eq!(normalize_text(&once), once);
    assert!(once.contains("01234567890"));
    assert!(!once.contains("\n\n\n"));

    let seg = segment(&once);
    assert_eq!(seg.blocks.len(), count_name_labels(&once));
    assert_eq!(seg.blocks.len(), 3);
    assert_eq!(seg.preamble.as_deref(), Some("طلبات اليوم"));
}

// ---------------------------------------------------------------------------
// Test 6: Switching to catalog-price-wins moves the price to the catalog value
// ---------------------------------------------------------------------------
#[test]
fn pricing_policy_switch() {
    let script_required = ImportSettings {
        pricing_policy: PricingPolicy::ScriptPriceRequired,
        ..Default::default()
    };
    let mut preview = preview_script(SHIRT_SCRIPT, 0, &shirt_catalog(), &script_required).unwrap();
    assert_eq!(preview.orders[0].lines[0].resolved_price, dec!(100));
    assert_eq!(preview.orders[0].lines[0].price_source, PriceSource::Script);

    preview.refresh(&shirt_catalog(), &ImportSettings::default());
    let line = &preview.orders[0].lines[0];
    assert_eq!(line.resolved_price, dec!(240));
    assert_eq!(
        line.price_source,
        PriceSource::CatalogField("sale_price".into())
    );
    assert_eq!(line.line_total, dec!(480));
}

// ---------------------------------------------------------------------------
// Test 7: Editing one order leaves sibling orders untouched
// ---------------------------------------------------------------------------
#[test]
fn edit_revalidates_only_touched_order() {
    let script = "الاسم: علي\n\
        الهاتف: 01012345678\n\
        تفاصيل الطلب:\n\
        1- شنطة\n\
        الاسم: منى\n\
        الهاتف: 01098765432\n\
        تفاصيل الطلب:\n\
        1- ساعة ذهبي 700";
    let settings = ImportSettings::default();
    let catalog = shirt_catalog();
    let mut preview = preview_script(script, 10, &catalog, &settings).unwrap();

    assert_eq!(preview.orders[0].sequence_number, 11);
    assert_eq!(preview.orders[1].sequence_number, 12);
    assert_eq!(preview.decision, BatchDecision::Rejected { orders: vec![12] });

    let sibling_order = preview.orders[0].clone();
    let sibling_result = preview.results[0].clone();

    let edit = LineEdit {
        name: Some("جاكيت".into()),
        ..Default::default()
    };
    apply_line_edit(&mut preview.orders, 12, 0, edit).unwrap();
    set_shipping(&mut preview.orders, 12, dec!(40)).unwrap();
    let touched = reconcile_order(&mut preview.orders[1], &catalog, &settings);
    assert!(!touched.is_hard_blocked());
    assert_eq!(touched.totals.total, dec!(1040));

    assert_eq!(preview.orders[0], sibling_order);
    let all = revalidate(&mut preview.orders, &catalog, &settings);
    assert_eq!(all[0], sibling_result);
    assert_eq!(all[1], touched);
}

// ---------------------------------------------------------------------------
// Test 8: Files in, atomic JSON payload file out
// ---------------------------------------------------------------------------
#[test]
fn catalog_and_settings_files_to_json_sink() {
    let mut catalog_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        catalog_file,
        r#"[{{ "id": 17, "name": "شنطة", "stock": 5, "selling_price": "1,200" }}]"#
    )
    .unwrap();
    let mut settings_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        settings_file,
        r#"{{ "rates": {{ "discount_type": "amount", "discount_value": "200" }} }}"#
    )
    .unwrap();

    let catalog = load_catalog(catalog_file.path()).unwrap();
    let settings = load_settings(settings_file.path()).unwrap();
    let script = "الاسم: هدى\nالهاتف: 01234567890\nالكمية 1 اسم شنطة\nالشحن: 60";

    let preview = preview_script(script, 99, &catalog, &settings).unwrap();
    assert_eq!(preview.decision, BatchDecision::Ready);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("batch.json");
    let mut sink = JsonFileSink::new(&out);
    let receipt =
        commit_batch(&preview.orders, &catalog, &settings, OverrideSet::new(), &mut sink).unwrap();
    assert_eq!(receipt.sequence_numbers, vec![100]);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written[0]["items"][0]["product_id"], "17");
    assert_eq!(written[0]["subtotal"], "1200");
    assert_eq!(written[0]["discount"], "200");
    assert_eq!(written[0]["total"], "1060");
    assert_eq!(written[0]["discount_type"], "amount");
}

// ---------------------------------------------------------------------------
// Test 9: Script with no name labels is reported as nothing parsed
// ---------------------------------------------------------------------------
#[test]
fn no_labels_is_nothing_parsed() {
    let result = preview_script(
        "الكميه 2 اسم قميص اللون ازرق المقاس L",
        0,
        &shirt_catalog(),
        &ImportSettings::default(),
    );
    assert!(matches!(result, Err(ImportError::NothingParsed)));
}

// ---------------------------------------------------------------------------
// Test 10: Order flags and trace bundle
// ---------------------------------------------------------------------------
#[test]
fn order_flags_and_trace() {
    let script = "ملاحظة: طلبات الصفحة\n\
        الاسم: كريم\n\
        تفاصيل الطلب:\n\
        شنطة\n\
        الاسم: ياسمين\n\
        الهاتف: 01011111111";
    let preview = preview_script(script, 0, &shirt_catalog(), &ImportSettings::default()).unwrap();

    let first: Vec<FlagKind> = preview.results[0].flags.iter().map(|f| f.kind).collect();
    assert_eq!(first, vec![FlagKind::MissingPhone]);
    let second: Vec<FlagKind> = preview.results[1].flags.iter().map(|f| f.kind).collect();
    assert_eq!(second, vec![FlagKind::NoProductLines]);
    assert_eq!(preview.decision, BatchDecision::Rejected { orders: vec![2] });

    let trace = &preview.trace;
    assert_eq!(trace.entries.len(), 1);
    assert!(trace.warnings[0].message.contains("ignored"));
    assert!(trace
        .warnings
        .iter()
        .any(|w| w.message.contains("no quantity")));
    assert_eq!(trace.decisions.len(), 3);

    let catalog = parse_catalog_str("[]").unwrap();
    assert!(catalog.is_empty());
}

// ---------------------------------------------------------------------------
// Test 11: Lines that were never resolved, or edited after the preview,
// are resolved again at commit time
// ---------------------------------------------------------------------------
#[test]
fn commit_resolves_unreviewed_lines() {
    let script = "الاسم: سلمى\n\
        الهاتف: 01012345678\n\
        تفاصيل الطلب:\n\
        1- شنطة";
    let settings = ImportSettings::default();
    let catalog = shirt_catalog();

    // Parser output was never run against the catalog.
    let parsed = parse_script(script, 0, &settings).unwrap();
    let mut unknown = parsed.orders.clone();
    unknown[0].lines[0].name = "ساعة".into();
    let mut sink = MockSink::default();
    let err = commit_batch(&unknown, &catalog, &settings, OverrideSet::confirm_all(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ImportError::HardBlocked { ref orders } if orders == &vec![1]));
    assert_eq!(sink.calls, 0);

    // The same parser output with a known product resolves and commits.
    let receipt =
        commit_batch(&parsed.orders, &catalog, &settings, OverrideSet::new(), &mut sink).unwrap();
    assert_eq!(receipt.sequence_numbers, vec![1]);
    assert_eq!(sink.persisted[0].items[0].product_id.as_deref(), Some("bg-1"));
    assert_eq!(sink.persisted[0].items[0].price, dec!(300));

    // A clean preview, then an edit to an unknown product without re-resolving.
    let mut preview = preview_script(script, 0, &catalog, &settings).unwrap();
    assert_eq!(preview.decision, BatchDecision::Ready);
    let edit = LineEdit {
        name: Some("ساعة".into()),
        ..Default::default()
    };
    apply_line_edit(&mut preview.orders, 1, 0, edit).unwrap();

    let mut sink = MockSink::default();
    let err = commit_batch(&preview.orders, &catalog, &settings, OverrideSet::confirm_all(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ImportError::HardBlocked { .. }));
    assert_eq!(sink.calls, 0);
}
