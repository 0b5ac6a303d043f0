use crate::catalog::schema::Catalog;
use crate::error::ImportError;
use crate::model::ParsedOrder;
use crate::reconcile::engine::{assess_batch, revalidate};
use crate::reconcile::outcome::{BatchDecision, OverrideSet, ReconciliationResult};
use crate::settings::schema::{AdjustmentKind, CalculationOrder, ImportSettings};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One product row of an order-creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemPayload {
    pub name: String,
    pub product_id: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub color: String,
    pub size: String,
}

/// What the persistence collaborator receives for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub sequence_number: u64,
    pub customer_name: String,
    pub phone1: String,
    pub phone2: String,
    pub governorate: String,
    pub address: String,
    pub employee: String,
    pub page: String,
    pub notes: String,
    pub items: Vec<OrderItemPayload>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub discount_type: AdjustmentKind,
    pub discount_value: Decimal,
    pub tax_type: AdjustmentKind,
    pub tax_value: Decimal,
    pub calculation_order: CalculationOrder,
    /// The operator accepted soft warnings on this order.
    pub confirmed_with_warnings: bool,
}

impl OrderPayload {
    pub fn build(
        order: &ParsedOrder,
        result: &ReconciliationResult,
        settings: &ImportSettings,
        confirmed_with_warnings: bool,
    ) -> Self {
        let rates = &settings.rates;
        OrderPayload {
            sequence_number: order.sequence_number,
            customer_name: order.customer_name.clone(),
            phone1: order.phone1.clone(),
            phone2: order.phone2.clone(),
            governorate: order.governorate.clone(),
            address: order.address.clone(),
            employee: order.employee_raw.clone(),
            page: order.page_raw.clone(),
            notes: order.notes.clone(),
            items: order
                .lines
                .iter()
                .map(|line| OrderItemPayload {
                    name: line.name.clone(),
                    product_id: line.resolved_product_id.clone(),
                    quantity: line.quantity,
                    price: line.resolved_price,
                    color: line.color.clone(),
                    size: line.size.clone(),
                })
                .collect(),
            subtotal: result.totals.subtotal,
            shipping: result.totals.shipping,
            discount: result.totals.discount,
            tax: result.totals.tax,
            total: result.totals.total,
            discount_type: rates.discount_type,
            discount_value: rates.discount_value,
            tax_type: rates.tax_type,
            tax_value: rates.tax_value,
            calculation_order: rates.calculation_order,
            confirmed_with_warnings,
        }
    }
}

/// Persistence boundary for committed orders.
pub trait OrderSink {
    /// Accept the whole batch or fail. Called at most once per commit.
    fn submit(&mut self, orders: &[OrderPayload]) -> Result<(), ImportError>;

    /// Name of this sink (for diagnostics).
    fn sink_name(&self) -> &str;
}

/// Summary of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub sink: String,
    pub sequence_numbers: Vec<u64>,
    pub confirmed_with_warnings: Vec<u64>,
}

/// Gate a batch and hand every order to `sink` in a single call.
///
/// Every order is resolved again against `catalog` before the gate, on a
/// copy, so lines that were never resolved or were edited since the last
/// preview are judged on their current text. Hard flags reject the batch,
/// unconfirmed soft flags require confirmation; either way the sink is
/// never called. `overrides` is consumed and does not outlive this attempt.
pub fn commit_batch(
    orders: &[ParsedOrder],
    catalog: &Catalog,
    settings: &ImportSettings,
    overrides: OverrideSet,
    sink: &mut dyn OrderSink,
) -> Result<CommitReceipt, ImportError> {
    if orders.is_empty() {
        return Err(ImportError::NothingParsed);
    }

    let mut orders = orders.to_vec();
    let results = revalidate(&mut orders, catalog, settings);

    match assess_batch(&results, &overrides) {
        BatchDecision::Rejected { orders } => return Err(ImportError::HardBlocked { orders }),
        BatchDecision::NeedsConfirmation { orders } => {
            warn!(orders = ?orders, "commit needs confirmation");
            return Err(ImportError::ConfirmationRequired { orders });
        }
        BatchDecision::Ready => {}
    }

    let payloads: Vec<OrderPayload> = orders
        .iter()
        .zip(&results)
        .map(|(order, result)| OrderPayload::build(order, result, settings, result.has_soft_flags()))
        .collect();

    sink.submit(&payloads)?;

    let receipt = CommitReceipt {
        sink: sink.sink_name().to_string(),
        sequence_numbers: payloads.iter().map(|p| p.sequence_number).collect(),
        confirmed_with_warnings: payloads
            .iter()
            .filter(|p| p.confirmed_with_warnings)
            .map(|p| p.sequence_number)
            .collect(),
    };
    info!(
        sink = %receipt.sink,
        orders = receipt.sequence_numbers.len(),
        "batch committed"
    );
    Ok(receipt)
}

/// Writes the payload array as pretty JSON. The file appears complete or
/// not at all: data goes to a temp file next to the target, then is renamed.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OrderSink for JsonFileSink {
    fn submit(&mut self, orders: &[OrderPayload]) -> Result<(), ImportError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, orders)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| ImportError::Sink(format!("{}: {}", self.path.display(), e.error)))?;
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "json-file"
    }
}
