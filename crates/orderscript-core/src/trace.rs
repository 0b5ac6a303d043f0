use crate::model::{LineParseMode, ParsedOrder, ParsedProductLine};
use crate::reconcile::outcome::{BatchDecision, ReconciliationResult, Severity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSeverity {
    Critical,
    Important,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceVisibility {
    Always,
    Auto,
    OnDemand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepType {
    ParseLine,
    MatchProduct,
    ResolvePrice,
    ComputeTotals,
    CheckTotals,
    BatchGate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_type: TraceStepType,
    pub message: String,
}

/// How one product line was read, matched and priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub entry_id: String,
    pub sequence_number: u64,
    pub line_index: usize,
    pub raw_text: String,
    pub parse_mode: LineParseMode,
    pub quantity: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
    pub resolved_price: Decimal,
    pub line_total: Decimal,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceDecisionTarget {
    Order,
    Batch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDecision {
    pub decision_id: String,
    pub target: TraceDecisionTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    pub outcome: String,
    pub reason: String,
    pub severity: TraceSeverity,
    pub visibility: TraceVisibility,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    pub message: String,
    pub severity: TraceSeverity,
    pub visibility: TraceVisibility,
}

impl TraceWarning {
    pub fn script(message: String) -> Self {
        TraceWarning {
            sequence_number: None,
            message,
            severity: TraceSeverity::Important,
            visibility: TraceVisibility::Always,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceBundle {
    pub trace_schema_version: String,
    pub entries: Vec<TraceEntry>,
    pub decisions: Vec<TraceDecision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TraceWarning>,
}

impl Default for TraceBundle {
    fn default() -> Self {
        Self {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            entries: Vec::new(),
            decisions: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Trace every line and order of a reconciled batch, plus the gate decision.
pub fn build_trace(
    orders: &[ParsedOrder],
    results: &[ReconciliationResult],
    decision: &BatchDecision,
) -> TraceBundle {
    let mut bundle = TraceBundle::default();

    for order in orders {
        for (idx, line) in order.lines.iter().enumerate() {
            bundle
                .entries
                .push(build_line_trace(order.sequence_number, idx, line));
            if line.quantity_defaulted {
                bundle.warnings.push(TraceWarning {
                    sequence_number: Some(order.sequence_number),
                    message: format!(
                        "line {}: no quantity given for '{}', assumed 1",
                        idx + 1,
                        line.name
                    ),
                    severity: TraceSeverity::Info,
                    visibility: TraceVisibility::Auto,
                });
            }
        }
    }

    for (order, result) in orders.iter().zip(results) {
        bundle.decisions.push(build_order_decision(order, result));
    }
    bundle.decisions.push(build_batch_decision(decision));

    bundle
}

pub fn build_line_trace(sequence_number: u64, idx: usize, line: &ParsedProductLine) -> TraceEntry {
    let match_message = match (&line.resolved_product_id, line.match_tier) {
        (Some(id), Some(tier)) => {
            let mut msg = format!("Matched catalog entry '{id}' by {tier}");
            if line.missing_color {
                msg.push_str("; color differs from catalog");
            }
            if line.missing_size {
                msg.push_str("; size differs from catalog");
            }
            msg
        }
        _ => format!("No catalog entry matches '{}'", line.name),
    };

    TraceEntry {
        entry_id: format!("ln_{}_{}", sequence_number, idx),
        sequence_number,
        line_index: idx,
        raw_text: line.raw_text.clone(),
        parse_mode: line.parse_mode,
        quantity: line.quantity,
        name: line.name.clone(),
        color: line.color.clone(),
        size: line.size.clone(),
        resolved_price: line.resolved_price,
        line_total: line.line_total,
        steps: vec![
            TraceStep {
                step_type: TraceStepType::ParseLine,
                message: format!(
                    "Parsed '{}' ({}) as {} x '{}'",
                    line.raw_text, line.parse_mode, line.quantity, line.name
                ),
            },
            TraceStep {
                step_type: TraceStepType::MatchProduct,
                message: match_message,
            },
            TraceStep {
                step_type: TraceStepType::ResolvePrice,
                message: if line.missing_price {
                    "No positive price found".to_string()
                } else {
                    format!(
                        "Unit price {} from {} (script said {})",
                        line.resolved_price, line.price_source, line.script_price
                    )
                },
            },
        ],
    }
}

pub fn build_order_decision(order: &ParsedOrder, result: &ReconciliationResult) -> TraceDecision {
    let (outcome, severity) = if result.is_hard_blocked() {
        ("blocked", TraceSeverity::Critical)
    } else if result.has_soft_flags() {
        ("warning", TraceSeverity::Important)
    } else {
        ("ok", TraceSeverity::Info)
    };

    let reason = if result.flags.is_empty() {
        "no flags".to_string()
    } else {
        result
            .flags
            .iter()
            .map(|f| f.kind.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let t = &result.totals;
    let mut steps = vec![
        TraceStep {
            step_type: TraceStepType::ComputeTotals,
            message: format!(
                "subtotal {} - discount {} + tax {} + shipping {} = {}",
                t.subtotal, t.discount, t.tax, t.shipping, t.total
            ),
        },
        TraceStep {
            step_type: TraceStepType::CheckTotals,
            message: format!(
                "computed {} + shipping {} vs required {}{}",
                result.computed_subtotal,
                order.declared_shipping,
                result.required_total,
                if result.totals_mismatch {
                    " (mismatch)"
                } else {
                    ""
                }
            ),
        },
    ];
    steps.extend(result.flags_of(Severity::Hard).map(|f| TraceStep {
        step_type: TraceStepType::BatchGate,
        message: f.message.clone(),
    }));

    TraceDecision {
        decision_id: format!("dec_{}", order.sequence_number),
        target: TraceDecisionTarget::Order,
        sequence_number: Some(order.sequence_number),
        outcome: outcome.to_string(),
        reason,
        severity,
        visibility: if result.flags.is_empty() {
            TraceVisibility::Auto
        } else {
            TraceVisibility::Always
        },
        steps,
    }
}

pub fn build_batch_decision(decision: &BatchDecision) -> TraceDecision {
    let severity = match decision {
        BatchDecision::Rejected { .. } => TraceSeverity::Critical,
        BatchDecision::NeedsConfirmation { .. } => TraceSeverity::Important,
        BatchDecision::Ready => TraceSeverity::Info,
    };
    let reason = match decision {
        BatchDecision::Rejected { .. } => "unresolved products or prices block the whole batch",
        BatchDecision::NeedsConfirmation { .. } => "warnings must be confirmed per order",
        BatchDecision::Ready => "all orders clean or confirmed",
    };

    TraceDecision {
        decision_id: "dec_batch".to_string(),
        target: TraceDecisionTarget::Batch,
        sequence_number: None,
        outcome: decision.to_string(),
        reason: reason.to_string(),
        severity,
        visibility: TraceVisibility::Always,
        steps: vec![TraceStep {
            step_type: TraceStepType::BatchGate,
            message: format!("Batch {decision}"),
        }],
    }
}
