use crate::pricing::totals::OrderTotals;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Whether a flag can be overridden by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the whole batch. No override.
    Hard,
    /// Needs an explicit per-order confirmation.
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    MissingProduct,
    MissingPrice,
    NoProductLines,
    MissingSize,
    MissingColor,
    MissingPhone,
    TotalsMismatch,
}

impl FlagKind {
    pub fn severity(self) -> Severity {
        match self {
            FlagKind::MissingProduct | FlagKind::MissingPrice | FlagKind::NoProductLines => {
                Severity::Hard
            }
            FlagKind::MissingSize
            | FlagKind::MissingColor
            | FlagKind::MissingPhone
            | FlagKind::TotalsMismatch => Severity::Soft,
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlagKind::MissingProduct => "missing product",
            FlagKind::MissingPrice => "missing price",
            FlagKind::NoProductLines => "no product lines",
            FlagKind::MissingSize => "size differs",
            FlagKind::MissingColor => "color differs",
            FlagKind::MissingPhone => "missing phone",
            FlagKind::TotalsMismatch => "totals mismatch",
        };
        write!(f, "{s}")
    }
}

/// One problem found on an order or one of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub kind: FlagKind,
    pub severity: Severity,
    /// Index into the order's lines, for line-level flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Flag {
    pub fn order(kind: FlagKind, message: String) -> Self {
        Flag {
            kind,
            severity: kind.severity(),
            line: None,
            message,
        }
    }

    pub fn line(kind: FlagKind, line: usize, message: String) -> Self {
        Flag {
            kind,
            severity: kind.severity(),
            line: Some(line),
            message,
        }
    }
}

/// Validation outcome for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub sequence_number: u64,
    pub totals: OrderTotals,
    /// Sum of line totals, before clamping.
    pub computed_subtotal: Decimal,
    /// The total the script asks for (declared, or subtotal + shipping).
    pub required_total: Decimal,
    pub totals_mismatch: bool,
    pub flags: Vec<Flag>,
}

impl ReconciliationResult {
    pub fn is_hard_blocked(&self) -> bool {
        self.flags.iter().any(|f| f.severity == Severity::Hard)
    }

    pub fn has_soft_flags(&self) -> bool {
        self.flags.iter().any(|f| f.severity == Severity::Soft)
    }

    pub fn flags_of(&self, severity: Severity) -> impl Iterator<Item = &Flag> {
        self.flags.iter().filter(move |f| f.severity == severity)
    }
}

/// Gate outcome for a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum BatchDecision {
    /// Some order has a hard flag. Nothing may be committed.
    Rejected { orders: Vec<u64> },
    /// Only soft flags remain, on orders the operator has not confirmed.
    NeedsConfirmation { orders: Vec<u64> },
    Ready,
}

impl fmt::Display for BatchDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |orders: &[u64]| {
            orders
                .iter()
                .map(|o| format!("#{o}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            BatchDecision::Rejected { orders } => write!(f, "rejected ({})", list(orders)),
            BatchDecision::NeedsConfirmation { orders } => {
                write!(f, "needs confirmation ({})", list(orders))
            }
            BatchDecision::Ready => write!(f, "ready"),
        }
    }
}

/// Operator confirmations for soft-flagged orders.
///
/// Not `Clone`: a set is handed to one commit attempt and consumed there.
#[derive(Debug, Default)]
pub struct OverrideSet {
    all: bool,
    orders: BTreeSet<u64>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirm every soft-flagged order in the batch.
    pub fn confirm_all() -> Self {
        OverrideSet {
            all: true,
            orders: BTreeSet::new(),
        }
    }

    pub fn confirm(mut self, sequence_number: u64) -> Self {
        self.orders.insert(sequence_number);
        self
    }

    pub fn covers(&self, sequence_number: u64) -> bool {
        self.all || self.orders.contains(&sequence_number)
    }
}

impl FromIterator<u64> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        OverrideSet {
            all: false,
            orders: iter.into_iter().collect(),
        }
    }
}
