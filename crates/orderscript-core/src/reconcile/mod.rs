pub mod edit;
pub mod engine;
pub mod outcome;

pub use edit::{apply_line_edit, set_shipping, LineEdit};
pub use engine::{assess_batch, reconcile_order, revalidate, validate};
pub use outcome::{BatchDecision, Flag, FlagKind, OverrideSet, ReconciliationResult, Severity};
