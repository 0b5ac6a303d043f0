pub mod catalog;
pub mod commit;
pub mod error;
pub mod model;
pub mod parsing;
pub mod pricing;
pub mod reconcile;
pub mod settings;
pub mod trace;

use catalog::schema::Catalog;
use error::ImportError;
use model::ParsedOrder;
use parsing::ParsedScript;
use reconcile::outcome::{BatchDecision, OverrideSet, ReconciliationResult};
use serde::Serialize;
use settings::schema::ImportSettings;
use trace::{TraceBundle, TraceWarning};
use tracing::{info, warn};

pub use reconcile::engine::revalidate;

/// Parse a pasted script into orders without touching the catalog.
///
/// Sequence numbers continue from `highest_existing`. Fails only when the
/// script holds no customer-name label at all.
pub fn parse_script(
    raw: &str,
    highest_existing: u64,
    settings: &ImportSettings,
) -> Result<ParsedScript, ImportError> {
    let parsed = parsing::parse_orders(raw, highest_existing, &settings.extract_options())?;

    if let Some(preamble) = &parsed.preamble {
        warn!(chars = preamble.chars().count(), "discarded text before first order");
    }
    info!(
        orders = parsed.orders.len(),
        lines = parsed.orders.iter().map(|o| o.lines.len()).sum::<usize>(),
        "script parsed"
    );
    Ok(parsed)
}

/// Everything an operator needs to review a batch before committing it.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub orders: Vec<ParsedOrder>,
    pub results: Vec<ReconciliationResult>,
    /// Gate decision with no overrides applied.
    pub decision: BatchDecision,
    pub trace: TraceBundle,
    #[serde(skip)]
    parse_warnings: Vec<TraceWarning>,
}

impl Preview {
    /// Re-run resolution and validation after edits or a catalog/settings change.
    pub fn refresh(&mut self, catalog: &Catalog, settings: &ImportSettings) {
        self.results = revalidate(&mut self.orders, catalog, settings);
        self.decision = reconcile::engine::assess_batch(&self.results, &OverrideSet::new());
        self.trace = trace::build_trace(&self.orders, &self.results, &self.decision);
        let mut warnings = self.parse_warnings.clone();
        warnings.append(&mut self.trace.warnings);
        self.trace.warnings = warnings;
    }
}

/// Full pipeline: parse, resolve against `catalog`, price, total and validate.
pub fn preview_script(
    raw: &str,
    highest_existing: u64,
    catalog: &Catalog,
    settings: &ImportSettings,
) -> Result<Preview, ImportError> {
    let parsed = parse_script(raw, highest_existing, settings)?;

    let mut parse_warnings = Vec::new();
    if let Some(preamble) = &parsed.preamble {
        parse_warnings.push(TraceWarning::script(format!(
            "text before the first name label was ignored: '{}'",
            preamble
        )));
    }
    if parsed.empty_spans > 0 {
        parse_warnings.push(TraceWarning::script(format!(
            "{} name label(s) had no order text and were skipped",
            parsed.empty_spans
        )));
    }

    let mut preview = Preview {
        orders: parsed.orders,
        results: Vec::new(),
        decision: BatchDecision::Ready,
        trace: TraceBundle::default(),
        parse_warnings,
    };
    preview.refresh(catalog, settings);

    info!(
        orders = preview.orders.len(),
        decision = %preview.decision,
        "preview ready"
    );
    Ok(preview)
}
