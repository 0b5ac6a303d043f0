use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("nothing parsed: no customer-name label (e.g. 'الاسم:') found in the script")]
    NothingParsed,

    #[error("failed to load catalog from {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("failed to load settings from {path}: {reason}")]
    SettingsLoad { path: PathBuf, reason: String },

    #[error("invalid settings: {0}")]
    SettingsInvalid(String),

    #[error("batch rejected: orders {} have unresolved products or prices", join_orders(.orders))]
    HardBlocked { orders: Vec<u64> },

    #[error("batch needs confirmation: orders {} have warnings that were not overridden", join_orders(.orders))]
    ConfirmationRequired { orders: Vec<u64> },

    #[error("order #{0} not found in batch")]
    OrderNotFound(u64),

    #[error("order #{order} has no line {line}")]
    LineOutOfRange { order: u64, line: usize },

    #[error("order sink failed: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_orders(orders: &[u64]) -> String {
    orders
        .iter()
        .map(|o| format!("#{o}"))
        .collect::<Vec<_>>()
        .join(", ")
}
