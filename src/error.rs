use thiserror::Error;

/// Errors raised by the dashboard core.
///
/// None of these leave the store in a partially applied state: a rejected
/// intent keeps the previous store version untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("unknown widget variant '{0}'")]
    UnknownVariant(String),
    #[error("invalid dashboard snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("no widget with id '{0}'")]
    WidgetNotFound(String),
    #[error("widget '{id}' cannot change variant from {from} to {to}")]
    VariantChanged {
        id: String,
        from: String,
        to: String,
    },
    #[error("reorder index out of range (source {source_index}, destination {destination}, len {len})")]
    IndexOutOfRange {
        source_index: usize,
        destination: usize,
        len: usize,
    },
}

impl DashboardError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
