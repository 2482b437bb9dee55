//! Engine error taxonomy

/// Errors produced by the decision engine.
///
/// `InsufficientData` and `NoPriceAvailable` are per-symbol conditions: the
/// caller skips the symbol for the current run and carries on. Persistence
/// failures must never be absorbed as a successful grade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("not enough history for {symbol}: {points} points, need {required}")]
    InsufficientData {
        symbol: String,
        points: usize,
        required: usize,
    },

    #[error("no price available for {symbol}")]
    NoPriceAvailable { symbol: String },

    #[error("persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("corrupt state: {0}")]
    CorruptState(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
