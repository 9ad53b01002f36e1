//! Tracing and logging (shared setup).

/// Initialize process-wide logging with the format named by `TALLY_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use crate::tracing::LogFormat;
