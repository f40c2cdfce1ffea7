//! Tracing/logging setup shared by binaries and tests.

/// Initialize process-wide logging using `STOCKCAST_LOG_FORMAT` (default JSON).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;
