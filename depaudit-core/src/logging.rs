//! Structured logging setup using **tracing**.
//!
//! The classifier emits its intermediate sets as debug-level trace events;
//! run with `RUST_LOG=depaudit_core=debug` to watch a classification step
//! by step. The JSON subscriber writes to stderr so stdout stays clean for
//! report output.

/// Initializes the global tracing collector (subscriber).
///
/// This should be called *once* at the beginning of the application's
/// runtime. It configures structured JSON output to stderr.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g. `RUST_LOG=depaudit_core=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
