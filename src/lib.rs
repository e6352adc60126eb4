//! Tenpin (workspace facade crate).
//!
//! This package exposes `tenpin::{core,adapter,types}` as one public API while the
//! implementation lives in dedicated crates under `crates/`.

pub use tenpin_adapter as adapter;
pub use tenpin_core as core;
pub use tenpin_types as types;

/// Install the stderr `tracing` subscriber shared by the binaries.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
