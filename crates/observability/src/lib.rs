//! Tracing/logging setup shared by hosts embedding the workspace.
//!
//! Emits JSON lines with timestamps; the filter comes from `RUST_LOG` and
//! defaults to `info`.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
}

/// Initialize with an explicit filter directive (e.g. `"formbus_events=debug"`),
/// ignoring `RUST_LOG`.
pub fn init_with_filter(directives: &str) {
    init_with(EnvFilter::new(directives));
}

fn init_with(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_a_no_op() {
        init_with_filter("info");
        init_with_filter("debug");
        init();
        tracing::info!("still alive after repeated init");
    }
}
