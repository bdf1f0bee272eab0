//! Shared test infrastructure.
//!
//! - **Pipeline model**: Builds stage-event logs from a program description.
//! - **Logging**: Routes library `tracing` output to the test harness.

pub mod pipeline;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-writer subscriber once per test binary; `RUST_LOG` selects the level.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
