//! Tracing configuration for test output.

use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_TEST_FILTER: &str = "info,inkwell=debug";

/// Initialize tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Output goes through the test harness, so it only shows for failing tests
/// or under `--nocapture`.
pub fn init_test_tracing() {
    init_test_tracing_with_filter(DEFAULT_TEST_FILTER);
}

/// Initialize tracing with a fallback filter used when `RUST_LOG` is unset.
pub fn init_test_tracing_with_filter(fallback: &str) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

        // Another harness may have installed a global subscriber first.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .compact(),
            )
            .try_init();
    });
}
