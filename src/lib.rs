#![doc(test(attr(deny(warnings))))]

//! tally bundles budget reconciliation, subscription status tracking and
//! plan-gated feature access behind a command-line front end.

pub mod cli;
pub mod utils;

pub use tally_config as config;
pub use tally_core as core;
pub use tally_domain as domain;
pub use tally_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup log.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing. `RUST_LOG` wins over `filter`, which wins over
/// the built-in default. Only the first call has any effect.
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::debug!("tally tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter(Some("tally=debug"));
    }
}
