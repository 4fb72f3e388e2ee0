//! Access-control and record-integrity core for a legal practice casebook.
//!
//! This crate keeps the records of a small firm: user accounts and their
//! approval, matters ("cases") with their files and comments, training
//! assignments with their submissions, and inbound enquiries. It decides which
//! role may see or act on which record, and keeps every record consistent while
//! users view, upload, comment and submit against it.
//!
//! Rendering, navigation and any transport are left to the caller, which drives
//! the core through the [`casebook::api::PortalRequest`] surface or through the
//! individual ledger services.
//!
//! Every component is a [`tower::Service`], so callers can wrap them with the
//! usual tower layers (timeouts, buffering, concurrency limits).

#[cfg(test)]
mod tests;

pub mod casebook;

#[cfg(feature = "casebook_tracing")]
pub mod casebook_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests
    /// This sets up a tracing subscriber that will display logs during test execution.
    /// Call this at the beginning of tests that need to see tracing output.
    pub fn init() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("off"));

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
