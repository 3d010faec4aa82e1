//! Pawmate proximity-matching and notification engine.
//!
//! - [`domain`]: entities, rules and use-case services behind port traits.
//! - [`outbound`]: tree store, repositories and notifier adapters.
//! - [`inbound`]: the actix-web HTTP surface.
//! - [`engine`]: wiring shared by the binaries.

pub mod config;
pub mod doc;
pub mod domain;
pub mod engine;
pub mod inbound;
pub mod outbound;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
