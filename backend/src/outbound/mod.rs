//! Outbound adapters implementing the domain's driven ports.
//!
//! - [`store`]: tree store backends.
//! - [`persistence`]: typed repositories over the tree store.
//! - [`notifier`]: email/push delivery transports.
//! - [`seed`]: snapshot loading at startup.

pub mod notifier;
pub mod persistence;
pub mod seed;
pub mod store;
