//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`]. The reminder batch also has a
//! command-line entry point in `src/bin/reminder_job.rs`.

pub mod http;
