//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (address, round, worker) on every engine event
//! - Metrics are recorded unconditionally; without an installed recorder
//!   the `metrics` macros are no-ops

pub mod logging;
pub mod metrics;
