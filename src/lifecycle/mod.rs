//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Seed registry → Start workers, notifier,
//!     status API → Run rounds
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Abandon in-flight round → Stop workers
//!     → Drain notifier → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: seed first, then engine, then the API
//! - Any startup error is fatal; an engine error exits non-zero

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
