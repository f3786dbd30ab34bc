//! Host liveness subsystem.
//!
//! # Data Flow
//! ```text
//! Round scheduler (rounds.rs):
//!     registry.rs snapshot
//!     → ProbeJob per host → workers.rs (N fixed workers → Prober)
//!     → ProbeResult per job → state.rs (flap detector)
//!     → registry.rs update
//!     → Transition → sink notifier
//!
//! State machine (state.rs):
//!     Up ←→ Down
//!     With a fail streak threshold to prevent flapping
//! ```
//!
//! # Design Decisions
//! - Job, result and state are distinct types; workers only see jobs
//! - Only the scheduler can mutate the registry
//! - Health state is per-host; thresholds are process-wide

pub mod registry;
pub mod rounds;
pub mod state;
pub mod types;
pub mod workers;

pub use registry::{HostRegistry, RegistryError};
pub use rounds::{EngineError, RoundPhase, RoundReport, RoundScheduler};
pub use state::FlapDetector;
pub use types::{HostState, LinkState, ProbeJob, ProbeResult, Transition};
pub use workers::{PoolError, WorkerPool};
