//! Flap-damped host liveness monitor.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod resilience;
pub mod seed;
pub mod sink;
pub mod status;

pub use config::schema::CheckerConfig;
pub use health::{FlapDetector, HostRegistry, RoundScheduler, Transition, WorkerPool};
pub use lifecycle::Shutdown;
