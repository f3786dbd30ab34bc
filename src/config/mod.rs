//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI / environment overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → CheckerConfig (validated, immutable)
//!     → passed by value to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is built once at startup; nothing reads the environment afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::CheckerConfig;
pub use schema::EngineConfig;
pub use schema::ProbeConfig;
pub use schema::ProbeMethod;
pub use schema::RecoveryPolicy;
pub use schema::SeedConfig;
pub use schema::SinksConfig;
pub use schema::StatusConfig;
pub use schema::ObservabilityConfig;
pub use schema::WebhookConfig;
pub use schema::WebhookMethod;
pub use schema::LogFormat;
pub use validation::{validate_config, ValidationError};
