//! Resilience helpers.
//!
//! # Design Decisions
//! - The round engine never retries; a transition is emitted once
//! - Sinks that want durability retry on their own with backoff.rs

pub mod backoff;
