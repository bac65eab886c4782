//! Application layer driving the load test.
//!
//! This module defines the `LoadRunner`, which spawns virtual users as `tokio`
//! tasks, and the stats aggregator they report to. Users never share mutable
//! state: each one owns its RNG and sends request records to the aggregator
//! over a channel (actor-like pattern).

pub mod runner;
pub mod stats;
