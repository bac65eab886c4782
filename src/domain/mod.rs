//! Domain layer: request payloads, sampling rules and the bank API port.

pub mod amount;
pub mod operation;
pub mod ports;
pub mod sampler;
pub mod task;
pub mod wait;
