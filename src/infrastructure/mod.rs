//! Adapters implementing the `BankClient` port.

pub mod http;
pub mod recording;
