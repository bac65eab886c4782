use super::operation::{Operation, TransactionRequest};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// What the bank API answered to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound port towards the bank API under test.
#[async_trait]
pub trait BankClient: Send + Sync {
    async fn submit(&self, op: Operation, request: &TransactionRequest) -> Result<Response>;
}

pub type BankClientRef = Arc<dyn BankClient>;
