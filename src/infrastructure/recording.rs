use crate::domain::operation::{Operation, TransactionRequest};
use crate::domain::ports::{BankClient, Response};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory stand-in for the bank API.
///
/// Answers every request with a fixed status and keeps a copy of what was
/// sent, so it suits bounded runs in tests.
#[derive(Debug, Clone)]
pub struct RecordingBankClient {
    status: u16,
    sent: Arc<RwLock<Vec<(Operation, TransactionRequest)>>>,
}

impl Default for RecordingBankClient {
    fn default() -> Self {
        Self::with_status(200)
    }
}

impl RecordingBankClient {
    /// Creates a recorder that answers `200 OK`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that answers every request with `status`.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<(Operation, TransactionRequest)> {
        self.sent.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.sent.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sent.read().await.is_empty()
    }
}

#[async_trait]
impl BankClient for RecordingBankClient {
    async fn submit(&self, op: Operation, request: &TransactionRequest) -> Result<Response> {
        let mut sent = self.sent.write().await;
        sent.push((op, *request));
        Ok(Response {
            status: self.status,
        })
    }
}

/// Answers every request with a fixed status and only counts them.
///
/// Backs `--dry-run`, which may run until interrupted.
#[derive(Debug, Clone)]
pub struct CountingBankClient {
    status: u16,
    sent: Arc<AtomicU64>,
}

impl Default for CountingBankClient {
    fn default() -> Self {
        Self::with_status(200)
    }
}

impl CountingBankClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            sent: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BankClient for CountingBankClient {
    async fn submit(&self, _op: Operation, _request: &TransactionRequest) -> Result<Response> {
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(Response {
            status: self.status,
        })
    }
}
