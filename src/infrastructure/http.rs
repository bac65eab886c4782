use crate::domain::operation::{Operation, TransactionRequest};
use crate::domain::ports::{BankClient, Response};
use crate::error::{LoadError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// Posts requests to a live bank API over HTTP.
///
/// Wraps a pooled `reqwest::Client`; cloning is cheap and every clone shares
/// the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpBankClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpBankClient {
    /// Builds a client for `base_url` (e.g. `http://localhost:8080`).
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme, host and optional port of the bank API.
    /// * `timeout` - Upper bound for a whole request, connect included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| LoadError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(LoadError::InvalidUrl(format!(
                "{base_url}: only http and https are supported"
            )));
        }

        if timeout.is_zero() {
            return Err(LoadError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Full URL an operation is posted to.
    pub fn endpoint(&self, op: Operation) -> reqwest::Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{}", op.path()));
        url
    }
}

#[async_trait]
impl BankClient for HttpBankClient {
    async fn submit(&self, op: Operation, request: &TransactionRequest) -> Result<Response> {
        let url = self.endpoint(op);
        trace!(%url, account_id = request.account_id, amount = %request.amount, "POST");

        let response = self.client.post(url).json(request).send().await?;
        let status = response.status().as_u16();
        // Drain the body so the pooled connection can be reused.
        response.bytes().await?;

        Ok(Response { status })
    }
}
