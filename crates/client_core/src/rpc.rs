//! JSON-RPC client for a Sui fullnode.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{
    domain::{ObjectId, TransactionDigest},
    protocol::{ObjectResponse, TransactionBlockResponse},
};
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;
use url::Url;

use crate::{ObjectReader, TransactionResponseOptions, TransactionWaiter};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid rpc url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Server { code: i64, message: String },
    #[error("rpc response for {method} carried neither result nor error")]
    EmptyResponse { method: String },
    #[error("timed out after {waited:?} waiting for transaction {digest}")]
    ConfirmationTimeout {
        digest: TransactionDigest,
        waited: Duration,
    },
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

pub struct SuiRpcClient {
    http: Client,
    rpc_url: Url,
    next_id: AtomicU64,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl SuiRpcClient {
    pub fn new(
        rpc_url: &str,
        poll_interval: Duration,
        confirmation_timeout: Duration,
    ) -> Result<Self, RpcError> {
        let rpc_url = Url::parse(rpc_url).map_err(|source| RpcError::InvalidUrl {
            url: rpc_url.to_string(),
            source,
        })?;
        Ok(Self {
            http: Client::new(),
            rpc_url,
            next_id: AtomicU64::new(1),
            poll_interval,
            confirmation_timeout,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response: RpcResponse<T> = self
            .http
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RpcError::Server {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| RpcError::EmptyResponse {
            method: method.to_string(),
        })
    }

    pub async fn get_transaction_block(
        &self,
        digest: &TransactionDigest,
        options: TransactionResponseOptions,
    ) -> Result<TransactionBlockResponse, RpcError> {
        self.call(
            "sui_getTransactionBlock",
            json!([
                digest,
                {
                    "showEffects": options.show_effects,
                    "showObjectChanges": options.show_object_changes,
                }
            ]),
        )
        .await
    }
}

#[async_trait]
impl ObjectReader for SuiRpcClient {
    async fn get_object(&self, object_id: &ObjectId) -> Result<ObjectResponse> {
        let response = self
            .call(
                "sui_getObject",
                json!([object_id, { "showContent": true, "showOwner": true }]),
            )
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl TransactionWaiter for SuiRpcClient {
    /// Polls until the fullnode has indexed the transaction. Each lookup and
    /// the wait as a whole are bounded by the configured confirmation timeout.
    async fn wait_for_transaction(
        &self,
        digest: &TransactionDigest,
        options: TransactionResponseOptions,
    ) -> Result<TransactionBlockResponse> {
        let started = Instant::now();
        let deadline = started + self.confirmation_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, self.get_transaction_block(digest, options)).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) => debug!(%digest, error = %err, "transaction not yet available"),
                Err(_) => debug!(%digest, "transaction lookup did not answer before the deadline"),
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(RpcError::ConfirmationTimeout {
                    digest: digest.clone(),
                    waited: started.elapsed(),
                }
                .into());
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
#[path = "tests/rpc_tests.rs"]
mod tests;
