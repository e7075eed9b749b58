//! HTTP bridge to a local wallet that holds the account keys.
//!
//! The bridge owns transaction building and signing; this side only sends
//! the logical calls and reads back the digest.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Address, Network, TransactionDigest},
    protocol::{AccountResponse, MoveCall, SignAndExecuteRequest, SignAndExecuteResponse},
};
use tracing::debug;
use url::Url;

use crate::{SessionProvider, SignAndExecute};

pub struct WalletBridge {
    http: Client,
    base_url: Url,
    network: Network,
}

impl WalletBridge {
    pub fn new(base_url: &str, network: Network) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid wallet url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            network,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid wallet endpoint '{path}'"))
    }
}

#[async_trait]
impl SessionProvider for WalletBridge {
    async fn current_account(&self) -> Result<Option<Address>> {
        let response: AccountResponse = self
            .http
            .get(self.endpoint("account")?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.address)
    }
}

#[async_trait]
impl SignAndExecute for WalletBridge {
    async fn sign_and_execute(&self, call: MoveCall) -> Result<TransactionDigest> {
        debug!(move_call = %call.target, network = %self.network, "requesting wallet signature");
        let response = self
            .http
            .post(self.endpoint("sign_and_execute")?)
            .json(&SignAndExecuteRequest {
                network: self.network,
                calls: vec![call],
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<SignAndExecuteResponse>(&body).ok();

        // Rejections arrive as an `error` field, with or without a failing status.
        if let Some(error) = parsed.as_ref().and_then(|parsed| parsed.error.clone()) {
            return Err(anyhow!(error));
        }
        if !status.is_success() {
            return Err(anyhow!("wallet bridge returned {status}: {body}"));
        }
        parsed
            .and_then(|parsed| parsed.digest)
            .ok_or_else(|| anyhow!("wallet bridge response carried no transaction digest"))
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
