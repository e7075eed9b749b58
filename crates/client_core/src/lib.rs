use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Address, ObjectId, TransactionDigest},
    protocol::{MoveCall, ObjectResponse, TransactionBlockResponse},
};
use tracing::info;

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod locator;
pub mod rpc;
pub mod snapshot;
pub mod wallet;

pub use app::{CounterApp, Screen};
pub use config::{load_settings, NetworkSettings, Settings};
pub use dispatcher::{ActionButton, ActionDispatcher, ActionOutcome, DispatchPhase, DispatcherEvent};
pub use locator::{extract_created_object_id, validate_package_id, ObjectLocator, Resolution};
pub use rpc::SuiRpcClient;
pub use snapshot::{project_counter_fields, SnapshotReader, SnapshotState};
pub use wallet::WalletBridge;

/// Which parts of a confirmed transaction the caller needs back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionResponseOptions {
    pub show_effects: bool,
    pub show_object_changes: bool,
}

impl TransactionResponseOptions {
    pub fn effects() -> Self {
        Self {
            show_effects: true,
            show_object_changes: false,
        }
    }

    pub fn effects_and_changes() -> Self {
        Self {
            show_effects: true,
            show_object_changes: true,
        }
    }
}

/// Signs a call with the connected account and submits it to the network.
#[async_trait]
pub trait SignAndExecute: Send + Sync {
    async fn sign_and_execute(&self, call: MoveCall) -> Result<TransactionDigest>;
}

/// Waits until a submitted transaction is visible on the network.
#[async_trait]
pub trait TransactionWaiter: Send + Sync {
    async fn wait_for_transaction(
        &self,
        digest: &TransactionDigest,
        options: TransactionResponseOptions,
    ) -> Result<TransactionBlockResponse>;
}

#[async_trait]
pub trait ObjectReader: Send + Sync {
    async fn get_object(&self, object_id: &ObjectId) -> Result<ObjectResponse>;
}

/// Supplies the account currently connected in the wallet, if any.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_account(&self) -> Result<Option<Address>>;
}

/// Stand-in used when no wallet endpoint is configured.
pub struct DisconnectedWallet;

#[async_trait]
impl SignAndExecute for DisconnectedWallet {
    async fn sign_and_execute(&self, call: MoveCall) -> Result<TransactionDigest> {
        Err(anyhow!(
            "no wallet connected; cannot sign call to {}",
            call.target
        ))
    }
}

#[async_trait]
impl SessionProvider for DisconnectedWallet {
    async fn current_account(&self) -> Result<Option<Address>> {
        Ok(None)
    }
}

/// The external collaborators every component talks through.
#[derive(Clone)]
pub struct CounterServices {
    pub signer: Arc<dyn SignAndExecute>,
    pub waiter: Arc<dyn TransactionWaiter>,
    pub reader: Arc<dyn ObjectReader>,
    pub session: Arc<dyn SessionProvider>,
}

impl CounterServices {
    /// Wires the fullnode RPC client and, when configured, the wallet bridge.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let network = settings.active();
        let rpc = Arc::new(SuiRpcClient::new(
            &network.rpc_url,
            settings.poll_interval,
            settings.confirmation_timeout,
        )?);
        info!(
            network = %settings.network,
            rpc_url = %network.rpc_url,
            "connecting counter client"
        );

        let services = match &settings.wallet_url {
            Some(wallet_url) => {
                let wallet = Arc::new(WalletBridge::new(wallet_url, settings.network)?);
                Self {
                    signer: wallet.clone(),
                    waiter: rpc.clone(),
                    reader: rpc,
                    session: wallet,
                }
            }
            None => Self {
                signer: Arc::new(DisconnectedWallet),
                waiter: rpc.clone(),
                reader: rpc,
                session: Arc::new(DisconnectedWallet),
            },
        };
        Ok(services)
    }
}

#[cfg(test)]
#[path = "tests/fakes.rs"]
mod fakes;
