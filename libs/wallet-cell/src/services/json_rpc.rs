use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{ProviderEvent, WalletError};
use crate::services::provider::{ProviderEvents, TaskGuard, WalletProvider};

/// EIP-1193 code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Wallet provider backed by a JSON-RPC 2.0 node over HTTP.
///
/// The node itself has no notion of a per-site permission, so authorization
/// is tracked here: no address is selected until `request_accounts`
/// succeeds, and `terminate` revokes it.
pub struct JsonRpcProvider {
    client: Client,
    url: String,
    next_id: AtomicU64,
    authorized: AtomicBool,
    events: ProviderEvents,
}

impl JsonRpcProvider {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
            authorized: AtomicBool::new(false),
            events: ProviderEvents::default(),
        }
    }

    /// `None` when no RPC URL is configured, i.e. no wallet is installed.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config.wallet_rpc_url.as_deref().map(Self::new)
    }

    pub fn events(&self) -> &ProviderEvents {
        &self.events
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    async fn call<T>(&self, method: &str, params: Value) -> Result<T, WalletError>
    where
        T: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("Wallet RPC {} (id {}) -> {}", method, id, self.url);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Wallet RPC HTTP error ({}): {}", status, error_text);
            return Err(WalletError::Transport(format!("HTTP {}: {}", status, error_text)));
        }

        let rpc: RpcResponse = response.json().await?;

        if let Some(err) = rpc.error {
            return Err(if err.code == USER_REJECTED_CODE {
                WalletError::UserRejected(err.message)
            } else {
                WalletError::Rpc {
                    code: err.code,
                    message: err.message,
                }
            });
        }

        serde_json::from_value(rpc.result.unwrap_or(Value::Null)).map_err(|e| WalletError::Rpc {
            code: -32603,
            message: format!("Unexpected result for {}: {}", method, e),
        })
    }

    async fn authorized_accounts(&self) -> Result<Vec<String>, WalletError> {
        if !self.is_authorized() {
            return Ok(Vec::new());
        }
        self.call::<Vec<String>>("eth_accounts", json!([])).await
    }

    /// Polls the node and emits `chainChanged` / `accountsChanged` whenever
    /// the observed values differ from the previous poll. The first poll
    /// only records a baseline.
    pub fn spawn_watcher(self: Arc<Self>, interval: Duration) -> TaskGuard {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_chain: Option<Option<String>> = None;
            let mut last_accounts: Option<Vec<String>> = None;

            loop {
                ticker.tick().await;

                match self.chain_id().await {
                    Ok(chain) => {
                        if let Some(previous) = &last_chain {
                            if *previous != chain {
                                if let Some(id) = &chain {
                                    info!("Wallet chain changed to {}", id);
                                    self.events.emit(ProviderEvent::ChainChanged(id.clone()));
                                }
                            }
                        }
                        last_chain = Some(chain);
                    }
                    Err(e) => debug!("Chain poll failed: {}", e),
                }

                match self.authorized_accounts().await {
                    Ok(accounts) => {
                        if let Some(previous) = &last_accounts {
                            if *previous != accounts {
                                info!("Wallet accounts changed ({} account(s))", accounts.len());
                                self.events.emit(ProviderEvent::AccountsChanged(accounts.clone()));
                            }
                        }
                        last_accounts = Some(accounts);
                    }
                    Err(e) => debug!("Accounts poll failed: {}", e),
                }
            }
        });

        TaskGuard::new(handle)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn selected_address(&self) -> Result<Option<String>, WalletError> {
        Ok(self.authorized_accounts().await?.into_iter().next())
    }

    async fn chain_id(&self) -> Result<Option<String>, WalletError> {
        self.call::<Option<String>>("eth_chainId", json!([])).await
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let accounts = self.call::<Vec<String>>("eth_requestAccounts", json!([])).await?;
        self.authorized.store(!accounts.is_empty(), Ordering::SeqCst);
        Ok(accounts)
    }

    async fn balance(&self, address: &str) -> Result<Option<String>, WalletError> {
        self.call::<Option<String>>("eth_getBalance", json!([address, "latest"])).await
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        let _: Value = self
            .call("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await?;
        Ok(())
    }

    async fn terminate(&self) -> Result<(), WalletError> {
        if self.authorized.swap(false, Ordering::SeqCst) {
            info!("Wallet provider session terminated");
        } else {
            debug!("Terminate called without an authorized session");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
