use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{ProviderEvent, WalletError};

/// EIP-1193 style wallet provider.
///
/// Values come back raw (as the provider reports them); callers validate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Currently authorized account, if any.
    async fn selected_address(&self) -> Result<Option<String>, WalletError>;

    async fn chain_id(&self) -> Result<Option<String>, WalletError>;

    /// `eth_requestAccounts`
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Balance of `address` as reported by the provider (hex wei).
    async fn balance(&self, address: &str) -> Result<Option<String>, WalletError>;

    /// `wallet_switchEthereumChain` with `[{ chainId }]`
    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError>;

    /// Ends the provider-side session.
    async fn terminate(&self) -> Result<(), WalletError>;

    /// New receiver for `accountsChanged` / `chainChanged` notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Broadcast hub a provider publishes its change events on.
#[derive(Debug, Clone)]
pub struct ProviderEvents {
    sender: broadcast::Sender<ProviderEvent>,
}

impl ProviderEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many subscribers received the event.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(e) => {
                debug!("No subscribers for provider event {:?}", e.0);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProviderEvents {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Owns a background task and aborts it when dropped.
#[derive(Debug)]
pub struct TaskGuard {
    handle: JoinHandle<()>,
}

impl TaskGuard {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
