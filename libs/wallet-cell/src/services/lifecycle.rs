use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::models::{
    Address, ChainId, Notification, ProviderEvent, TargetNetworks, WalletError, WalletSession,
    WalletSnapshot, WalletStatus,
};
use crate::services::notifier::Notifier;
use crate::services::provider::{TaskGuard, WalletProvider};
use crate::services::store::AddressStore;

/// Parent-owned callback receiving the address resolved by `connect`.
pub type AddressListener = Arc<dyn Fn(&Address) + Send + Sync>;

struct SessionState {
    session: RwLock<WalletSession>,
    networks: TargetNetworks,
    mounted: AtomicBool,
}

impl SessionState {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    async fn status(&self) -> WalletStatus {
        self.session.read().await.status(&self.networks)
    }

    async fn apply_event(&self, event: ProviderEvent) -> WalletStatus {
        if !self.is_mounted() {
            debug!("Ignoring provider event after unmount: {:?}", event);
            return WalletStatus::Disconnected;
        }

        let mut session = self.session.write().await;
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    if session.connected() {
                        info!("Wallet reported no accounts, disconnecting");
                    }
                    session.reset();
                }
                Some(raw) => match Address::parse(raw) {
                    Ok(account) => {
                        info!("Account changed: {}", account);
                        session.set_account(account);
                    }
                    Err(e) => warn!("Ignoring accountsChanged event: {}", e),
                },
            },
            ProviderEvent::ChainChanged(raw) => match ChainId::parse(&raw) {
                Ok(chain_id) => {
                    debug!("Chain changed: {}", chain_id);
                    session.set_chain(Some(chain_id));
                }
                Err(e) => warn!("Ignoring chainChanged event: {}", e),
            },
        }

        session.status(&self.networks)
    }
}

/// Holds the `connecting` flag for the duration of one connect attempt.
struct ConnectingGuard<'a>(&'a AtomicBool);

impl<'a> ConnectingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn fetch_balance(provider: &dyn WalletProvider, account: &Address) -> Option<String> {
    match provider.balance(account.as_str()).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("Failed to read wallet balance: {}", e);
            None
        }
    }
}

/// Wallet connect widget state machine:
/// `Disconnected` / `ConnectedWrongNetwork` / `ConnectedOnTargetNetwork`.
///
/// Mounting subscribes to provider events; unmounting (or dropping) stops
/// the listener. Results of provider calls that complete after unmount are
/// dropped.
pub struct WalletConnection {
    provider: Option<Arc<dyn WalletProvider>>,
    store: Arc<dyn AddressStore>,
    notifier: Notifier,
    state: Arc<SessionState>,
    address_listener: Option<AddressListener>,
    listener: Mutex<Option<TaskGuard>>,
    connecting: AtomicBool,
}

impl WalletConnection {
    /// Builds the widget state from what the provider currently reports and
    /// starts listening for its change events. A missing provider simply
    /// leaves the widget `Disconnected`.
    pub async fn mount(
        provider: Option<Arc<dyn WalletProvider>>,
        store: Arc<dyn AddressStore>,
        networks: TargetNetworks,
        notifier: Notifier,
    ) -> Self {
        let state = Arc::new(SessionState {
            session: RwLock::new(WalletSession::disconnected()),
            networks,
            mounted: AtomicBool::new(true),
        });

        let listener = provider.as_ref().map(|p| {
            let mut events = p.subscribe();
            let state = state.clone();
            TaskGuard::new(tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            state.apply_event(event).await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Wallet event listener lagged, skipped {} event(s)", skipped);
                        }
                        Err(RecvError::Closed) => {
                            debug!("Wallet provider event stream closed");
                            break;
                        }
                    }
                }
            }))
        });

        let connection = Self {
            provider,
            store,
            notifier,
            state,
            address_listener: None,
            listener: Mutex::new(listener),
            connecting: AtomicBool::new(false),
        };

        if connection.provider.is_some() {
            connection.refresh().await;
        } else {
            debug!("No wallet provider present, starting disconnected");
        }

        info!("Wallet widget mounted with status {:?}", connection.status().await);
        connection
    }

    /// Registers the parent callback that receives the connected address.
    pub fn with_address_listener(mut self, listener: AddressListener) -> Self {
        self.address_listener = Some(listener);
        self
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn networks(&self) -> &TargetNetworks {
        &self.state.networks
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.state.is_mounted()
    }

    pub async fn status(&self) -> WalletStatus {
        self.state.status().await
    }

    pub async fn session(&self) -> WalletSession {
        self.state.session.read().await.clone()
    }

    /// True while a connect request is waiting on the provider.
    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> WalletSnapshot {
        let mut snapshot = self.state.session.read().await.snapshot(&self.state.networks);
        snapshot.connecting = self.is_connecting();
        snapshot
    }

    /// Applies one provider event. The mounted listener calls this for every
    /// event it receives.
    pub async fn handle_event(&self, event: ProviderEvent) -> WalletStatus {
        self.state.apply_event(event).await
    }

    /// Asks the provider for account access and, on success, records the
    /// first account, persists it, hands it to the address listener and
    /// raises the "connected" toast. Only one connect runs at a time.
    pub async fn connect(&self) -> Result<WalletStatus, WalletError> {
        let Some(provider) = self.provider.clone() else {
            return Err(self.report(WalletError::ProviderUnavailable).await);
        };

        let Some(_connecting) = ConnectingGuard::acquire(&self.connecting) else {
            debug!("Connect requested while another connect is pending");
            return Err(WalletError::ConnectInProgress);
        };

        let requested = provider.request_accounts().await;
        self.ensure_mounted()?;
        let accounts = match requested {
            Ok(accounts) => accounts,
            Err(e) => return Err(self.report(e).await),
        };

        let Some(first) = accounts.first() else {
            return Err(self.report(WalletError::NoAccounts).await);
        };
        let account = match Address::parse(first) {
            Ok(account) => account,
            Err(e) => return Err(self.report(e).await),
        };

        let chain_id = match provider.chain_id().await {
            Ok(raw) => raw.and_then(|c| ChainId::parse(&c).ok()),
            Err(e) => {
                warn!("Could not read chain id after connecting: {}", e);
                None
            }
        };
        let balance = fetch_balance(provider.as_ref(), &account).await;
        self.ensure_mounted()?;

        let status = {
            let mut session = self.state.session.write().await;
            session.connect(account.clone(), chain_id);
            session.set_balance(balance);
            session.status(&self.state.networks)
        };

        info!("Public address: {}", account);

        if let Err(e) = self.store.save(&account).await {
            warn!("Failed to persist wallet address: {}", e);
        }
        if let Some(listener) = &self.address_listener {
            listener(&account);
        }
        self.notifier.notify(Notification::connected(&account)).await;

        Ok(status)
    }

    /// Ends the provider session and forgets the persisted address.
    /// Best effort: always ends `Disconnected`.
    pub async fn disconnect(&self) -> WalletStatus {
        if let Some(provider) = &self.provider {
            if let Err(e) = provider.terminate().await {
                warn!("Wallet provider terminate failed: {}", e);
            }
        }

        if let Err(e) = self.store.remove().await {
            warn!("Failed to remove persisted wallet address: {}", e);
        }

        self.state.session.write().await.reset();
        info!("Wallet disconnected");

        WalletStatus::Disconnected
    }

    /// Requests a switch to the primary target chain, then re-reads the
    /// provider state. On failure the state is left as it was.
    pub async fn switch_network(&self) -> Result<WalletStatus, WalletError> {
        let Some(provider) = self.provider.clone() else {
            warn!("Network switch requested without a wallet provider");
            return Err(WalletError::ProviderUnavailable);
        };

        let Some(target) = self.state.networks.primary().cloned() else {
            return Err(self.report(WalletError::NoTargetNetwork).await);
        };

        let switched = provider.switch_chain(target.as_str()).await;
        self.ensure_mounted()?;
        if let Err(e) = switched {
            error!("Failed to switch chain to {}: {}", target, e);
            return Err(self.report(e).await);
        }

        info!("Switched wallet network to {}", target);
        Ok(self.refresh().await)
    }

    /// Re-reads the selected address and chain from the provider.
    /// Connected exactly when the provider reports a selected address.
    pub async fn refresh(&self) -> WalletStatus {
        let Some(provider) = self.provider.clone() else {
            return self.status().await;
        };

        let chain_id = match provider.chain_id().await {
            Ok(raw) => raw.and_then(|c| match ChainId::parse(&c) {
                Ok(chain_id) => Some(chain_id),
                Err(e) => {
                    warn!("Provider reported {}", e);
                    None
                }
            }),
            Err(e) => {
                warn!("Failed to read wallet chain id: {}", e);
                return self.status().await;
            }
        };

        let selected = match provider.selected_address().await {
            Ok(selected) => selected,
            Err(e) => {
                warn!("Failed to read selected wallet address: {}", e);
                return self.status().await;
            }
        };

        let account = match selected.as_deref().map(Address::parse) {
            Some(Ok(account)) => Some(account),
            Some(Err(e)) => {
                warn!("Provider reported {}", e);
                None
            }
            None => None,
        };
        let balance = match &account {
            Some(account) => fetch_balance(provider.as_ref(), account).await,
            None => None,
        };

        if !self.is_mounted() {
            debug!("Discarding wallet refresh after unmount");
            return WalletStatus::Disconnected;
        }

        let mut session = self.state.session.write().await;
        session.set_chain(chain_id);
        match account {
            Some(account) => {
                session.set_account(account);
                session.set_balance(balance);
            }
            None => session.reset(),
        }
        session.status(&self.state.networks)
    }

    /// Stops listening to the provider. Later events and late provider
    /// responses no longer touch the session.
    pub fn unmount(&self) {
        self.state.mounted.store(false, Ordering::SeqCst);
        let guard = match self.listener.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(guard);
        info!("Wallet widget unmounted");
    }

    fn ensure_mounted(&self) -> Result<(), WalletError> {
        if self.is_mounted() {
            Ok(())
        } else {
            debug!("Wallet widget unmounted while a request was in flight");
            Err(WalletError::Unmounted)
        }
    }

    /// Logs a failed user action and raises the matching notification.
    async fn report(&self, err: WalletError) -> WalletError {
        let notification = match &err {
            WalletError::ProviderUnavailable => {
                warn!("Connect attempted without a wallet provider");
                Notification::alert(
                    "Wallet not installed!",
                    "Install a browser wallet to connect your account.",
                )
            }
            WalletError::UserRejected(reason) => {
                warn!("Wallet request rejected by user: {}", reason);
                Notification::warning("Request rejected", "The wallet request was declined.")
            }
            WalletError::NoAccounts => {
                error!("No accounts found.");
                Notification::warning("No accounts found", "The wallet returned no accounts.")
            }
            other => {
                warn!("Wallet action failed: {}", other);
                Notification::warning("Wallet error", &other.to_string())
            }
        };

        self.notifier.notify(notification).await;
        err
    }
}
