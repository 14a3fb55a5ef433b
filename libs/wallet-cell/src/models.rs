use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]+$").expect("hex pattern is valid"))
}

// ==============================================================================
// ADDRESS / CHAIN ID
// ==============================================================================

/// A `0x`-prefixed, non-empty hex account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, WalletError> {
        let trimmed = raw.trim();
        if hex_pattern().is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(WalletError::InvalidAddress(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 15 characters followed by `...`, as shown in the connect toast.
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(15).collect();
        format!("{}...", head)
    }
}

impl TryFrom<String> for Address {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `0x`-prefixed hex chain id, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    pub fn parse(raw: &str) -> Result<Self, WalletError> {
        let trimmed = raw.trim();
        if hex_pattern().is_match(trimmed) {
            Ok(Self(trimmed.to_lowercase()))
        } else {
            Err(WalletError::InvalidChainId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChainId {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChainId::parse(&value)
    }
}

impl From<ChainId> for String {
    fn from(chain_id: ChainId) -> Self {
        chain_id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==============================================================================
// TARGET NETWORKS
// ==============================================================================

/// Chains the application treats as its intended network.
/// The first entry is the one `switch_network` asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNetworks {
    chains: Vec<ChainId>,
}

impl TargetNetworks {
    pub fn new(chains: Vec<ChainId>) -> Self {
        Self { chains }
    }

    /// Builds the list from raw config values, skipping malformed entries.
    pub fn from_config(raw: &[String]) -> Self {
        let chains = raw
            .iter()
            .filter_map(|value| match ChainId::parse(value) {
                Ok(chain) => Some(chain),
                Err(_) => {
                    warn!("Ignoring malformed target chain id: {}", value);
                    None
                }
            })
            .collect();
        Self { chains }
    }

    pub fn primary(&self) -> Option<&ChainId> {
        self.chains.first()
    }

    pub fn contains(&self, chain_id: Option<&ChainId>) -> bool {
        chain_id.is_some_and(|c| self.chains.contains(c))
    }

    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }
}

impl Default for TargetNetworks {
    fn default() -> Self {
        Self::from_config(&["0x539".to_string(), "0x7a69".to_string()])
    }
}

// ==============================================================================
// SESSION
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    Disconnected,
    ConnectedWrongNetwork,
    ConnectedOnTargetNetwork,
}

impl WalletStatus {
    pub fn is_connected(&self) -> bool {
        !matches!(self, WalletStatus::Disconnected)
    }
}

/// Connection state of one mounted wallet widget.
///
/// Connected exactly when an account is held, so a connected session
/// always carries a well-formed address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    chain_id: Option<ChainId>,
    account: Option<Address>,
    balance: Option<String>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn chain_id(&self) -> Option<&ChainId> {
        self.chain_id.as_ref()
    }

    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    pub fn connect(&mut self, account: Address, chain_id: Option<ChainId>) {
        self.set_account(account);
        if chain_id.is_some() {
            self.chain_id = chain_id;
        }
    }

    pub fn set_account(&mut self, account: Address) {
        if self.account.as_ref() != Some(&account) {
            self.balance = None;
        }
        self.account = Some(account);
    }

    pub fn set_chain(&mut self, chain_id: Option<ChainId>) {
        self.chain_id = chain_id;
    }

    /// Ignored while disconnected; a balance always belongs to the held account.
    pub fn set_balance(&mut self, balance: Option<String>) {
        if self.connected() {
            self.balance = balance;
        }
    }

    /// Drops the account and its balance. The last seen chain id is kept.
    pub fn reset(&mut self) {
        self.account = None;
        self.balance = None;
    }

    pub fn status(&self, networks: &TargetNetworks) -> WalletStatus {
        if !self.connected() {
            WalletStatus::Disconnected
        } else if networks.contains(self.chain_id.as_ref()) {
            WalletStatus::ConnectedOnTargetNetwork
        } else {
            WalletStatus::ConnectedWrongNetwork
        }
    }

    pub fn snapshot(&self, networks: &TargetNetworks) -> WalletSnapshot {
        let status = self.status(networks);
        let balance_label = (status == WalletStatus::ConnectedOnTargetNetwork).then(|| {
            self.balance
                .clone()
                .unwrap_or_else(|| BALANCE_UNAVAILABLE.to_string())
        });

        WalletSnapshot {
            status,
            connected: self.connected(),
            connecting: false,
            account: self.account.clone(),
            chain_id: self.chain_id.clone(),
            address_preview: self.account.as_ref().map(Address::preview),
            balance: self.balance.clone(),
            balance_label,
        }
    }
}

pub const BALANCE_UNAVAILABLE: &str = "Balance not available";

/// What the rendering layer needs to draw the wallet button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub status: WalletStatus,
    pub connected: bool,
    /// A connect request is in flight; the connect button is disabled.
    pub connecting: bool,
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub address_preview: Option<String>,
    /// Raw provider balance (hex wei) of the connected account.
    pub balance: Option<String>,
    /// Balance tooltip text, only shown on a target network.
    pub balance_label: Option<String>,
}

// ==============================================================================
// PROVIDER EVENTS
// ==============================================================================

/// Change notifications pushed by a wallet provider. Values are raw and
/// validated by whoever applies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}

// ==============================================================================
// NOTIFICATIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Toast,
    /// Blocking dialog the user has to dismiss.
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn build(kind: NotificationKind, level: NotificationLevel, title: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            level,
            title: title.to_string(),
            description: description.to_string(),
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn connected(account: &Address) -> Self {
        let mut notification = Self::build(
            NotificationKind::Toast,
            NotificationLevel::Success,
            "Wallet connected!",
            &format!("address: {}", account.preview()),
        );
        notification.action = Some(NotificationAction::Logout);
        notification
    }

    pub fn alert(title: &str, description: &str) -> Self {
        Self::build(NotificationKind::Alert, NotificationLevel::Error, title, description)
    }

    pub fn warning(title: &str, description: &str) -> Self {
        Self::build(NotificationKind::Toast, NotificationLevel::Warning, title, description)
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet not installed!")]
    ProviderUnavailable,

    #[error("User rejected the request: {0}")]
    UserRejected(String),

    #[error("No accounts found")]
    NoAccounts,

    #[error("A wallet connection request is already in progress")]
    ConnectInProgress,

    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("No target network configured")]
    NoTargetNetwork,

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet transport error: {0}")]
    Transport(String),

    #[error("Address store error: {0}")]
    Store(#[from] StoreError),

    #[error("Wallet widget is no longer mounted")]
    Unmounted,
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        WalletError::Transport(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored address is malformed: {0}")]
    Corrupt(String),
}
