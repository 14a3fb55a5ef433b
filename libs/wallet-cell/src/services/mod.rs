pub mod json_rpc;
pub mod lifecycle;
pub mod notifier;
pub mod provider;
pub mod store;

pub use json_rpc::JsonRpcProvider;
pub use lifecycle::{AddressListener, WalletConnection};
pub use notifier::Notifier;
pub use provider::{ProviderEvents, TaskGuard, WalletProvider};
pub use store::{AddressStore, FileAddressStore, MemoryAddressStore, ADDRESS_KEY};
