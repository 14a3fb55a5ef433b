use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Address, StoreError};

/// The one storage key holding the last connected address.
pub const ADDRESS_KEY: &str = "eth_id";

/// Persistent slot for the last connected account address.
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn load(&self) -> Result<Option<Address>, StoreError>;
    async fn save(&self, address: &Address) -> Result<(), StoreError>;
    async fn remove(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryAddressStore {
    slot: RwLock<Option<Address>>,
}

impl MemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn load(&self) -> Result<Option<Address>, StoreError> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, address: &Address) -> Result<(), StoreError> {
        *self.slot.write().await = Some(address.clone());
        Ok(())
    }

    async fn remove(&self) -> Result<(), StoreError> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// Keeps `{"eth_id": "<address>"}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileAddressStore {
    path: PathBuf,
}

impl FileAddressStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AddressStore for FileAddressStore {
    async fn load(&self) -> Result<Option<Address>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entries: Map<String, Value> = serde_json::from_str(&contents)?;
        match entries.get(ADDRESS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => Address::parse(raw)
                .map(Some)
                .map_err(|_| StoreError::Corrupt(raw.clone())),
            Some(other) => Err(StoreError::Corrupt(other.to_string())),
        }
    }

    async fn save(&self, address: &Address) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut entries = Map::new();
        entries.insert(ADDRESS_KEY.to_string(), Value::String(address.to_string()));
        let contents = serde_json::to_string_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, contents).await?;

        debug!("Persisted wallet address to {}", self.path.display());
        Ok(())
    }

    async fn remove(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed persisted wallet address at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
