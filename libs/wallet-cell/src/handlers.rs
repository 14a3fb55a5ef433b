use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::WalletError;
use crate::services::lifecycle::WalletConnection;

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::ProviderUnavailable | WalletError::Unmounted => {
                AppError::Unavailable(err.to_string())
            }
            WalletError::UserRejected(_) | WalletError::NoAccounts => {
                AppError::BadRequest(err.to_string())
            }
            WalletError::ConnectInProgress => AppError::Conflict(err.to_string()),
            WalletError::NoTargetNetwork | WalletError::Store(_) => {
                AppError::Internal(err.to_string())
            }
            WalletError::InvalidAddress(_)
            | WalletError::InvalidChainId(_)
            | WalletError::Rpc { .. }
            | WalletError::Transport(_) => AppError::ExternalService(err.to_string()),
        }
    }
}

async fn snapshot_body(connection: &WalletConnection) -> Value {
    json!({ "wallet": connection.snapshot().await })
}

#[axum::debug_handler]
pub async fn get_wallet(
    State(connection): State<Arc<WalletConnection>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(snapshot_body(&connection).await))
}

#[axum::debug_handler]
pub async fn connect_wallet(
    State(connection): State<Arc<WalletConnection>>,
) -> Result<Json<Value>, AppError> {
    connection.connect().await?;
    Ok(Json(snapshot_body(&connection).await))
}

#[axum::debug_handler]
pub async fn disconnect_wallet(
    State(connection): State<Arc<WalletConnection>>,
) -> Result<Json<Value>, AppError> {
    connection.disconnect().await;
    Ok(Json(snapshot_body(&connection).await))
}

#[axum::debug_handler]
pub async fn switch_network(
    State(connection): State<Arc<WalletConnection>>,
) -> Result<Json<Value>, AppError> {
    connection.switch_network().await?;
    Ok(Json(snapshot_body(&connection).await))
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(connection): State<Arc<WalletConnection>>,
) -> Result<Json<Value>, AppError> {
    let notifications = connection.notifier().history().await;

    Ok(Json(json!({
        "notifications": notifications,
        "total": notifications.len()
    })))
}
