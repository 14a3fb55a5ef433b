use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::lifecycle::WalletConnection;

pub fn wallet_routes(state: Arc<WalletConnection>) -> Router {
    Router::new()
        .route("/", get(handlers::get_wallet))
        .route("/connect", post(handlers::connect_wallet))
        .route("/disconnect", post(handlers::disconnect_wallet))
        .route("/switch-network", post(handlers::switch_network))
        .route("/notifications", get(handlers::list_notifications))
        .with_state(state)
}
