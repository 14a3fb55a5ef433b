use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_cell::router::doctor_routes;
use doctor_cell::services::SearchSession;
use wallet_cell::router::wallet_routes;
use wallet_cell::services::WalletConnection;

pub fn create_router(search: Arc<SearchSession>, wallet: Arc<WalletConnection>) -> Router {
    Router::new()
        .route("/", get(|| async { "Veil patient dashboard API is running!" }))
        .nest("/doctors", doctor_routes(search))
        .nest("/wallet", wallet_routes(wallet))
}
