use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use doctor_cell::services::SearchSession;
use shared_config::AppConfig;
use wallet_cell::models::{Address, TargetNetworks};
use wallet_cell::services::{
    AddressStore, FileAddressStore, JsonRpcProvider, MemoryAddressStore, Notifier,
    WalletConnection, WalletProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Veil patient dashboard API");

    // Load configuration
    let config = AppConfig::from_env();

    let search = Arc::new(SearchSession::new(&config)?);

    // Wallet provider, optional: no RPC URL means no wallet installed
    let rpc_provider = JsonRpcProvider::from_config(&config).map(Arc::new);
    let _watcher = rpc_provider
        .clone()
        .map(|p| p.spawn_watcher(config.wallet_poll_interval));
    let provider = rpc_provider.map(|p| p as Arc<dyn WalletProvider>);

    let store: Arc<dyn AddressStore> = match &config.wallet_address_store_path {
        Some(path) => Arc::new(FileAddressStore::new(path)),
        None => Arc::new(MemoryAddressStore::new()),
    };
    if let Ok(Some(previous)) = store.load().await {
        info!("Last connected wallet address: {}", previous);
    }

    let wallet = WalletConnection::mount(
        provider,
        store,
        TargetNetworks::from_config(&config.wallet_target_chains),
        Notifier::new(),
    )
    .await
    .with_address_listener(Arc::new(|address: &Address| {
        info!("Wallet address bound to patient session: {}", address);
    }));
    let wallet = Arc::new(wallet);

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(search.clone(), wallet.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    wallet.unmount();
    search.close();
    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
