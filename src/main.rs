use lnledger::lnmarkets::LnMarketsClient;
use lnledger::vault::store::SqliteStore;
use lnledger::vault::CredentialVault;
use lnledger::{api, config::Config, LnMarketsApi};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize the vault store and dependencies
    let store = match SqliteStore::open(&config.database_path).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize vault store: {}", e);
            std::process::exit(1);
        }
    };

    let vault = CredentialVault::new(Arc::new(store), config.app_secret.clone());
    let client: Arc<dyn LnMarketsApi> = Arc::new(LnMarketsClient::with_base_urls(
        config.mainnet_api_url.clone(),
        config.testnet_api_url.clone(),
        Duration::from_secs(config.http_timeout_secs),
    ));

    // Create router
    let app = api::create_router(api::AppState { vault, api: client });

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
