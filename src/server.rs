//! Wiring: build shared state from configuration and serve the router.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::api::auth::TokenVerifier;
use crate::api::routes::{app_router, cors_layer, AppState};
use crate::api::status::ConfigStatus;
use crate::chat::ChatRelay;
use crate::config::{Config, ServerConfig};
use crate::persistence::{create_pool_and_migrate, MemoryStore, PgStore, TradeStore};
use crate::prices::{CoinGeckoClient, PriceService, TopAgentsService};
use crate::wallet::{address_from_keypair, validate_address, WalletProbe};

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store: Arc<dyn TradeStore> = match &config.database.url {
        Some(url) => {
            let pool = create_pool_and_migrate(url, config.database.max_connections)
                .await
                .context("failed to connect to database")?;
            tracing::info!("using PostgreSQL store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, trades are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let coingecko = CoinGeckoClient::new(
        &config.prices.coingecko_url,
        config.prices.coingecko_api_key.clone(),
    )?;
    let prices = PriceService::new(
        Arc::new(coingecko),
        config.prices.cache_ttl,
        config.prices.retry,
    );
    let agents = TopAgentsService::new(
        config.agents.url.clone(),
        config.agents.cache_ttl,
        config.prices.retry,
    )?;

    let chat = ChatRelay::new(
        config.chat.openai_api_key.clone(),
        &config.chat.openai_base_url,
        &config.chat.model,
    )?;
    if !chat.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set, chat will answer with a notice");
    }

    let wallet_address = match (&config.wallet.address, &config.wallet.private_key) {
        (Some(address), _) => Some(validate_address(address).context("WALLET_ADDRESS")?),
        (None, Some(secret)) => Some(address_from_keypair(secret).context("WALLET_PRIVATE_KEY")?),
        (None, None) => None,
    };
    let wallet = WalletProbe::new(&config.wallet.rpc_url, wallet_address)?;

    let verifier = TokenVerifier::from_config(&config.auth).context("invalid auth verification key")?;

    Ok(AppState {
        store,
        prices: Arc::new(prices),
        agents: Arc::new(agents),
        chat: Arc::new(chat),
        wallet: Arc::new(wallet),
        verifier: Arc::new(verifier),
        status: ConfigStatus::from_config(config),
    })
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = app_router(state).layer(cors_layer(&config.server.cors_origins));

    let listener = bind(&config.server).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

/// Bind `HOST:PORT`. The host may be a name; it is resolved by tokio.
pub async fn bind(server: &ServerConfig) -> anyhow::Result<TcpListener> {
    TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", server.host, server.port))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal, cleaning up...");
}
