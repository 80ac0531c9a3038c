use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::routes::AppState;
use crate::config::Config;

/// Which optional integrations are configured. Values are never exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    pub database: bool,
    pub openai: bool,
    pub coingecko_api_key: bool,
    pub top_agents: bool,
    pub wallet: bool,
    pub auth_verification_key: bool,
}

impl ConfigStatus {
    pub fn from_config(config: &Config) -> Self {
        Self {
            database: config.database.url.is_some(),
            openai: config.chat.openai_api_key.is_some(),
            coingecko_api_key: config.prices.coingecko_api_key.is_some(),
            top_agents: config.agents.url.is_some(),
            wallet: config.wallet.address.is_some() || config.wallet.private_key.is_some(),
            auth_verification_key: config.auth.verification_key.is_some(),
        }
    }
}

/// GET /api/config/status
pub async fn get_status(State(state): State<AppState>) -> Json<ConfigStatus> {
    Json(state.status)
}
