//! Configuration module for environment variables and application settings

use std::str::FromStr;
use std::time::Duration;

use crate::prices::RetryPolicy;

const DEV_JWT_SECRET: &str = "dev-jwt-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be set: {reason}")]
    Missing { key: &'static str, reason: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub prices: PriceConfig,
    pub agents: AgentsConfig,
    pub chat: ChatConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// None runs with the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// Falls back to a development secret only when no database is configured.
    pub jwt_secret: String,
    /// ES256 PEM key from the identity provider; takes precedence over the secret.
    pub verification_key: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("verification_key", &self.verification_key.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PriceConfig {
    pub coingecko_url: String,
    pub coingecko_api_key: Option<String>,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct AgentsConfig {
    pub url: Option<String>,
    pub cache_ttl: Duration,
}

#[derive(Clone)]
pub struct ChatConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone)]
pub struct WalletConfig {
    pub rpc_url: String,
    pub address: Option<String>,
    pub private_key: Option<String>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("rpc_url", &self.rpc_url)
            .field("address", &self.address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL");
        let verification_key = get("AUTH_VERIFICATION_KEY").map(|k| k.replace("\\n", "\n"));

        // With a verification key the secret is never used for verification.
        let jwt_secret = match (get("AUTH_JWT_SECRET"), &verification_key) {
            (Some(secret), _) => secret,
            (None, Some(_)) => DEV_JWT_SECRET.to_string(),
            (None, None) if database_url.is_some() => {
                return Err(ConfigError::Missing {
                    key: "AUTH_JWT_SECRET",
                    reason: "required with DATABASE_URL unless AUTH_VERIFICATION_KEY is set",
                });
            }
            (None, None) => {
                tracing::warn!("AUTH_JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&get, "PORT", 3000)?,
                cors_origins: get("CORS_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(|o| o.trim().to_string())
                            .filter(|o| !o.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            },
            auth: AuthConfig {
                jwt_secret,
                verification_key,
                issuer: get("AUTH_ISSUER"),
                audience: get("AUTH_AUDIENCE"),
            },
            prices: PriceConfig {
                coingecko_url: get("COINGECKO_API_URL")
                    .unwrap_or_else(|| "https://api.coingecko.com/api/v3".to_string()),
                coingecko_api_key: get("COINGECKO_API_KEY"),
                cache_ttl: Duration::from_secs(parse_or(&get, "PRICE_CACHE_TTL_SECS", 300)?),
                retry: RetryPolicy {
                    max_attempts: parse_or(&get, "PRICE_RETRY_ATTEMPTS", 3)?,
                    backoff: Duration::from_millis(parse_or(&get, "PRICE_RETRY_BACKOFF_MS", 1_000)?),
                    rate_limit_backoff: Duration::from_millis(parse_or(
                        &get,
                        "PRICE_RATE_LIMIT_BACKOFF_MS",
                        5_000,
                    )?),
                },
            },
            agents: AgentsConfig {
                url: get("TOP_AGENTS_URL"),
                cache_ttl: Duration::from_secs(parse_or(&get, "TOP_AGENTS_CACHE_TTL_SECS", 300)?),
            },
            chat: ChatConfig {
                openai_api_key: get("OPENAI_API_KEY"),
                openai_base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            },
            wallet: WalletConfig {
                rpc_url: get("SOLANA_RPC_URL")
                    .unwrap_or_else(|| "https://api.mainnet-beta.solana.com".to_string()),
                address: get("WALLET_ADDRESS"),
                private_key: get("WALLET_PRIVATE_KEY"),
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.url.is_none());
        assert_eq!(config.prices.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.prices.retry, RetryPolicy::default());
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert!(config.server.cors_origins.is_empty());
    }

    #[test]
    fn reads_overrides_and_treats_blank_as_unset() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("PRICE_CACHE_TTL_SECS", "60"),
            ("OPENAI_API_KEY", "   "),
            ("CORS_ORIGINS", "http://localhost:3001, https://app.example.com"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.prices.cache_ttl, Duration::from_secs(60));
        assert!(config.chat.openai_api_key.is_none());
        assert_eq!(
            config.server.cors_origins,
            vec!["http://localhost:3001", "https://app.example.com"]
        );
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = config_from(&[("PRICE_RETRY_ATTEMPTS", "three")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PRICE_RETRY_ATTEMPTS", .. }));
    }

    #[test]
    fn database_without_jwt_secret_is_rejected() {
        let err = config_from(&[("DATABASE_URL", "postgres://localhost/trades")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "AUTH_JWT_SECRET", .. }));

        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/trades"),
            ("AUTH_JWT_SECRET", "prod-secret"),
        ])
        .unwrap();
        assert_eq!(config.auth.jwt_secret, "prod-secret");
    }

    #[test]
    fn verification_key_stands_in_for_jwt_secret() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/trades"),
            ("AUTH_VERIFICATION_KEY", "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----"),
        ])
        .unwrap();
        assert_eq!(
            config.auth.verification_key.as_deref(),
            Some("-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----")
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret"), ("AUTH_JWT_SECRET", "s3cr3t")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("s3cr3t"));
    }
}
