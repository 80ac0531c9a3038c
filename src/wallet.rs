//! Solana wallet probes: configured agent address and SOL balance lookups
//! over JSON-RPC.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid wallet keypair: {0}")]
    InvalidKeypair(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
}

/// Check that `address` is a base58 ed25519 public key.
pub fn validate_address(address: &str) -> Result<String, WalletError> {
    let address = address.trim();
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| WalletError::InvalidAddress(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(WalletError::InvalidAddress(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(address.to_string())
}

/// Public address of a Solana keypair given as base58 or as the CLI's JSON
/// byte array. The keypair is 64 bytes: secret half then public half.
pub fn address_from_keypair(secret: &str) -> Result<String, WalletError> {
    let secret = secret.trim();
    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret).map_err(|e| WalletError::InvalidKeypair(e.to_string()))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?
    };
    if bytes.len() != 64 {
        return Err(WalletError::InvalidKeypair(format!(
            "expected 64 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bs58::encode(&bytes[32..]).into_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletBalance {
    pub address: String,
    pub lamports: u64,
    pub sol: f64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BalanceResult>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

pub struct WalletProbe {
    client: Client,
    rpc_url: String,
    address: Option<String>,
}

impl WalletProbe {
    pub fn new(rpc_url: &str, address: Option<String>) -> Result<Self, WalletError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            address,
        })
    }

    /// The agent wallet address, if one is configured.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[instrument(skip(self))]
    pub async fn balance(&self, address: &str) -> Result<WalletBalance, WalletError> {
        let address = validate_address(address)?;
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [address],
        });

        let response = self.client.post(&self.rpc_url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(WalletError::InvalidResponse(format!(
                "RPC returned status {}",
                response.status()
            )));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(WalletError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let lamports = body
            .result
            .map(|r| r.value)
            .ok_or_else(|| WalletError::InvalidResponse("missing result".to_string()))?;
        debug!("balance for {}: {} lamports", address, lamports);

        Ok(WalletBalance {
            address,
            lamports,
            sol: lamports as f64 / LAMPORTS_PER_SOL,
        })
    }
}
