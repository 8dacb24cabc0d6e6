use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::blockchain::traits::{RpcClient, TransactionParams};
use crate::core::errors::{RpcError, WalletError};

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// JSON-RPC client for a Solana node over reqwest.
pub struct SolanaRpcClient {
    http: reqwest::Client,
    url: reqwest::Url,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self, WalletError> {
        let rpc_url_clean = rpc_url.trim();
        let url = reqwest::Url::parse(rpc_url_clean).map_err(|e| {
            WalletError::Config(format!("invalid solana rpc url '{}': {}", rpc_url_clean, e))
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build http client: {}", e)))?;

        info!(url = %url, "Configured Solana rpc client");
        Ok(Self { http, url, next_id: AtomicU64::new(1) })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(method, id, "Solana rpc call");

        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("{} returned http {}", method, status)));
        }

        let envelope: JsonRpcResponse =
            response.json().await.map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        if let Some(err) = envelope.error {
            return Err(RpcError::Rejected(format!("{} (code {})", err.message, err.code)));
        }
        envelope
            .result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl RpcClient for SolanaRpcClient {
    async fn get_balance(&self, address: &str) -> Result<Value, RpcError> {
        self.call("getBalance", json!([address, { "commitment": "confirmed" }])).await
    }

    async fn get_transaction_params(&self, _address: &str) -> Result<TransactionParams, RpcError> {
        let result =
            self.call("getLatestBlockhash", json!([{ "commitment": "finalized" }])).await?;
        let recent_blockhash = result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::InvalidResponse("missing value.blockhash".into()))?;
        Ok(TransactionParams::Solana { recent_blockhash: recent_blockhash.to_string() })
    }

    async fn submit(&self, signed: &[u8]) -> Result<String, RpcError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(signed);
        let result = self
            .call("sendTransaction", json!([encoded, { "encoding": "base64" }]))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::InvalidResponse(format!("expected signature, got {}", result)))
    }
}
