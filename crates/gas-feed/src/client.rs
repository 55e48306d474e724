//! Fee clients: one connection handle per chain endpoint

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::U256;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use gas_core::{EndpointDescriptor, FeeData};

use crate::aggregator::AggregatorConfig;

/// Client-level failures
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {0}")]
    Status(u16),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Client closed")]
    Closed,
}

/// A live handle that can read the current fee level of one chain
#[async_trait::async_trait]
pub trait FeeClient: Send + Sync {
    async fn fee_data(&self) -> Result<FeeData, ClientError>;

    /// Release the underlying connection. Closing twice is an error.
    async fn close(&self) -> Result<(), ClientError>;

    fn endpoint(&self) -> &str;
}

/// Builds a client handle for an endpoint
pub trait ClientConnector: Send + Sync {
    fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        config: &AggregatorConfig,
    ) -> Result<Arc<dyn FeeClient>, ClientError>;
}

/// Connector producing JSON-RPC over HTTP(S) clients
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl ClientConnector for HttpConnector {
    fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        config: &AggregatorConfig,
    ) -> Result<Arc<dyn FeeClient>, ClientError> {
        Ok(Arc::new(JsonRpcClient::connect(endpoint, config)?))
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeader {
    #[serde(default)]
    base_fee_per_gas: Option<String>,
}

/// Ethereum JSON-RPC client bound to a single endpoint
#[derive(Debug)]
pub struct JsonRpcClient {
    chain: String,
    url: Url,
    http: reqwest::Client,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl JsonRpcClient {
    pub fn connect(
        endpoint: &EndpointDescriptor,
        config: &AggregatorConfig,
    ) -> Result<Self, ClientError> {
        let url = Url::parse(&endpoint.url).map_err(|e| ClientError::InvalidUrl {
            url: endpoint.url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme(url.scheme().to_string()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.query_timeout)
            .build()?;

        Ok(Self {
            chain: endpoint.chain.clone(),
            url,
            http,
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self.http.post(self.url.clone()).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(format!("{}: {}", method, e)))?;

        if let Some(err) = body.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        serde_json::from_value(body.result)
            .map_err(|e| ClientError::MalformedResponse(format!("{}: {}", method, e)))
    }

    async fn quantity(&self, method: &str) -> Result<Option<U256>, ClientError> {
        let raw = self.call::<Option<String>>(method, json!([])).await?;
        raw.as_deref().map(parse_quantity).transpose()
    }

    fn optional(&self, reading: Result<Option<U256>, ClientError>, method: &str) -> Option<U256> {
        reading.unwrap_or_else(|e| {
            debug!("{} {} unavailable: {}", self.chain, method, e);
            None
        })
    }
}

#[async_trait::async_trait]
impl FeeClient for JsonRpcClient {
    /// Only the latest block is required; a failed or unparsable gas price
    /// or priority fee reading becomes `None`.
    async fn fee_data(&self) -> Result<FeeData, ClientError> {
        let (gas_price, block, priority_fee) = tokio::join!(
            self.quantity("eth_gasPrice"),
            self.call::<Option<BlockHeader>>("eth_getBlockByNumber", json!(["latest", false])),
            self.quantity("eth_maxPriorityFeePerGas"),
        );

        let block = block?;
        let base_fee = block.and_then(|b| b.base_fee_per_gas);
        let base_fee = base_fee.as_deref().map(parse_quantity).transpose()?;

        let gas_price = self.optional(gas_price, "eth_gasPrice");
        let priority_fee = self.optional(priority_fee, "eth_maxPriorityFeePerGas");

        debug!(
            "{} gas_price={:?} base_fee={:?} priority_fee={:?}",
            self.chain, gas_price, base_fee, priority_fee
        );

        Ok(FeeData::from_base_fee(gas_price, base_fee, priority_fee))
    }

    async fn close(&self) -> Result<(), ClientError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Closed);
        }
        debug!("Closed client for {}", self.chain);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        self.url.as_str()
    }
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_quantity(raw: &str) -> Result<U256, ClientError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| ClientError::MalformedResponse(format!("quantity without 0x prefix: {}", raw)))?;

    if digits.is_empty() {
        return Err(ClientError::MalformedResponse("empty quantity".into()));
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| ClientError::MalformedResponse(format!("bad quantity {}: {}", raw, e)))
}
