//! Shared fixtures: JSON-RPC mock responders and fake fee clients

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gas_core::{EndpointDescriptor, FeeData};

use crate::aggregator::AggregatorConfig;
use crate::client::{ClientConnector, ClientError, FeeClient};

pub(crate) fn rpc_result(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

pub(crate) fn rpc_error(code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
}

/// Answer every POST whose JSON-RPC `method` is `rpc_method`
pub(crate) async fn mount_rpc(server: &MockServer, rpc_method: &str, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer any POST not matched by a `mount_rpc` responder
pub(crate) async fn mount_fallback(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .with_priority(10)
        .mount(server)
        .await;
}

/// URL of a server that has already shut down
pub(crate) async fn refused_url() -> String {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    uri
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    Respond { gas_price: Option<u64>, latency: Duration },
    Fail,
    Hang,
}

#[derive(Debug)]
pub(crate) struct FakeClient {
    url: String,
    behavior: Behavior,
    fail_close: bool,
    pub calls: AtomicUsize,
    pub closes: AtomicUsize,
}

impl FakeClient {
    pub fn new(url: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            behavior,
            fail_close: false,
            calls: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn responding(url: &str, gwei: u64, latency_ms: u64) -> Arc<Self> {
        Self::new(
            url,
            Behavior::Respond {
                gas_price: Some(gwei * 1_000_000_000),
                latency: Duration::from_millis(latency_ms),
            },
        )
    }

    pub fn failing_close(url: &str) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            behavior: Behavior::Respond { gas_price: Some(1), latency: Duration::ZERO },
            fail_close: true,
            calls: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FeeClient for FakeClient {
    async fn fee_data(&self) -> Result<FeeData, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Respond { gas_price, latency } => {
                tokio::time::sleep(latency).await;
                Ok(FeeData::legacy(gas_price.map(U256::from)))
            }
            Behavior::Fail => Err(ClientError::Status(502)),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                Err(ClientError::Closed)
            }
        }
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(ClientError::MalformedResponse("close failed".into()));
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Hands out pre-built fake clients by URL; unknown URLs fail to connect
#[derive(Default)]
pub(crate) struct FakeConnector {
    clients: Vec<Arc<FakeClient>>,
}

impl FakeConnector {
    pub fn new(clients: Vec<Arc<FakeClient>>) -> Self {
        Self { clients }
    }
}

impl ClientConnector for FakeConnector {
    fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        _config: &AggregatorConfig,
    ) -> Result<Arc<dyn FeeClient>, ClientError> {
        self.clients
            .iter()
            .find(|c| c.url == endpoint.url)
            .map(|c| Arc::clone(c) as Arc<dyn FeeClient>)
            .ok_or_else(|| ClientError::InvalidUrl {
                url: endpoint.url.clone(),
                reason: "no route".into(),
            })
    }
}
