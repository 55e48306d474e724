//! Gas price aggregator - fans one fee query out per chain

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use gas_core::{
    now_ms, EndpointRegistry, FeeRecord, FeeUnit, FeedError, FeedResult, GasGlanceConfig,
};

use crate::client::{ClientConnector, FeeClient, HttpConnector};

/// Aggregator configuration
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on a single chain's fee query
    pub query_timeout: Duration,
    pub connect_timeout: Duration,
    pub fee_unit: FeeUnit,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            fee_unit: FeeUnit::Gwei,
        }
    }
}

impl From<&GasGlanceConfig> for AggregatorConfig {
    fn from(config: &GasGlanceConfig) -> Self {
        Self {
            query_timeout: config.query_timeout(),
            connect_timeout: config.connect_timeout(),
            fee_unit: config.fee_unit,
        }
    }
}

/// Lifecycle of an aggregator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Ready,
    Disposed,
}

struct ClientSlot {
    chain: String,
    client: Arc<dyn FeeClient>,
}

struct Inner {
    state: AggregatorState,
    clients: Vec<ClientSlot>,
}

impl Inner {
    fn ensure_ready(&self) -> FeedResult<()> {
        match self.state {
            AggregatorState::Ready => Ok(()),
            AggregatorState::Disposed => Err(FeedError::InvalidState("aggregator disposed")),
        }
    }

    fn client(&self, chain: &str) -> Option<Arc<dyn FeeClient>> {
        self.clients
            .iter()
            .find(|slot| slot.chain == chain)
            .map(|slot| Arc::clone(&slot.client))
    }
}

/// Multi-chain gas price aggregator
///
/// Owns one client per registry entry that connected successfully. Queries
/// tolerate per-chain failure: a chain that cannot be reached is left out of
/// the result instead of failing the call. Once [`dispose`](Self::dispose)
/// has run, every query returns [`FeedError::InvalidState`].
pub struct GasAggregator {
    registry: EndpointRegistry,
    config: AggregatorConfig,
    inner: RwLock<Inner>,
    last_observed_ms: AtomicU64,
}

impl GasAggregator {
    /// Build with JSON-RPC over HTTP clients
    pub fn new(registry: EndpointRegistry, config: AggregatorConfig) -> Self {
        Self::with_connector(registry, config, &HttpConnector)
    }

    pub fn with_connector<C>(registry: EndpointRegistry, config: AggregatorConfig, connector: &C) -> Self
    where
        C: ClientConnector + ?Sized,
    {
        let mut clients = Vec::with_capacity(registry.len());

        for endpoint in registry.entries() {
            match connector.connect(endpoint, &config) {
                Ok(client) => {
                    debug!("Initialized client for {} at {}", endpoint.chain, client.endpoint());
                    clients.push(ClientSlot {
                        chain: endpoint.chain.clone(),
                        client,
                    });
                }
                Err(e) => {
                    error!("{}", FeedError::unreachable(&endpoint.chain, e));
                }
            }
        }

        info!(
            "Gas aggregator ready: {}/{} chains live",
            clients.len(),
            registry.len()
        );

        Self {
            registry,
            config,
            inner: RwLock::new(Inner {
                state: AggregatorState::Ready,
                clients,
            }),
            last_observed_ms: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Query a single chain
    ///
    /// Returns `Ok(None)` when the chain has no live client or its query
    /// fails; both conditions are logged.
    pub async fn query_one(&self, chain: &str) -> FeedResult<Option<FeeRecord>> {
        let client = {
            let inner = self.inner.read();
            inner.ensure_ready()?;
            inner.client(chain)
        };

        Ok(self.fetch(chain, client).await)
    }

    /// Query every registered chain concurrently
    ///
    /// The result holds the successful records in registry order.
    pub async fn query_all(&self) -> FeedResult<Vec<FeeRecord>> {
        let targets: Vec<(&str, Option<Arc<dyn FeeClient>>)> = {
            let inner = self.inner.read();
            inner.ensure_ready()?;
            self.registry
                .chains()
                .map(|chain| (chain, inner.client(chain)))
                .collect()
        };

        // join_all yields outcomes in input order, not completion order
        let outcomes = join_all(
            targets
                .into_iter()
                .map(|(chain, client)| self.fetch(chain, client)),
        )
        .await;

        let records: Vec<FeeRecord> = outcomes.into_iter().flatten().collect();
        debug!(
            "Fee pass complete: {}/{} chains reported",
            records.len(),
            self.registry.len()
        );

        Ok(records)
    }

    async fn fetch(&self, chain: &str, client: Option<Arc<dyn FeeClient>>) -> Option<FeeRecord> {
        let Some(client) = client else {
            warn!("{}", FeedError::ClientNotFound(chain.to_string()));
            return None;
        };

        match tokio::time::timeout(self.config.query_timeout, client.fee_data()).await {
            Ok(Ok(fee)) => Some(FeeRecord::new(chain, &fee, self.config.fee_unit, self.stamp())),
            Ok(Err(e)) => {
                warn!("{}", FeedError::query_failed(chain, e));
                None
            }
            Err(_) => {
                warn!(
                    "{}",
                    FeedError::query_failed(
                        chain,
                        format!("timed out after {:?}", self.config.query_timeout)
                    )
                );
                None
            }
        }
    }

    /// Wall-clock millis, never lower than a previously issued stamp
    fn stamp(&self) -> u64 {
        let now = now_ms();
        let prev = self.last_observed_ms.fetch_max(now, Ordering::AcqRel);
        prev.max(now)
    }

    /// Release every client handle
    ///
    /// Best effort: a handle that fails to close is logged and the rest are
    /// still closed. Calling this again is a no-op.
    pub async fn dispose(&self) -> DisposeSummary {
        let clients = {
            let mut inner = self.inner.write();
            if inner.state == AggregatorState::Disposed {
                debug!("Gas aggregator already disposed");
                return DisposeSummary::default();
            }
            inner.state = AggregatorState::Disposed;
            std::mem::take(&mut inner.clients)
        };

        let mut summary = DisposeSummary::default();

        for slot in clients {
            match slot.client.close().await {
                Ok(()) => summary.released.push(slot.chain),
                Err(e) => {
                    error!("Error disposing client for {}: {}", slot.chain, e);
                    summary.failed.push(slot.chain);
                }
            }
        }

        info!(
            "Gas aggregator disposed: {} released, {} failed",
            summary.released.len(),
            summary.failed.len()
        );

        summary
    }

    /// Chains holding a live client, in registry order
    pub fn live_chains(&self) -> Vec<String> {
        let inner = self.inner.read();
        self.registry
            .chains()
            .filter(|chain| inner.clients.iter().any(|slot| slot.chain == *chain))
            .map(str::to_string)
            .collect()
    }

    pub fn status(&self) -> AggregatorStatus {
        let inner = self.inner.read();

        AggregatorStatus {
            state: inner.state,
            registered: self.registry.len(),
            live_clients: inner.clients.len(),
        }
    }
}

/// Outcome of [`GasAggregator::dispose`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisposeSummary {
    pub released: Vec<String>,
    pub failed: Vec<String>,
}

impl DisposeSummary {
    pub fn is_empty(&self) -> bool {
        self.released.is_empty() && self.failed.is_empty()
    }
}

/// Aggregator status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorStatus {
    pub state: AggregatorState,
    pub registered: usize,
    pub live_clients: usize,
}
