//! Multi-chain gas price aggregator
//!
//! Features:
//! - One JSON-RPC client per registered chain
//! - Concurrent fan-out with per-chain timeouts
//! - Partial-failure tolerance: unreachable chains are dropped, not raised
//! - Results in registry order
//! - Best-effort, idempotent client disposal

pub mod aggregator;
pub mod client;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{AggregatorConfig, AggregatorState, AggregatorStatus, DisposeSummary, GasAggregator};
pub use client::{ClientConnector, ClientError, FeeClient, HttpConnector, JsonRpcClient};
