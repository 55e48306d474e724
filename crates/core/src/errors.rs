//! Error types

use thiserror::Error;

/// Registry and configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Chain {0} registered more than once")]
    DuplicateChain(String),

    #[error("Chain identifier must not be empty")]
    EmptyChainId,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Aggregation errors and per-chain failure conditions
///
/// Only `InvalidState` is ever returned from a query; the other variants are
/// conditions that get logged while the affected chain is left out of the
/// result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Endpoint unreachable for {chain}: {reason}")]
    EndpointUnreachable { chain: String, reason: String },

    #[error("Client not found for chain: {0}")]
    ClientNotFound(String),

    #[error("Fee query failed for {chain}: {reason}")]
    QueryFailed { chain: String, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
}

impl FeedError {
    pub fn unreachable(chain: &str, reason: impl ToString) -> Self {
        FeedError::EndpointUnreachable {
            chain: chain.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn query_failed(chain: &str, reason: impl ToString) -> Self {
        FeedError::QueryFailed {
            chain: chain.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FeedError::query_failed("bsc", "connection refused");
        assert_eq!(err.to_string(), "Fee query failed for bsc: connection refused");
        assert_eq!(
            FeedError::InvalidState("aggregator disposed").to_string(),
            "Invalid state: aggregator disposed"
        );
        assert_eq!(
            CoreError::DuplicateChain("alpha".into()).to_string(),
            "Chain alpha registered more than once"
        );
    }
}
