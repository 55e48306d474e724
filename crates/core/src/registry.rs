//! Endpoint registry: the fixed, ordered set of supported chains

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Compiled-in chains, in declaration order
const BUILTIN_ENDPOINTS: &[(&str, &str)] = &[
    ("ethereum", "https://eth.llamarpc.com"),
    ("polygon", "https://polygon.llamarpc.com"),
    ("bsc", "https://binance.llamarpc.com"),
    ("arbitrum", "https://arbitrum.llamarpc.com"),
];

/// Chain identifier bound to an RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub chain: String,
    pub url: String,
}

impl EndpointDescriptor {
    pub fn new(chain: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            url: url.into(),
        }
    }
}

/// Immutable ordered association list of chain -> endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    entries: Vec<EndpointDescriptor>,
}

impl EndpointRegistry {
    /// Build from caller-supplied descriptors, keeping their order
    pub fn new(entries: Vec<EndpointDescriptor>) -> CoreResult<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entry.chain.trim().is_empty() {
                return Err(CoreError::EmptyChainId);
            }
            if entries[..i].iter().any(|e| e.chain == entry.chain) {
                return Err(CoreError::DuplicateChain(entry.chain.clone()));
            }
        }

        Ok(Self { entries })
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ENDPOINTS
                .iter()
                .map(|(chain, url)| EndpointDescriptor::new(*chain, *url))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[EndpointDescriptor] {
        &self.entries
    }

    pub fn get(&self, chain: &str) -> Option<&EndpointDescriptor> {
        self.entries.iter().find(|e| e.chain == chain)
    }

    pub fn contains(&self, chain: &str) -> bool {
        self.get(chain).is_some()
    }

    pub fn chains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.chain.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
