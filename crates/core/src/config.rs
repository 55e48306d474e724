//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{CoreError, CoreResult, EndpointDescriptor, EndpointRegistry, FeeUnit};

/// Complete service configuration
///
/// Every field has a default, so an empty file (or no file at all) yields the
/// built-in registry with standard timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasGlanceConfig {
    /// Chains to query; empty means the built-in registry
    pub chains: Vec<EndpointDescriptor>,
    pub query_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub fee_unit: FeeUnit,
}

impl Default for GasGlanceConfig {
    fn default() -> Self {
        Self {
            chains: vec![],
            query_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            fee_unit: FeeUnit::Gwei,
        }
    }
}

impl GasGlanceConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.query_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig("query_timeout_ms must be > 0".into()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig("connect_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn registry(&self) -> CoreResult<EndpointRegistry> {
        if self.chains.is_empty() {
            Ok(EndpointRegistry::builtin())
        } else {
            EndpointRegistry::new(self.chains.clone())
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_builtin_registry() {
        let config = GasGlanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry().unwrap(), EndpointRegistry::builtin());
        assert_eq!(config.query_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GasGlanceConfig = serde_json::from_str(
            r#"{"chains":[{"chain":"alpha","url":"http://127.0.0.1:1"}],"fee_unit":"ether"}"#,
        )
        .unwrap();

        assert_eq!(config.fee_unit, FeeUnit::Ether);
        assert_eq!(config.connect_timeout_ms, 5_000);
        let registry = config.registry().unwrap();
        assert_eq!(registry.chains().collect::<Vec<_>>(), vec!["alpha"]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = GasGlanceConfig {
            query_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }
}
