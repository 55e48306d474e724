//! Configuration loading: optional TOML file overlaid by `GAS_GLANCE_*` env vars

use std::env;

use config::{Config, Environment, File};

use gas_core::GasGlanceConfig;

pub const DEFAULT_CONFIG_PATH: &str = "gas-glance.toml";

/// Load from the file named by `GAS_GLANCE_CONFIG` (default `gas-glance.toml`)
pub fn load() -> anyhow::Result<GasGlanceConfig> {
    let path = env::var("GAS_GLANCE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from(&path)
}

pub fn load_from(path: &str) -> anyhow::Result<GasGlanceConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("GAS_GLANCE").try_parsing(true))
        .build()?;

    let config: GasGlanceConfig = settings.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
