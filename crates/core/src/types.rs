//! Core type definitions

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a raw base-unit fee is scaled into for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeUnit {
    Wei,
    #[default]
    Gwei,
    Ether,
}

impl FeeUnit {
    pub fn decimals(&self) -> u8 {
        match self {
            FeeUnit::Wei => 0,
            FeeUnit::Gwei => 9,
            FeeUnit::Ether => 18,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeeUnit::Wei => "wei",
            FeeUnit::Gwei => "gwei",
            FeeUnit::Ether => "ether",
        }
    }
}

impl fmt::Display for FeeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shift a base-unit integer `decimals` places to the right.
///
/// The result is exact: trailing fractional zeros are trimmed but at least
/// one fractional digit is kept, so `1_000_000_000` at 9 decimals is `"1.0"`.
/// With 0 decimals the integer is returned unchanged.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        format!("{}.0", int_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Raw fee reading reported by one endpoint, in base units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeData {
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl FeeData {
    /// Priority fee assumed when the endpoint does not report one (1 gwei)
    pub const DEFAULT_PRIORITY_FEE: u64 = 1_000_000_000;

    pub fn legacy(gas_price: Option<U256>) -> Self {
        Self {
            gas_price,
            ..Default::default()
        }
    }

    /// Build from the legacy gas price, the latest block's base fee and the
    /// reported priority fee
    pub fn from_base_fee(
        gas_price: Option<U256>,
        base_fee: Option<U256>,
        priority_fee: Option<U256>,
    ) -> Self {
        let Some(base_fee) = base_fee else {
            return Self::legacy(gas_price);
        };

        let priority = priority_fee.unwrap_or(U256::from(Self::DEFAULT_PRIORITY_FEE));
        Self {
            gas_price,
            max_fee_per_gas: Some(base_fee.saturating_mul(U256::from(2u8)).saturating_add(priority)),
            max_priority_fee_per_gas: Some(priority),
        }
    }

    pub fn supports_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some()
    }
}

/// Normalized, timestamped fee snapshot for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecord {
    pub chain: String,
    pub fee_value: String,
    pub observed_at_ms: u64,
}

impl FeeRecord {
    pub fn new(chain: impl Into<String>, fee: &FeeData, unit: FeeUnit, observed_at_ms: u64) -> Self {
        let fee_value = match fee.gas_price {
            Some(raw) => format_units(raw, unit.decimals()),
            None => "0".to_string(),
        };

        Self {
            chain: chain.into(),
            fee_value,
            observed_at_ms,
        }
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
