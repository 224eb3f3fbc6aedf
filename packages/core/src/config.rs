//! Core configuration
//!
//! Runtime knobs shared by the codec, filter compiler and item service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest precision a Decimal field may declare
///
/// Decimal values are persisted as a signed 64-bit mantissa, which holds any
/// 18-digit number.
pub const MAX_DECIMAL_PRECISION: u32 = 18;

/// Configuration for the core data layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Upper bound for a single adapter lookup, in milliseconds
    pub adapter_timeout_ms: u64,

    /// Precision used for Decimal fields that do not declare one
    pub default_decimal_precision: u32,

    /// Scale used for Decimal fields that do not declare one
    pub default_decimal_scale: u32,

    /// Maximum number of elements accepted by `_in` / `_not_in`
    pub max_in_list_len: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: 10_000,
            default_decimal_precision: MAX_DECIMAL_PRECISION,
            default_decimal_scale: 4,
            max_in_list_len: 1_000,
        }
    }
}

impl CoreConfig {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.adapter_timeout_ms == 0 {
            return Err("adapter_timeout_ms must be greater than 0".to_string());
        }

        if self.default_decimal_precision == 0 {
            return Err("default_decimal_precision must be greater than 0".to_string());
        }

        if self.default_decimal_precision > MAX_DECIMAL_PRECISION {
            return Err(format!(
                "default_decimal_precision cannot exceed {}",
                MAX_DECIMAL_PRECISION
            ));
        }

        if self.default_decimal_scale > self.default_decimal_precision {
            return Err(
                "default_decimal_scale cannot exceed default_decimal_precision".to_string(),
            );
        }

        if self.max_in_list_len == 0 {
            return Err("max_in_list_len must be greater than 0".to_string());
        }

        Ok(())
    }
}
