//! # Decision Configuration
//!
//! Resolves the engine settings from a host [`ConfigProvider`].
//!
//! ## Keys and Defaults
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Key (under SalesDiscount.config.)   Type        Default                │
//! │  ─────────────────────────────────   ─────────   ───────────            │
//! │  nthStep                             integer     5      (≤ 0 → 1)       │
//! │  nthGroupBy                          string      label  (refId | type)  │
//! │  percentThreshold                    decimal     100.00                 │
//! │  percentValue                        decimal %   10.0   (< 0 → 0)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Providers hand back raw values (strings, numbers). Coercion and defaults
//! live here so every backend behaves the same. A value that cannot be
//! coerced is logged and replaced by its default.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::CoreResult;
use crate::types::{DiscountRate, GroupBy};

/// Raw configuration value as returned by a provider.
pub type ConfigValue = serde_json::Value;

/// Namespace prefixed to every configuration key.
pub const CONFIG_NAMESPACE: &str = "SalesDiscount.config";

/// Step size N of "every Nth unit free".
pub const NTH_STEP: &str = "nthStep";
/// Grouping mode of the "every Nth free" rule.
pub const NTH_GROUP_BY: &str = "nthGroupBy";
/// Subtotal that must be exceeded for the percentage discount.
pub const PERCENT_THRESHOLD: &str = "percentThreshold";
/// Percentage rate.
pub const PERCENT_VALUE: &str = "percentValue";

pub const DEFAULT_NTH_STEP: i64 = 5;
/// 100.00 in major currency units.
pub const DEFAULT_PERCENT_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 2);
pub const DEFAULT_PERCENT_VALUE_BPS: u32 = 1_000;

/// Returns the fully qualified key for a setting name.
pub fn config_key(name: &str) -> String {
    format!("{}.{}", CONFIG_NAMESPACE, name)
}

// =============================================================================
// Provider Contract
// =============================================================================

/// Looks up configuration values per sales channel.
///
/// Failures are returned as [`CoreError::ConfigProvider`](crate::CoreError)
/// and propagate to the caller untouched.
pub trait ConfigProvider {
    /// Returns the raw value for `key` in `channel_id`, or `None` if unset.
    fn get(&self, key: &str, channel_id: &str) -> CoreResult<Option<ConfigValue>>;
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for &T {
    fn get(&self, key: &str, channel_id: &str) -> CoreResult<Option<ConfigValue>> {
        (**self).get(key, channel_id)
    }
}

// =============================================================================
// Decision Config
// =============================================================================

/// Snapshot of the engine settings for one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionConfig {
    /// N of "every Nth unit free". Always ≥ 1 after resolution.
    pub step: i64,

    /// How items are grouped before counting units.
    pub group_by: GroupBy,

    /// Subtotal that must be strictly exceeded.
    pub threshold: Decimal,

    /// Percentage applied to the subtotal.
    pub rate: DiscountRate,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        DecisionConfig {
            step: DEFAULT_NTH_STEP,
            group_by: GroupBy::default(),
            threshold: DEFAULT_PERCENT_THRESHOLD,
            rate: DiscountRate::from_bps(DEFAULT_PERCENT_VALUE_BPS),
        }
    }
}

impl DecisionConfig {
    /// Reads all settings for a channel, applying defaults and coercion.
    pub fn resolve<P>(provider: &P, channel_id: &str) -> CoreResult<Self>
    where
        P: ConfigProvider + ?Sized,
    {
        let defaults = Self::default();

        let step = lookup(provider, NTH_STEP, channel_id)?
            .map(|value| coerce_or_default(NTH_STEP, &value, coerce_integer, defaults.step))
            .unwrap_or(defaults.step)
            .max(1);

        let group_by = lookup(provider, NTH_GROUP_BY, channel_id)?
            .and_then(|value| coerce_string(&value))
            .map(|raw| GroupBy::from_str(&raw).unwrap_or_default())
            .unwrap_or(defaults.group_by);

        let threshold = lookup(provider, PERCENT_THRESHOLD, channel_id)?
            .map(|value| {
                coerce_or_default(
                    PERCENT_THRESHOLD,
                    &value,
                    coerce_decimal,
                    defaults.threshold,
                )
            })
            .unwrap_or(defaults.threshold);

        let rate = lookup(provider, PERCENT_VALUE, channel_id)?
            .map(|value| {
                coerce_or_default(
                    PERCENT_VALUE,
                    &value,
                    |v| coerce_decimal(v).map(DiscountRate::from_percentage),
                    defaults.rate,
                )
            })
            .unwrap_or(defaults.rate)
            .max(DiscountRate::zero());

        let config = DecisionConfig {
            step,
            group_by,
            threshold,
            rate,
        };

        debug!(
            channel_id,
            step = config.step,
            group_by = %config.group_by,
            threshold = %config.threshold,
            rate = %config.rate,
            "Resolved discount configuration"
        );

        Ok(config)
    }
}

fn lookup<P>(provider: &P, name: &str, channel_id: &str) -> CoreResult<Option<ConfigValue>>
where
    P: ConfigProvider + ?Sized,
{
    let value = provider.get(&config_key(name), channel_id)?;
    Ok(value.filter(|v| !v.is_null()))
}

fn coerce_or_default<T, F>(name: &str, value: &ConfigValue, coerce: F, default: T) -> T
where
    T: std::fmt::Debug,
    F: FnOnce(&ConfigValue) -> Option<T>,
{
    coerce(value).unwrap_or_else(|| {
        warn!(key = name, %value, ?default, "Unusable configuration value, using default");
        default
    })
}

// =============================================================================
// Coercion
// =============================================================================

/// Integer from a number or numeric string; fractions are truncated.
pub fn coerce_integer(value: &ConfigValue) -> Option<i64> {
    match value {
        ConfigValue::Number(n) => n
            .as_i64()
            .or_else(|| coerce_decimal(value).and_then(|d| d.trunc().try_into().ok())),
        ConfigValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| Decimal::from_str(s).ok().and_then(|d| d.trunc().try_into().ok()))
        }
        _ => None,
    }
}

/// Decimal from a number or numeric string.
pub fn coerce_decimal(value: &ConfigValue) -> Option<Decimal> {
    let raw = match value {
        ConfigValue::Number(n) => n.to_string(),
        ConfigValue::String(s) => s.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

/// String from a string or number.
pub fn coerce_string(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::String(s) => Some(s.clone()),
        ConfigValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// In-Memory Provider
// =============================================================================

/// [`ConfigProvider`] backed by maps: global values plus per-channel overrides.
///
/// Names passed to the setters are namespaced automatically, so
/// `with(NTH_STEP, 5)` answers lookups for `SalesDiscount.config.nthStep`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfig {
    global: HashMap<String, ConfigValue>,
    channels: HashMap<String, HashMap<String, ConfigValue>>,
}

impl InMemoryConfig {
    /// Creates an empty provider (every lookup returns `None`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a global value, builder style.
    pub fn with(mut self, name: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a global value.
    pub fn set(&mut self, name: &str, value: impl Into<ConfigValue>) {
        self.global.insert(config_key(name), value.into());
    }

    /// Sets a value for one channel only.
    pub fn set_for_channel(&mut self, channel_id: &str, name: &str, value: impl Into<ConfigValue>) {
        self.channels
            .entry(channel_id.to_string())
            .or_default()
            .insert(config_key(name), value.into());
    }
}

impl ConfigProvider for InMemoryConfig {
    fn get(&self, key: &str, channel_id: &str) -> CoreResult<Option<ConfigValue>> {
        let value = self
            .channels
            .get(channel_id)
            .and_then(|values| values.get(key))
            .or_else(|| self.global.get(key))
            .cloned();

        Ok(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
