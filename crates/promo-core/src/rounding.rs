//! # Rounding
//!
//! The engine never rounds by itself. Every unrounded candidate amount goes
//! through a [`RoundingPolicy`] supplied by the host, together with the
//! host's [`RoundingConfig`] for that amount.
//!
//! ## Cash Rounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CashRounding (reference policy)                                        │
//! │                                                                         │
//! │  raw 19.973  ── decimals = 2 ──────────────────►  19.97                 │
//! │                                                                         │
//! │  raw 19.973  ── decimals = 2, interval = 0.05 ──►  19.95                │
//! │              (19.973 / 0.05 = 399.46 → 399 × 0.05)                      │
//! │                                                                         │
//! │  raw 19.973  ── decimals = 0 ──────────────────►  20.00                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, MINOR_UNIT_DECIMALS};

/// Rounds a raw decimal amount (major units) into Money.
pub trait RoundingPolicy {
    /// Rounds `amount` according to `config`.
    fn round(&self, amount: Decimal, config: &RoundingConfig) -> CoreResult<Money>;
}

impl<T: RoundingPolicy + ?Sized> RoundingPolicy for &T {
    fn round(&self, amount: Decimal, config: &RoundingConfig) -> CoreResult<Money> {
        (**self).round(amount, config)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// How midpoints and remainders are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.5 rounds away from zero (commercial rounding).
    #[default]
    HalfUp,
    /// 0.5 rounds to the nearest even digit (bankers rounding).
    HalfEven,
    /// Always towards zero.
    Down,
    /// Always away from zero.
    Up,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
        }
    }
}

/// Rounding settings of the host for one kind of amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingConfig {
    /// Decimal places to keep. Values above the minor unit precision are capped.
    pub decimals: u32,

    /// Cash rounding interval in major units, e.g. `0.05`.
    pub interval: Option<Decimal>,

    /// Midpoint handling.
    pub mode: RoundingMode,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        RoundingConfig {
            decimals: MINOR_UNIT_DECIMALS,
            interval: None,
            mode: RoundingMode::HalfUp,
        }
    }
}

impl RoundingConfig {
    /// Plain rounding to the given number of decimal places.
    pub fn with_decimals(decimals: u32) -> Self {
        RoundingConfig {
            decimals,
            ..Self::default()
        }
    }

    /// Cash rounding to the given interval.
    pub fn cash(interval: Decimal) -> Self {
        RoundingConfig {
            interval: Some(interval),
            ..Self::default()
        }
    }
}

// =============================================================================
// Cash Rounding
// =============================================================================

/// Reference [`RoundingPolicy`]: decimal places plus an optional cash interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashRounding;

impl CashRounding {
    /// Creates the policy.
    pub fn new() -> Self {
        CashRounding
    }
}

impl RoundingPolicy for CashRounding {
    fn round(&self, amount: Decimal, config: &RoundingConfig) -> CoreResult<Money> {
        let strategy = config.mode.strategy();
        let decimals = config.decimals.min(MINOR_UNIT_DECIMALS);
        let minor_unit = Decimal::new(1, MINOR_UNIT_DECIMALS);

        let mut value = amount;

        if let Some(interval) = config.interval.filter(|i| *i != minor_unit) {
            if interval <= Decimal::ZERO {
                return Err(CoreError::Rounding {
                    reason: format!("cash rounding interval must be positive, got {}", interval),
                });
            }

            let units = value
                .checked_div(interval)
                .ok_or_else(|| CoreError::Rounding {
                    reason: format!("{} / {} overflows", value, interval),
                })?
                .round_dp_with_strategy(0, strategy);

            value = units.checked_mul(interval).ok_or_else(|| CoreError::Rounding {
                reason: format!("{} × {} overflows", units, interval),
            })?;
        }

        Money::from_decimal(value.round_dp_with_strategy(decimals, strategy))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn round(amount: Decimal, config: RoundingConfig) -> i64 {
        CashRounding::new().round(amount, &config).unwrap().cents()
    }

    #[test]
    fn test_default_rounds_to_cents() {
        assert_eq!(round(dec!(4.00), RoundingConfig::default()), 400);
        assert_eq!(round(dec!(19.973), RoundingConfig::default()), 1997);
        assert_eq!(round(dec!(0.825), RoundingConfig::default()), 83);
    }

    #[test]
    fn test_half_even() {
        let config = RoundingConfig {
            mode: RoundingMode::HalfEven,
            ..RoundingConfig::default()
        };
        assert_eq!(round(dec!(0.825), config), 82);
        assert_eq!(round(dec!(0.835), config), 84);
    }

    #[test]
    fn test_down_and_up() {
        let down = RoundingConfig {
            mode: RoundingMode::Down,
            ..RoundingConfig::default()
        };
        let up = RoundingConfig {
            mode: RoundingMode::Up,
            ..RoundingConfig::default()
        };
        assert_eq!(round(dec!(1.239), down), 123);
        assert_eq!(round(dec!(1.231), up), 124);
    }

    #[test]
    fn test_fewer_decimals() {
        assert_eq!(round(dec!(19.973), RoundingConfig::with_decimals(0)), 2000);
        assert_eq!(round(dec!(19.94), RoundingConfig::with_decimals(1)), 1990);
    }

    #[test]
    fn test_more_decimals_are_capped() {
        assert_eq!(round(dec!(1.23456), RoundingConfig::with_decimals(4)), 123);
    }

    #[test]
    fn test_cash_interval() {
        assert_eq!(round(dec!(19.973), RoundingConfig::cash(dec!(0.05))), 1995);
        assert_eq!(round(dec!(19.975), RoundingConfig::cash(dec!(0.05))), 2000);
        assert_eq!(round(dec!(3.40), RoundingConfig::cash(dec!(0.50))), 350);
    }

    #[test]
    fn test_minor_unit_interval_is_plain_rounding() {
        assert_eq!(round(dec!(1.234), RoundingConfig::cash(dec!(0.01))), 123);
    }

    #[test]
    fn test_invalid_interval() {
        let err = CashRounding::new()
            .round(dec!(1.00), &RoundingConfig::cash(dec!(0)))
            .unwrap_err();
        assert!(matches!(err, CoreError::Rounding { .. }));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RoundingConfig = serde_json::from_str(r#"{"interval":"0.05"}"#).unwrap();
        assert_eq!(config.decimals, 2);
        assert_eq!(config.interval, Some(dec!(0.05)));
        assert_eq!(config.mode, RoundingMode::HalfUp);
    }
}
