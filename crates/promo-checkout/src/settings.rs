//! # Discount Settings
//!
//! File-backed [`ConfigProvider`] for the discount engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority, every channel)            │
//! │     PROMO_NTH_STEP=3                                                   │
//! │     PROMO_PERCENT_VALUE=12.5                                           │
//! │                                                                         │
//! │  2. Channel table ([channels.<id>] in promo.toml)                      │
//! │                                                                         │
//! │  3. Defaults table ([defaults] in promo.toml)                          │
//! │     ~/.config/promo/promo.toml (Linux)                                 │
//! │                                                                         │
//! │  4. Engine defaults (lowest priority)                                  │
//! │     step 5, by label, threshold 100.00, 10 %                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # promo.toml
//! [defaults]
//! nthStep = 5
//! nthGroupBy = "label"
//! percentThreshold = "100.00"
//! percentValue = 10
//!
//! [channels.outlet]
//! nthStep = 3
//! nthGroupBy = "refId"
//! ```
//!
//! Values may be numbers or numeric strings; coercion happens in the engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use promo_core::config::{
    coerce_decimal, coerce_integer, coerce_string, CONFIG_NAMESPACE, DEFAULT_NTH_STEP,
    DEFAULT_PERCENT_THRESHOLD, NTH_GROUP_BY, NTH_STEP, PERCENT_THRESHOLD, PERCENT_VALUE,
};
use promo_core::{ConfigProvider, ConfigValue, CoreError, CoreResult, GroupBy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult};

/// Settings file name inside the platform config directory.
pub const SETTINGS_FILE_NAME: &str = "promo.toml";

// =============================================================================
// Channel Settings
// =============================================================================

/// One table of settings; every value is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth_step: Option<toml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth_group_by: Option<toml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_threshold: Option<toml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_value: Option<toml::Value>,
}

impl ChannelSettings {
    /// Table holding the engine defaults explicitly.
    pub fn engine_defaults() -> Self {
        ChannelSettings {
            nth_step: Some(toml::Value::Integer(DEFAULT_NTH_STEP)),
            nth_group_by: Some(toml::Value::String(GroupBy::default().to_string())),
            percent_threshold: Some(toml::Value::String(DEFAULT_PERCENT_THRESHOLD.to_string())),
            percent_value: Some(toml::Value::Integer(10)),
        }
    }

    /// Returns the value stored under a setting name.
    pub fn value(&self, name: &str) -> Option<&toml::Value> {
        match name {
            NTH_STEP => self.nth_step.as_ref(),
            NTH_GROUP_BY => self.nth_group_by.as_ref(),
            PERCENT_THRESHOLD => self.percent_threshold.as_ref(),
            PERCENT_VALUE => self.percent_value.as_ref(),
            _ => None,
        }
    }

    fn validate(&self, table: &str) -> CheckoutResult<()> {
        let invalid = |name: &str, reason: &str| {
            CheckoutError::InvalidConfig(format!("[{}] {}: {}", table, name, reason))
        };

        if let Some(value) = self.json(NTH_STEP)? {
            match coerce_integer(&value) {
                Some(step) if step >= 1 => {}
                Some(_) => return Err(invalid(NTH_STEP, "must be at least 1")),
                None => return Err(invalid(NTH_STEP, "must be an integer")),
            }
        }

        if let Some(value) = self.json(NTH_GROUP_BY)? {
            if coerce_string(&value).is_none() {
                return Err(invalid(NTH_GROUP_BY, "must be a string"));
            }
        }

        if let Some(value) = self.json(PERCENT_THRESHOLD)? {
            match coerce_decimal(&value) {
                Some(threshold) if threshold >= Decimal::ZERO => {}
                Some(_) => return Err(invalid(PERCENT_THRESHOLD, "cannot be negative")),
                None => return Err(invalid(PERCENT_THRESHOLD, "must be a number")),
            }
        }

        if let Some(value) = self.json(PERCENT_VALUE)? {
            match coerce_decimal(&value) {
                Some(rate) if rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED => {}
                Some(_) => return Err(invalid(PERCENT_VALUE, "must be between 0 and 100")),
                None => return Err(invalid(PERCENT_VALUE, "must be a number")),
            }
        }

        Ok(())
    }

    fn json(&self, name: &str) -> CheckoutResult<Option<ConfigValue>> {
        self.value(name)
            .map(|value| to_config_value(name, value))
            .transpose()
            .map_err(CheckoutError::from)
    }
}

// =============================================================================
// Discount Settings
// =============================================================================

/// Discount settings for all sales channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSettings {
    /// Values used by every channel without its own override.
    #[serde(default)]
    pub defaults: ChannelSettings,

    /// Per-channel overrides keyed by channel id.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelSettings>,

    /// `PROMO_*` environment overrides; never written back to the file.
    #[serde(skip)]
    pub environment: ChannelSettings,
}

impl Default for DiscountSettings {
    fn default() -> Self {
        DiscountSettings {
            defaults: ChannelSettings::engine_defaults(),
            channels: BTreeMap::new(),
            environment: ChannelSettings::default(),
        }
    }
}

impl DiscountSettings {
    /// Creates settings holding the engine defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from file, with environment overrides.
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let path = config_path.or_else(Self::default_config_path);

        let mut settings = match path {
            Some(ref p) if p.exists() => {
                let contents = std::fs::read_to_string(p)?;
                let settings: DiscountSettings = toml::from_str(&contents)?;
                info!(path = ?p, "Loaded discount settings");
                settings
            }
            _ => {
                debug!("No discount settings file, using defaults");
                Self::default()
            }
        };

        settings.apply_overrides(|name| std::env::var(name).ok());
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults on error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load discount settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves settings to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::InvalidConfig("No settings path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Discount settings saved");
        Ok(())
    }

    /// Validates every table.
    pub fn validate(&self) -> CheckoutResult<()> {
        self.defaults.validate("defaults")?;
        self.environment.validate("environment")?;

        for (channel_id, channel) in &self.channels {
            if channel_id.trim().is_empty() {
                return Err(CheckoutError::InvalidConfig("Channel id cannot be empty".into()));
            }
            channel.validate(&format!("channels.{}", channel_id))?;
        }

        Ok(())
    }

    /// Returns the overrides of a channel, creating an empty table.
    pub fn channel_mut(&mut self, channel_id: &str) -> &mut ChannelSettings {
        self.channels.entry(channel_id.to_string()).or_default()
    }

    /// Reads `PROMO_*` overrides through `var`; they win over every table.
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(step) = var("PROMO_NTH_STEP") {
            match step.trim().parse::<i64>() {
                Ok(s) => {
                    debug!(step = s, "Overriding nth step from environment");
                    self.environment.nth_step = Some(toml::Value::Integer(s));
                }
                Err(_) => warn!(value = %step, "Ignoring non-integer PROMO_NTH_STEP"),
            }
        }

        if let Some(group_by) = var("PROMO_NTH_GROUP_BY") {
            debug!(group_by = %group_by, "Overriding group by from environment");
            self.environment.nth_group_by = Some(toml::Value::String(group_by));
        }

        if let Some(threshold) = var("PROMO_PERCENT_THRESHOLD") {
            debug!(threshold = %threshold, "Overriding percent threshold from environment");
            self.environment.percent_threshold = Some(toml::Value::String(threshold));
        }

        if let Some(value) = var("PROMO_PERCENT_VALUE") {
            debug!(value = %value, "Overriding percent value from environment");
            self.environment.percent_value = Some(toml::Value::String(value));
        }
    }

    /// Gets the default settings file path based on platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "checkout", "promo")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Convenience for loading from an explicit path.
    pub fn from_path(path: &Path) -> CheckoutResult<Self> {
        Self::load(Some(path.to_path_buf()))
    }
}

impl ConfigProvider for DiscountSettings {
    fn get(&self, key: &str, channel_id: &str) -> CoreResult<Option<ConfigValue>> {
        let Some(name) = key
            .strip_prefix(CONFIG_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            return Ok(None);
        };

        let value = self
            .environment
            .value(name)
            .or_else(|| self.channels.get(channel_id).and_then(|channel| channel.value(name)))
            .or_else(|| self.defaults.value(name));

        value.map(|v| to_config_value(key, v)).transpose()
    }
}

fn to_config_value(key: &str, value: &toml::Value) -> CoreResult<ConfigValue> {
    serde_json::to_value(value).map_err(|e| CoreError::config_provider(key, e))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::config::config_key;
    use promo_core::{DecisionConfig, DiscountRate};
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = r#"
[defaults]
nthStep = 5
nthGroupBy = "label"
percentThreshold = "100.00"
percentValue = 10

[channels.outlet]
nthStep = 3
nthGroupBy = "refId"
percentValue = "12.5"
"#;

    fn parse(contents: &str) -> DiscountSettings {
        toml::from_str(contents).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let settings = DiscountSettings::default();
        assert!(settings.validate().is_ok());

        let resolved = DecisionConfig::resolve(&settings, "web").unwrap();
        assert_eq!(resolved, DecisionConfig::default());
    }

    #[test]
    fn test_channel_overrides_defaults() {
        let settings = parse(SAMPLE);

        let outlet = DecisionConfig::resolve(&settings, "outlet").unwrap();
        assert_eq!(outlet.step, 3);
        assert_eq!(outlet.group_by, GroupBy::ReferenceId);
        assert_eq!(outlet.rate, DiscountRate::from_percentage(dec!(12.5)));
        assert_eq!(outlet.threshold, dec!(100));

        let web = DecisionConfig::resolve(&settings, "web").unwrap();
        assert_eq!(web.step, 5);
        assert_eq!(web.group_by, GroupBy::Label);
    }

    #[test]
    fn test_get_ignores_foreign_keys() {
        let settings = parse(SAMPLE);

        assert!(settings.get("Other.config.nthStep", "web").unwrap().is_none());
        assert!(settings.get(&config_key("unknown"), "web").unwrap().is_none());
        assert_eq!(
            settings.get(&config_key(NTH_STEP), "web").unwrap(),
            Some(serde_json::json!(5))
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = DiscountSettings::default();
        settings.channel_mut("web").nth_step = Some(toml::Value::Integer(0));
        assert!(matches!(settings.validate(), Err(CheckoutError::InvalidConfig(_))));

        let mut settings = DiscountSettings::default();
        settings.defaults.percent_value = Some(toml::Value::String("lots".into()));
        assert!(settings.validate().is_err());

        let mut settings = DiscountSettings::default();
        settings.defaults.percent_value = Some(toml::Value::Float(150.0));
        assert!(settings.validate().is_err());

        let mut settings = DiscountSettings::default();
        settings.defaults.percent_threshold = Some(toml::Value::Integer(-1));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_environment_beats_channel_tables() {
        let mut settings = parse(SAMPLE);
        settings.apply_overrides(|name| match name {
            "PROMO_NTH_STEP" => Some("7".to_string()),
            "PROMO_PERCENT_THRESHOLD" => Some("99.995".to_string()),
            _ => None,
        });

        let outlet = DecisionConfig::resolve(&settings, "outlet").unwrap();
        assert_eq!(outlet.step, 7);
        assert_eq!(outlet.threshold, dec!(99.995));
        assert_eq!(outlet.group_by, GroupBy::ReferenceId);

        let web = DecisionConfig::resolve(&settings, "web").unwrap();
        assert_eq!(web.step, 7);
    }

    #[test]
    fn test_environment_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let mut settings = DiscountSettings::default();
        settings.apply_overrides(|name| (name == "PROMO_NTH_STEP").then(|| "2".to_string()));
        settings.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("nthStep = 5"));
    }

    #[test]
    fn test_invalid_environment_value_fails_validation() {
        let mut settings = DiscountSettings::default();
        settings.apply_overrides(|name| (name == "PROMO_PERCENT_VALUE").then(|| "250".to_string()));

        assert!(matches!(settings.validate(), Err(CheckoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = DiscountSettings::from_path(file.path()).unwrap();
        assert_eq!(settings.channels.len(), 1);
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[defaults]\nnthStep = -4\n").unwrap();

        assert!(DiscountSettings::from_path(file.path()).is_err());

        let settings = DiscountSettings::load_or_default(Some(file.path().to_path_buf()));
        assert_eq!(settings.defaults, ChannelSettings::engine_defaults());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

        let mut settings = DiscountSettings::default();
        settings.channel_mut("outlet").nth_group_by = Some(toml::Value::String("type".into()));
        settings.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[defaults]"));
        assert!(contents.contains("[channels.outlet]"));

        let reloaded = DiscountSettings::from_path(&path).unwrap();
        let outlet = DecisionConfig::resolve(&reloaded, "outlet").unwrap();
        assert_eq!(outlet.group_by, GroupBy::Type);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = DiscountSettings::from_path(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(
            DecisionConfig::resolve(&settings, "web").unwrap().step,
            DEFAULT_NTH_STEP
        );
    }
}
