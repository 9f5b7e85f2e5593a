//! Runtime settings
//!
//! A flat record of thresholds, the detection interval and display toggles.
//! The record is mirrored field by field into a [`SettingsStore`], so every
//! field is persisted under its own key as a JSON-encoded string.

pub mod store;

pub use store::{JsonFileStore, MemoryStore, SettingsStore};

use crate::signal::SignalRange;
use crate::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const MIN_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} = {value} is outside {allowed}")]
    OutOfRange {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("{min_field} must be below {max_field}")]
    EmptyRange {
        min_field: &'static str,
        max_field: &'static str,
    },
}

impl SettingsError {
    /// Fields involved in the error
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            SettingsError::OutOfRange { field, .. } => vec![*field],
            SettingsError::EmptyRange {
                min_field,
                max_field,
            } => vec![*min_field, *max_field],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection_interval_ms: u64,
    pub brow_min: f32,
    pub brow_max: f32,
    pub mouth_min: f32,
    pub mouth_max: f32,
    pub brow_threshold: f32,
    pub brow_hysteresis: f32,
    pub hold_ticks: u32,
    pub cooldown_ms: u64,
    pub smoothing: f32,
    pub show_landmarks: bool,
    pub show_meters: bool,
    pub mirror: bool,
    pub paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_interval_ms: 100,
            brow_min: 0.22,
            brow_max: 0.42,
            mouth_min: 0.05,
            mouth_max: 0.60,
            brow_threshold: 0.65,
            brow_hysteresis: 0.15,
            hold_ticks: 2,
            cooldown_ms: 1500,
            smoothing: 0.5,
            show_landmarks: true,
            show_meters: true,
            mirror: true,
            paused: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        if self.detection_interval_ms < MIN_INTERVAL_MS {
            return Err(SettingsError::OutOfRange {
                field: "detection_interval_ms",
                value: self.detection_interval_ms.to_string(),
                allowed: ">= 10",
            });
        }

        unit("brow_threshold", self.brow_threshold)?;
        unit("brow_hysteresis", self.brow_hysteresis)?;

        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(SettingsError::OutOfRange {
                field: "smoothing",
                value: self.smoothing.to_string(),
                allowed: "[0, 1)",
            });
        }

        if self.hold_ticks == 0 {
            return Err(SettingsError::OutOfRange {
                field: "hold_ticks",
                value: "0".into(),
                allowed: ">= 1",
            });
        }

        // NaN fails the comparison too
        if !(self.brow_min < self.brow_max) {
            return Err(SettingsError::EmptyRange {
                min_field: "brow_min",
                max_field: "brow_max",
            });
        }
        if !(self.mouth_min < self.mouth_max) {
            return Err(SettingsError::EmptyRange {
                min_field: "mouth_min",
                max_field: "mouth_max",
            });
        }

        Ok(())
    }

    pub fn brow_range(&self) -> SignalRange {
        SignalRange::new(self.brow_min, self.brow_max)
    }

    pub fn mouth_range(&self) -> SignalRange {
        SignalRange::new(self.mouth_min, self.mouth_max)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Build settings from the store. Stored fields that fail to parse keep
    /// their default; if the combined record is invalid, the fields named by
    /// the validation error fall back to their defaults together.
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let defaults = match serde_json::to_value(Self::default())? {
            Value::Object(map) => map,
            other => anyhow::bail!("settings serialized to {other}"),
        };
        let mut fields = defaults.clone();

        for key in defaults.keys() {
            let Some(raw) = store.get(key) else {
                continue;
            };

            let value: Value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Ignoring stored setting {key}={raw:?}: {e}");
                    continue;
                }
            };

            // Type check only; cross-field rules are checked on the whole record
            let mut candidate = defaults.clone();
            candidate.insert(key.clone(), value.clone());
            match serde_json::from_value::<Settings>(Value::Object(candidate)) {
                Ok(_) => {
                    fields.insert(key.clone(), value);
                }
                Err(e) => warn!("Ignoring stored setting {key}={raw}: {e}"),
            }
        }

        // Every reset restores at least one default, so this ends within
        // one pass per field
        for _ in 0..=defaults.len() {
            let settings: Settings = serde_json::from_value(Value::Object(fields.clone()))?;
            let Err(e) = settings.validate() else {
                debug!("Loaded settings: {settings:?}");
                return Ok(settings);
            };

            warn!("Stored settings rejected ({e}), restoring defaults for {:?}", e.fields());
            for field in e.fields() {
                if let Some(default) = defaults.get(field) {
                    fields.insert(field.to_string(), default.clone());
                }
            }
        }

        anyhow::bail!("stored settings could not be repaired")
    }

    /// Mirror every field into the store
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        if let Value::Object(map) = serde_json::to_value(self)? {
            for (key, value) in map {
                store.set(&key, &value.to_string())?;
            }
        }
        Ok(())
    }

    /// Persist a single field after a toggle or tweak
    pub fn save_field(&self, store: &mut dyn SettingsStore, key: &str) -> Result<()> {
        let value = serde_json::to_value(self)?;
        match value.get(key) {
            Some(field) => store.set(key, &field.to_string()),
            None => anyhow::bail!("unknown setting: {key}"),
        }
    }
}

fn unit(field: &'static str, value: f32) -> std::result::Result<(), SettingsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value: value.to_string(),
            allowed: "[0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects() {
        let settings = Settings {
            brow_min: 0.5,
            brow_max: 0.4,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::EmptyRange {
                min_field: "brow_min",
                max_field: "brow_max"
            })
        );

        let settings = Settings {
            detection_interval_ms: 5,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            smoothing: 1.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            hold_ticks: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let mut store = MemoryStore::default();
        let settings = Settings {
            brow_threshold: 0.8,
            show_landmarks: false,
            detection_interval_ms: 250,
            ..Settings::default()
        };

        settings.save(&mut store)?;
        assert_eq!(store.get("show_landmarks").as_deref(), Some("false"));
        assert_eq!(Settings::load(&store)?, settings);
        Ok(())
    }

    #[test]
    fn test_load_ignores_bad_values() -> Result<()> {
        let mut store = MemoryStore::default();
        store.set("brow_threshold", "\"high\"")?;
        store.set("detection_interval_ms", "1")?;
        store.set("mirror", "not json")?;
        store.set("cooldown_ms", "900")?;
        store.set("unrelated", "1")?;

        let settings = Settings::load(&store)?;
        let defaults = Settings::default();
        assert_eq!(settings.brow_threshold, defaults.brow_threshold);
        assert_eq!(settings.detection_interval_ms, defaults.detection_interval_ms);
        assert_eq!(settings.mirror, defaults.mirror);
        assert_eq!(settings.cooldown_ms, 900);
        Ok(())
    }

    #[test]
    fn test_low_ranges_survive_reload() -> Result<()> {
        let mut store = MemoryStore::default();
        let settings = Settings {
            brow_min: 0.10,
            brow_max: 0.20,
            mouth_min: 0.01,
            mouth_max: 0.04,
            ..Settings::default()
        };

        settings.save(&mut store)?;
        assert_eq!(Settings::load(&store)?, settings);
        Ok(())
    }

    #[test]
    fn test_inverted_range_falls_back_as_a_pair() -> Result<()> {
        let mut store = MemoryStore::default();
        store.set("brow_min", "0.5")?;
        store.set("brow_max", "0.3")?;
        store.set("mouth_max", "0.9")?;

        let settings = Settings::load(&store)?;
        let defaults = Settings::default();
        assert_eq!(settings.brow_min, defaults.brow_min);
        assert_eq!(settings.brow_max, defaults.brow_max);
        assert_eq!(settings.mouth_max, 0.9);
        Ok(())
    }

    #[test]
    fn test_save_field() -> Result<()> {
        let mut store = MemoryStore::default();
        let settings = Settings {
            paused: true,
            ..Settings::default()
        };

        settings.save_field(&mut store, "paused")?;
        assert_eq!(store.keys(), vec!["paused".to_string()]);
        assert!(settings.save_field(&mut store, "nope").is_err());
        Ok(())
    }
}
