use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slat_shared_util::SettingKey;
use smart_default::SmartDefault;

pub const KEY_PERCENTAGE_DISPLAY: &str = "percentage-display";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_BATTERY_LEVEL: &str = "battery.level";
pub const KEY_BATTERY_CHARGING: &str = "battery.charging";
pub const KEY_RSSI_LEVEL: &str = "rssi.level";
pub const KEY_RSSI_AVAILABLE: &str = "rssi.available";
pub const KEY_BLUETOOTH_CONNECTED: &str = "bluetooth.connected";
pub const KEY_ALARM_SET: &str = "alarm.set";

/// Snapshot of the system configuration keys the bar subscribes to. On a real
/// device these arrive from the platform configuration store; here they live
/// in a JSON file in the config directory, watched for changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Settings {
    /// Whether the battery readout shows a numeric percentage. Turning this
    /// on shifts the System/Notification display budgets.
    pub percentage_display: bool,
    #[default("en_US".to_string())]
    pub language: String,
    /// Battery charge, 0..=100.
    #[default = 100]
    pub battery_level: u8,
    pub battery_charging: bool,
    /// Signal strength, 0..=4.
    #[default = 4]
    pub rssi_level: u8,
    #[default = true]
    pub rssi_available: bool,
    pub bluetooth_connected: bool,
    pub alarm_set: bool,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// The keys whose values differ between `self` and `new`.
    pub fn changed_keys(&self, new: &Settings) -> Vec<SettingKey> {
        let mut changed = Vec::new();
        let mut check = |key: &str, differs: bool| {
            if differs {
                changed.push(SettingKey::from(key));
            }
        };
        check(KEY_PERCENTAGE_DISPLAY, self.percentage_display != new.percentage_display);
        check(KEY_LANGUAGE, self.language != new.language);
        check(KEY_BATTERY_LEVEL, self.battery_level != new.battery_level);
        check(KEY_BATTERY_CHARGING, self.battery_charging != new.battery_charging);
        check(KEY_RSSI_LEVEL, self.rssi_level != new.rssi_level);
        check(KEY_RSSI_AVAILABLE, self.rssi_available != new.rssi_available);
        check(KEY_BLUETOOTH_CONNECTED, self.bluetooth_connected != new.bluetooth_connected);
        check(KEY_ALARM_SET, self.alarm_set != new.alarm_set);
        changed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "battery_level": 42 }"#).unwrap();
        assert_eq!(settings.battery_level, 42);
        assert_eq!(settings.language, "en_US");
        assert!(settings.rssi_available);
        assert!(!settings.percentage_display);
    }

    #[test]
    fn test_changed_keys() {
        let old = Settings::default();
        let mut new = Settings::default();
        new.percentage_display = true;
        new.battery_level = 12;
        assert_eq!(
            old.changed_keys(&new),
            vec![SettingKey::from(KEY_PERCENTAGE_DISPLAY), SettingKey::from(KEY_BATTERY_LEVEL)]
        );
        assert_eq!(old.changed_keys(&old.clone()), Vec::new());
    }
}
