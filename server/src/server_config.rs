use std::time::Duration;

use serde::{Deserialize, Serialize};
use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};

pub const DEFAULT_CONFIG_FILE: &str = "snake_server.yaml";
pub const COMMAND_BUFFER: usize = 64;
pub const VIEWER_BUFFER: usize = 32;
pub const DECISION_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub normal_tick_ms: u64,
    pub fast_tick_ms: u64,
    pub auto_restart_delay_ms: u64,
    pub decision_retry_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            normal_tick_ms: 200,
            fast_tick_ms: 50,
            auto_restart_delay_ms: 1000,
            decision_retry_ms: 2000,
        }
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> Result<(), String> {
        if !(50..=5000).contains(&self.normal_tick_ms) {
            return Err("Normal tick interval must be between 50ms and 5000ms".to_string());
        }
        if self.fast_tick_ms < 10 || self.fast_tick_ms > self.normal_tick_ms {
            return Err("Fast tick interval must be at least 10ms and not slower than the normal one".to_string());
        }
        if self.auto_restart_delay_ms > 60_000 {
            return Err("Auto-restart delay must be at most 60000ms".to_string());
        }
        if !(100..=60_000).contains(&self.decision_retry_ms) {
            return Err("Decision retry delay must be between 100ms and 60000ms".to_string());
        }
        Ok(())
    }
}

impl ServerSettings {
    pub fn normal_tick(&self) -> Duration {
        Duration::from_millis(self.normal_tick_ms)
    }

    pub fn fast_tick(&self) -> Duration {
        Duration::from_millis(self.fast_tick_ms)
    }

    pub fn auto_restart_delay(&self) -> Duration {
        Duration::from_millis(self.auto_restart_delay_ms)
    }

    pub fn decision_retry(&self) -> Duration {
        Duration::from_millis(self.decision_retry_ms)
    }
}

pub fn get_config_manager(
    file_path: &str,
) -> ConfigManager<FileContentConfigProvider, ServerSettings, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::{ConfigSerializer, MemoryContentProvider};

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ServerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.normal_tick(), Duration::from_millis(200));
        assert_eq!(settings.fast_tick(), Duration::from_millis(50));
        assert_eq!(settings.auto_restart_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let provider = MemoryContentProvider::new(Some("normal_tick_ms: 300\n".to_string()));
        let manager: ConfigManager<_, ServerSettings> = ConfigManager::new(provider, YamlConfigSerializer::new());
        let settings = manager.get_config().unwrap();
        assert_eq!(settings.normal_tick_ms, 300);
        assert_eq!(settings.fast_tick_ms, 50);
    }

    #[test]
    fn test_fast_slower_than_normal_rejected() {
        let settings = ServerSettings {
            fast_tick_ms: 400,
            ..ServerSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_tick_bounds() {
        let too_fast = ServerSettings {
            normal_tick_ms: 10,
            fast_tick_ms: 10,
            ..ServerSettings::default()
        };
        assert!(too_fast.validate().is_err());

        let no_retry = ServerSettings {
            decision_retry_ms: 0,
            ..ServerSettings::default()
        };
        assert!(no_retry.validate().is_err());
    }

    #[test]
    fn test_settings_serialize_to_yaml() {
        let serializer = YamlConfigSerializer::new();
        let text = serializer.serialize(&ServerSettings::default()).unwrap();
        assert!(text.contains("normal_tick_ms: 200"));
        let back: ServerSettings = serializer.deserialize(&text).unwrap();
        assert_eq!(back, ServerSettings::default());
    }
}
