//! Bridge configuration
//!
//! Stored as TOML. Every field has a default so a partial or missing file
//! still yields a usable config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use wiimote_transport::Leds;

/// Hard upper bound on the session pool (one per console slot)
pub const MAX_WIIMOTES: usize = 4;

/// Runtime settings for the bridge and its host binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Number of controllers to open (clamped to 1..=MAX_WIIMOTES)
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,

    /// Blocking read timeout per poll in milliseconds (at least 1)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u32,

    /// Pause after each poll sweep in microseconds (0 = no pause)
    #[serde(default)]
    pub poll_idle_us: u64,

    /// How long discovery keeps searching for a first controller
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,

    /// Player LEDs lit on each controller when its session starts (1-4)
    #[serde(default = "default_indicator_leds")]
    pub indicator_leds: Vec<u8>,

    /// Host update period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_max_devices() -> usize {
    1
}

fn default_read_timeout_ms() -> u32 {
    10
}

fn default_discovery_timeout_secs() -> u64 {
    5
}

fn default_indicator_leds() -> Vec<u8> {
    vec![4]
}

fn default_tick_ms() -> u64 {
    16
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_devices: default_max_devices(),
            read_timeout_ms: default_read_timeout_ms(),
            poll_idle_us: 0,
            discovery_timeout_secs: default_discovery_timeout_secs(),
            indicator_leds: default_indicator_leds(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl BridgeConfig {
    /// Default config path (~/.config/wiimote-bridge/bridge.toml)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wiimote-bridge")
            .join("bridge.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: BridgeConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Session pool size actually used
    pub fn pool_size(&self) -> usize {
        self.max_devices.clamp(1, MAX_WIIMOTES)
    }

    /// Indicator LED mask
    pub fn indicator(&self) -> Leds {
        Leds::from_numbers(&self.indicator_leds)
    }

    /// Read timeout handed to each device; bounds one poll sweep
    pub fn read_timeout(&self) -> u32 {
        self.read_timeout_ms.max(1)
    }

    /// Pause between poll sweeps, if any
    pub fn poll_idle(&self) -> Option<Duration> {
        (self.poll_idle_us > 0).then(|| Duration::from_micros(self.poll_idle_us))
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.pool_size(), 1);
        assert_eq!(config.indicator(), Leds::LED_4);
        assert!(config.poll_idle().is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: BridgeConfig = toml::from_str(
            r#"
max_devices = 2
poll_idle_us = 250
indicator_leds = [1, 2]
"#,
        )
        .unwrap();
        assert_eq!(config.pool_size(), 2);
        assert_eq!(config.poll_idle(), Some(Duration::from_micros(250)));
        assert_eq!(config.indicator(), Leds::LED_1 | Leds::LED_2);
        assert_eq!(config.read_timeout_ms, 10);
        assert_eq!(config.tick_ms, 16);
    }

    #[test]
    fn test_read_timeout_never_blocks_forever() {
        // A negative timeout means "block until input" to hidapi
        assert!(toml::from_str::<BridgeConfig>("read_timeout_ms = -1").is_err());

        let config: BridgeConfig = toml::from_str("read_timeout_ms = 0").unwrap();
        assert_eq!(config.read_timeout(), 1);
        assert_eq!(BridgeConfig::default().read_timeout(), 10);
    }

    #[test]
    fn test_pool_size_is_clamped() {
        let mut config = BridgeConfig {
            max_devices: 9,
            ..Default::default()
        };
        assert_eq!(config.pool_size(), MAX_WIIMOTES);
        config.max_devices = 0;
        assert_eq!(config.pool_size(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("wiimote-bridge-test-{}", std::process::id()));
        let path = dir.join("bridge.toml");
        let config = BridgeConfig {
            max_devices: 3,
            tick_ms: 8,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = BridgeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("wiimote-bridge-does-not-exist.toml");
        assert_eq!(BridgeConfig::load(&path).unwrap(), BridgeConfig::default());
    }
}
