use std::time::Duration;

use crate::config::CacheSettings;

const DEFAULT_TTL_SECONDS: u64 = 600;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Runtime cache behavior, resolved from the `[cache]` settings section.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Entry lifetime. Fixed for every `set`; never passed per call.
    pub ttl_seconds: u64,
    /// Cadence of the background sweep that drops expired entries.
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl_seconds,
            sweep_interval_seconds: settings.sweep_interval_seconds,
        }
    }
}
