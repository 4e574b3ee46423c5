//! # Startup Settings
//!
//! Configuration consumed once at startup, loaded from TOML.
//!
//! These are the read-only configuration inputs of the lifecycle controller:
//! capacity, clock-reset policy, pure-mode enforcement, and auto-demo. The
//! controller never mutates them; runtime adjustments (the capacity floor,
//! pure-mode degradation) live on the controller itself.

use std::path::Path;

use serde::Deserialize;

use citadel_shared::constants::MAX_CLIENTS_LIMIT;

use crate::error::{ServerError, ServerResult};

/// Startup settings for the server engine.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Desired client capacity. The controller enforces the hard upper
    /// bound and the "never below highest in-use slot" floor at spawn time.
    pub max_clients: usize,
    /// Whether the level clock zeroes between maps. When false, the clock
    /// carries across spawns and only resets on an empty server.
    pub level_time_reset: bool,
    /// Pure-mode enforcement: clients must load exactly the server's paks.
    /// Degrades itself to off if the pak list would overflow the gamestate.
    pub pure: bool,
    /// Start a server-side demo recording automatically after each spawn.
    pub auto_demo: bool,
    /// Milliseconds a dropped slot lingers in ZOMBIE to absorb late packets.
    pub zombie_time_ms: i64,
    /// Milliseconds without traffic before a client is dropped.
    pub timeout_ms: i64,
    /// Server name published in serverinfo.
    pub hostname: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_clients: 8,
            level_time_reset: false,
            pure: true,
            auto_demo: false,
            zombie_time_ms: 2000,
            timeout_ms: 200_000,
            hostname: "noname".to_owned(),
        }
    }
}

impl ServerSettings {
    /// Loads settings from a TOML file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates value ranges.
    pub fn validate(&self) -> ServerResult<()> {
        if self.max_clients == 0 || self.max_clients > MAX_CLIENTS_LIMIT {
            return Err(ServerError::InvalidSettings(format!(
                "max_clients must be in 1..={MAX_CLIENTS_LIMIT}, got {}",
                self.max_clients
            )));
        }
        if self.zombie_time_ms <= 0 {
            return Err(ServerError::InvalidSettings(format!(
                "zombie_time_ms must be positive, got {}",
                self.zombie_time_ms
            )));
        }
        if self.timeout_ms <= 0 {
            return Err(ServerError::InvalidSettings(format!(
                "timeout_ms must be positive, got {}",
                self.timeout_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ServerSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let settings = ServerSettings { max_clients: 0, ..Default::default() };
        assert!(matches!(settings.validate(), Err(ServerError::InvalidSettings(_))));
    }

    #[test]
    fn test_rejects_over_capacity() {
        let settings = ServerSettings { max_clients: MAX_CLIENTS_LIMIT + 1, ..Default::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parses_toml() {
        let settings: ServerSettings = toml::from_str(
            r#"
            max_clients = 16
            level_time_reset = true
            pure = false
            hostname = "test arena"
            "#,
        )
        .unwrap();
        assert_eq!(settings.max_clients, 16);
        assert!(settings.level_time_reset);
        assert!(!settings.pure);
        assert_eq!(settings.hostname, "test arena");
        // Unspecified fields keep their defaults.
        assert_eq!(settings.zombie_time_ms, 2000);
    }
}
