//! Spectator configuration, read from `spectate.toml`.

use client::Endpoint;
use client::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const CONFIG_FILE: &str = "spectate.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpectatorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl SpectatorConfig {
    /// Load configuration from `spectate.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(
            self.server.secure,
            self.server.host.clone(),
            self.client.endpoint_path(),
        )
    }
}

/// Where the battle server lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// `host:port` of the battle server.
    #[serde(default = "default_host")]
    pub host: String,
    /// Use `wss://` instead of `ws://`.
    #[serde(default)]
    pub secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            secure: false,
        }
    }
}

fn default_host() -> String {
    "localhost:8000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file() {
        let config: SpectatorConfig = toml::from_str(
            r#"
            [server]
            host = "arena.example:443"
            secure = true

            [client]
            match_id = 12
            reconnect_delay_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint().url(), "wss://arena.example:443/api/watch/12");
        assert_eq!(config.client.reconnect_delay().as_millis(), 250);
        assert_eq!(config.client.render.sprite_scale, 0.33);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: SpectatorConfig = toml::from_str("").unwrap();
        assert_eq!(config.endpoint().url(), "ws://localhost:8000/api/watch");
    }

    #[test]
    fn test_missing_file_is_written() {
        let path = std::env::temp_dir().join(format!("spectate-{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let created = SpectatorConfig::load_from(&path).unwrap();
        assert!(path.exists());
        let reloaded = SpectatorConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.endpoint(), created.endpoint());
        assert_eq!(reloaded.client.assets.explosion, created.client.assets.explosion);

        std::fs::remove_file(&path).unwrap();
    }
}
