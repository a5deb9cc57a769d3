use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const CONFIG_PATH_VAR: &str = "AIRDROP_TRACKER_CONFIG";
const CONFIG_ENV_VAR: &str = "AIRDROP_TRACKER_ENV";
const ENV_PREFIX: &str = "AIRDROP_TRACKER";
const DEFAULT_CONFIG_PATH: &str = "config/tracker.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let environment = std::env::var(CONFIG_ENV_VAR).ok();
        Self::load_from(&configured_path, environment.as_deref())
    }

    /// Layers: base file, optional `<stem>.<env>.toml` overlay, then
    /// `AIRDROP_TRACKER__SECTION__KEY` environment variables.
    pub fn load_from(configured_path: &str, environment: Option<&str>) -> Result<Self> {
        ensure!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        ensure!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(configured_path, FileFormat::Toml).required(true));

        if let Some(env_override) = environment.filter(|value| !value.is_empty()) {
            let env_file = overlay_path(configured_path, env_override);
            if Path::new(&env_file).exists() {
                builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.database.url.is_empty(),
            "Database URL must be specified"
        );
        ensure!(self.server.port > 0, "Server port must be greater than zero");
        self.database.ensure_bounds()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
}

impl DatabaseConfig {
    fn ensure_bounds(&self) -> Result<()> {
        ensure!(
            self.max_connections > 0,
            "Max connections must be positive"
        );
        ensure!(
            self.max_connections >= self.min_connections.unwrap_or(1),
            "Max connections must be >= min connections"
        );
        ensure!(self.max_connections <= 128, "Connection pool oversized");
        Ok(())
    }
}

fn overlay_path(base: &str, environment: &str) -> String {
    match base.strip_suffix(".toml") {
        Some(stem) => format!("{stem}.{environment}.toml"),
        None => format!("{base}.{environment}"),
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_loads() {
        let config = ApiConfig::load_from(DEFAULT_CONFIG_PATH, None).expect("config loads");
        assert_eq!(config.server.port, 4000);
        assert!(config.database.max_connections >= 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ApiConfig::load_from("config/does-not-exist.toml", None).is_err());
    }

    #[test]
    fn overlay_path_sits_next_to_base() {
        assert_eq!(
            overlay_path("config/tracker.toml", "prod"),
            "config/tracker.prod.toml"
        );
        assert_eq!(overlay_path("tracker", "dev"), "tracker.dev");
    }

    #[test]
    fn default_host_is_loopback() {
        let server = ServerConfig {
            host: None,
            port: 4000,
        };
        assert_eq!(server.address(), "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn pool_bounds_are_checked() {
        let database = DatabaseConfig {
            url: "postgres://localhost/tracker".to_string(),
            max_connections: 2,
            min_connections: Some(5),
        };
        assert!(database.ensure_bounds().is_err());
    }
}
