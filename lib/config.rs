//! Configuration Model

use config::builder::DefaultState;
use config::{
    Config as ConfigRaw,
    ConfigBuilder,
    ConfigError,
    Environment,
    File,
    FileFormat,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MainConfig {
    pub prometheus_address: String,
    pub prometheus_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub address: String,
    pub port: u16,
    pub log_request_body: bool,
    pub log_response_body: bool,
}

///
///
/// * `main`: Process-wide settings shared by every role
/// * `api`: Configuration of the API server
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub main: MainConfig,
    pub api: ApiConfig,
}

#[derive(Debug)]
pub struct ConfigLoader {
    builder: ConfigBuilder<DefaultState>,
}

impl ConfigLoader {
    /// Loads a fresh copy of the configuration from source.
    pub fn load(&self) -> Result<Config, ConfigError> {
        Self::deserialize(self.builder.build_cloned()?)
    }

    /// creates a new loader configured to load the default and overlays
    /// the user supplied config (if supplied).
    ///
    /// * `path`: The path of the configuration file to load.
    pub fn from_path(path: &Option<String>) -> ConfigLoader {
        let raw = include_str!("default.toml");
        let mut builder = ConfigRaw::builder()
            .add_source(File::from_str(raw, FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        // Environment variables go last so that file sources cannot
        // override them.
        let builder = builder.add_source(
            Environment::with_prefix("ROSTER")
                .try_parsing(true)
                .separator("__"),
        );
        ConfigLoader { builder }
    }

    fn deserialize(config: ConfigRaw) -> Result<Config, ConfigError> {
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_load() -> Result<(), ConfigError> {
        let config = ConfigLoader::from_path(&None).load()?;
        assert_eq!("0.0.0.0", config.api.address);
        assert_eq!(8888, config.api.port);
        assert_eq!(9000, config.main.prometheus_port);
        Ok(())
    }
}
