//! Carebase core library
//!
//! Caregivers, duty rosters, patients and their health checks, persisted as
//! flat JSON documents and guarded by password/token authentication.

pub mod api;
pub mod audit;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod telemetry;

/// Application configuration
pub mod config {
    use std::path::PathBuf;

    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub storage: StorageConfig,
        pub auth: AuthConfig,
        pub logging: LoggingConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct StorageConfig {
        pub data_dir: PathBuf,
        #[serde(default)]
        pub seed_dir: Option<PathBuf>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AuthConfig {
        pub jwt_secret: String,
        pub token_ttl_secs: u64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LoggingConfig {
        pub filter: String,
        pub json: bool,
    }

    /// Load configuration from defaults, config files and the environment
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("CAREBASE_ENV").unwrap_or_else(|_| "development".into());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("CAREBASE").separator("__"))
            // Conventional deployment variables win over everything else
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?;

        build(builder)
    }

    /// Apply built-in defaults underneath `builder` and validate the result
    pub fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Config, config::ConfigError> {
        let config: Config = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("storage.data_dir", "data")?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.token_ttl_secs", 86_400)?
            .set_default("logging.filter", "info")?
            .set_default("logging.json", false)?
            .build()?
            .try_deserialize()?;

        if config.auth.jwt_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.jwt_secret (or JWT_SECRET) must be set".into(),
            ));
        }
        if config.auth.token_ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "auth.token_ttl_secs must be greater than zero".into(),
            ));
        }

        Ok(config)
    }

}
