//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_CUSTOM_MENU_TTL_SECS, DEFAULT_PARAMETER_CACHE_TTL_SECS};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub redis: Option<RedisSettings>,
    pub jwt: JwtSettings,
    pub log: LogSettings,
    pub menu: MenuSettings,
    pub parameters: ParameterSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub max_connections: usize,
    pub key_prefix: String,
    #[serde(default = "default_custom_menu_ttl")]
    pub custom_menu_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    /// Directory for the daily rolling log file; stdout only when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuSettings {
    /// Resolve the built-in tree when no configuration is active.
    pub fallback_to_default: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParameterSettings {
    pub cache_ttl_secs: u64,
}

fn default_custom_menu_ttl() -> u64 {
    DEFAULT_CUSTOM_MENU_TTL_SECS
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "topsteel-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("database.run_migrations", true)?
            .set_default("log.level", "info")?
            .set_default("log.json", true)?
            .set_default("menu.fallback_to_default", true)?
            .set_default("parameters.cache_ttl_secs", DEFAULT_PARAMETER_CACHE_TTL_SECS)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
