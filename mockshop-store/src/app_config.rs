use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub backend: StorageBackend,
    /// Directory holding `<document_key>.json` when the file backend is used
    pub data_dir: PathBuf,
    pub document_key: String,
    #[serde(default = "default_purchase_attempts")]
    pub purchase_max_attempts: u32,
}

fn default_purchase_attempts() -> u32 { 5 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("server.port", 8080_i64)?
            .set_default("catalog.backend", "file")?
            .set_default("catalog.data_dir", "data")?
            .set_default("catalog.document_key", "products")?
            .set_default("catalog.purchase_max_attempts", i64::from(default_purchase_attempts()))?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `MOCKSHOP__SERVER__PORT=9000` sets `server.port`
            .add_source(config::Environment::with_prefix("MOCKSHOP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
