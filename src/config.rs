use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HavenConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub vault: VaultConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Argon2id parameters for master-key derivation.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VaultConfig {
    pub kdf_memory_kib: u32,
    pub kdf_iterations: u32,
    pub kdf_parallelism: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexConfig {
    pub dimensions: usize,
    pub default_search_limit: usize,
    pub default_query_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
}

impl Default for HavenConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            vault: VaultConfig::default(),
            index: IndexConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 50051,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_haven_dir()
            .join("haven.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        // Argon2id with 64 MiB memory cost; interactive-login strength.
        Self {
            kdf_memory_kib: 65536,
            kdf_iterations: 3,
            kdf_parallelism: 1,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimensions: 384,
            default_search_limit: 10,
            default_query_limit: 50,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "remote".into(),
            endpoint: "http://127.0.0.1:8000/embed".into(),
            model: "BAAI/bge-small-en-v1.5".into(),
        }
    }
}

/// Returns `~/.haven/`
pub fn default_haven_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".haven")
}

/// Returns the default config file path: `~/.haven/config.toml`
pub fn default_config_path() -> PathBuf {
    default_haven_dir().join("config.toml")
}

impl HavenConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            HavenConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (HAVEN_DB, HAVEN_LOG_LEVEL, HAVEN_EMBED_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HAVEN_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("HAVEN_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("HAVEN_EMBED_URL") {
            self.embedding.endpoint = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HavenConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.index.dimensions, 384);
        assert_eq!(config.vault.kdf_memory_kib, 65536);
        assert!(config.storage.db_path.ends_with("haven.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
transport = "http"
port = 9099

[storage]
db_path = "/tmp/test.db"

[index]
dimensions = 768
"#;
        let config: HavenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.transport, "http");
        assert_eq!(config.server.port, 9099);
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.index.dimensions, 768);
        // defaults still apply for unset fields
        assert_eq!(config.index.default_query_limit, 50);
        assert_eq!(config.vault.kdf_iterations, 3);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = HavenConfig::default();
        std::env::set_var("HAVEN_DB", "/tmp/override.db");
        std::env::set_var("HAVEN_LOG_LEVEL", "trace");
        std::env::set_var("HAVEN_EMBED_URL", "http://localhost:9000/embed");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.embedding.endpoint, "http://localhost:9000/embed");

        // Clean up
        std::env::remove_var("HAVEN_DB");
        std::env::remove_var("HAVEN_LOG_LEVEL");
        std::env::remove_var("HAVEN_EMBED_URL");
    }
}
