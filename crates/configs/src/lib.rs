use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 1337;
pub const SERVICES_FILE: &str = "services.json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: DEFAULT_PORT, worker_threads: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the services document.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Prebuilt frontend bundle served for every unmatched GET.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_file_name() -> String { SERVICES_FILE.into() }
fn default_frontend_dir() -> PathBuf { PathBuf::from("dist") }

/// Path of the TOML file, `CONFIG_PATH` or `config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(config_path())
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Build a config purely from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        if let Ok(dir) = std::env::var("DATA_DIR") {
            cfg.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("FRONTEND_DIR") {
            cfg.storage.frontend_dir = PathBuf::from(dir);
        }
        cfg
    }

    /// Read `config.toml` (or `CONFIG_PATH`) when present, otherwise fall back to env.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if path.exists() { load_from_file(&path)? } else { Self::from_env() };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }

    /// Resolve `host` (an IP literal or a name such as `localhost`) to the first address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| anyhow!("cannot resolve server.host {:?}: {}", self.host, e))?
            .next()
            .ok_or_else(|| anyhow!("server.host {:?} resolved to no addresses", self.host))
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_dir is empty; set it in config.toml or DATA_DIR"));
        }
        let name = self.file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(anyhow!("storage.file_name must be a plain file name"));
        }
        Ok(())
    }

    /// Full path of the services document.
    pub fn services_file(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}
