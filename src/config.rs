use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "lung-scan")]
#[command(about = "Classifies uploaded lung CT scans and histopathology slides")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Listen address
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// CT scan ONNX model
    #[arg(long)]
    pub ct_model: Option<PathBuf>,

    /// Histopathology ONNX model
    #[arg(long)]
    pub histo_model: Option<PathBuf>,

    /// Directory temporary uploads are written under
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub models: ModelPaths,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Number of HTTP workers; actix picks one per core when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelPaths {
    #[serde(default = "default_ct_model")]
    pub ct_scan: PathBuf,

    #[serde(default = "default_histo_model")]
    pub histopathology: PathBuf,
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = Path::new(&cli.config);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("no config file at {}, using defaults", cli.config);
            Self::default()
        };

        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AppError::config(e.to_string()))
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(path) = &cli.ct_model {
            self.models.ct_scan = path.clone();
        }
        if let Some(path) = &cli.histo_model {
            self.models.histopathology = path.clone();
        }
        if let Some(dir) = &cli.upload_dir {
            self.upload_dir = dir.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::config("server.port must be non-zero"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(AppError::config("server.max_upload_bytes must be non-zero"));
        }
        if self.server.workers == Some(0) {
            return Err(AppError::config("server.workers must be at least 1"));
        }
        if self.models.ct_scan.as_os_str().is_empty()
            || self.models.histopathology.as_os_str().is_empty()
        {
            return Err(AppError::config("model paths must not be empty"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            models: ModelPaths::default(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            workers: None,
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            ct_scan: default_ct_model(),
            histopathology: default_histo_model(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_ct_model() -> PathBuf {
    PathBuf::from("models/ct_scan_model.onnx")
}

fn default_histo_model() -> PathBuf {
    PathBuf::from("models/histopathology_model.onnx")
}
