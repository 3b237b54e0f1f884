//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! the `LISTEN` / `SERVE_DIR` environment variables, then the command line.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use crate::http::reader::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4221";

/// Command line options.
#[derive(Debug, Default, Parser)]
#[command(name = "handwire", about = "A small HTTP/1.1 server built from raw bytes")]
pub struct Args {
    /// Directory used by `/files/{name}` for reads and writes
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Optional YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub directory: PathBuf,
    pub read_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            directory: std::env::temp_dir(),
            read_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(yaml).context("Invalid YAML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    /// Builds the final configuration for the binary from the process environment.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        Self::from_args_with_env(args, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_args`], reading `LISTEN` and `SERVE_DIR` through `lookup`.
    pub fn from_args_with_env<F>(args: Args, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let mut cfg = base.with_env(lookup);
        if let Some(directory) = args.directory {
            cfg.directory = directory;
        }

        Ok(cfg)
    }

    fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN") {
            self.listen_addr = addr;
        }
        if let Some(dir) = lookup("SERVE_DIR") {
            self.directory = PathBuf::from(dir);
        }
        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.read_chunk_size == 0 {
            anyhow::bail!("read_chunk_size must be greater than zero");
        }
        if self.listen_addr.trim().is_empty() {
            anyhow::bail!("listen_addr must not be empty");
        }
        Ok(())
    }
}
