use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL, only needed by the API server
    pub database_url: Option<String>,

    /// Interface the API server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the API server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on pooled database connections
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Where the terminal frontend finds the API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first when the file exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>().context("invalid environment configuration")?;

        Ok(config)
    }

    /// The database URL, or an error naming the missing variable
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set to run the API server"))
    }

    /// Socket address for the API server
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
