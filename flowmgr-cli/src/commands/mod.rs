//! CLI command implementations.

pub mod backup;
pub mod credentials;
pub mod deploy;
pub mod executions;
pub mod health;
pub mod version;
pub mod workflows;

use anyhow::{Context, Result};
use clap::Args;
use flowmgr_client::{API_KEY_ENV, BASE_URL_ENV, Client, ClientConfig};

/// Server connection options shared by every command that talks to the API.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Server base URL (e.g. http://localhost:5678)
    #[arg(long, global = true, env = BASE_URL_ENV)]
    pub base_url: Option<String>,
}

impl ConnectionArgs {
    /// Client configuration: environment defaults with flags on top.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        config
    }

    /// Build a client.
    pub fn connect(&self) -> Result<Client> {
        Client::new(self.config()).context("Failed to create client")
    }
}
