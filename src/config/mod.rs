use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// How strictly the store checks status changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any status may be assigned at any time.
    #[default]
    Permissive,
    /// Status changes must follow the lifecycle tables.
    Strict,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Delay before offline drafts are marked as synced, in milliseconds
    #[serde(default = "default_sync_latency_ms")]
    pub sync_latency_ms: u64,

    #[serde(default)]
    pub transition_policy: TransitionPolicy,

    /// Initial state of the simulated network
    #[serde(default = "default_start_online")]
    pub start_online: bool,

    /// Where rendered invoices are written
    #[serde(default = "default_invoice_dir")]
    pub invoice_dir: PathBuf,
}

fn default_sync_latency_ms() -> u64 {
    2_000
}

fn default_start_online() -> bool {
    true
}

fn default_invoice_dir() -> PathBuf {
    PathBuf::from("invoices")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_latency_ms: default_sync_latency_ms(),
            transition_policy: TransitionPolicy::default(),
            start_online: default_start_online(),
            invoice_dir: default_invoice_dir(),
        }
    }
}

impl Config {
    /// Load configuration from `HVAC_*` environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed("HVAC_").from_env::<Config>()?;

        Ok(config)
    }

    pub fn sync_latency(&self) -> Duration {
        Duration::from_millis(self.sync_latency_ms)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
