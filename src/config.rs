use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub network: Network,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Deserialize)]
pub struct Network {
    pub rpc_url: String,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeployConfig {
    /// Blocks including the deployment before it is reported. 1 = mined.
    pub confirmations: usize,
    pub poll_interval_ms: u64,
    /// Send legacy (type 0) transactions instead of EIP-1559 ones.
    pub legacy: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval_ms: 1000,
            legacy: false,
        }
    }
}

impl DeployConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn load_config(path: PathBuf) -> Result<Config> {
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read config yaml {}", path.display()))?;
    let cfg: Config = serde_yaml::from_str(&raw).context("parse yaml")?;
    validate_config(&cfg)?;
    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.network.rpc_url.trim().is_empty() {
        anyhow::bail!("network.rpc_url must not be empty");
    }
    if cfg.deploy.confirmations == 0 {
        anyhow::bail!("deploy.confirmations must be at least 1");
    }
    if cfg.deploy.poll_interval_ms == 0 {
        anyhow::bail!("deploy.poll_interval_ms must be greater than 0");
    }
    Ok(())
}
