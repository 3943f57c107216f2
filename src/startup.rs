use crate::{
    application::orchestrator::DeploymentOrchestrator,
    config,
    domain::deployment::DeploymentReport,
    infrastructure::{artifacts_fs::FsArtifactSource, ethereum_deployer::EthersDeployer},
};
use anyhow::{Context, Result};
use ethers::prelude::*;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

pub const PRIVATE_KEY_ENV: &str = "DEPLOYER_PRIVATE_KEY";

pub type AppClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub fn build(config_path: PathBuf) -> Result<DeploymentOrchestrator> {
    let cfg = config::load_config(config_path)?;

    let pk = std::env::var(PRIVATE_KEY_ENV)
        .context("Missing env DEPLOYER_PRIVATE_KEY (DO NOT put private keys in yaml)")?;
    let wallet: LocalWallet = pk
        .parse::<LocalWallet>()
        .context("DEPLOYER_PRIVATE_KEY is not a valid private key")?
        .with_chain_id(cfg.network.chain_id);
    info!(
        deployer = ?wallet.address(),
        chain_id = cfg.network.chain_id,
        rpc = %cfg.network.rpc_url,
        "Deployer account loaded"
    );

    let provider = Provider::<Http>::try_from(cfg.network.rpc_url.as_str())
        .with_context(|| format!("Invalid rpc_url {}", cfg.network.rpc_url))?;
    let client: Arc<AppClient> = Arc::new(SignerMiddleware::new(provider, wallet));

    let deployer = EthersDeployer::new(client)
        .confirmations(cfg.deploy.confirmations)
        .poll_interval(cfg.deploy.poll_interval())
        .legacy(cfg.deploy.legacy);
    let artifacts = FsArtifactSource::new(cfg.artifacts.dir.clone());

    Ok(DeploymentOrchestrator::new(
        Arc::new(artifacts),
        Arc::new(deployer),
    ))
}

pub async fn run(config_path: PathBuf) -> Result<DeploymentReport> {
    let orchestrator = build(config_path)?;
    let report = orchestrator.run_standard().await?;
    Ok(report)
}
