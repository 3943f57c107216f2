use crate::application::ports::{ArtifactSource, ContractDeployer};
use crate::domain::{
    deployment::{DeployedContract, DeploymentPhase, DeploymentPlan, DeploymentReport, DeploymentStep},
    errors::DeployError,
};
use ethers::types::Address;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct DeploymentOrchestrator {
    artifacts: Arc<dyn ArtifactSource>,
    deployer: Arc<dyn ContractDeployer>,
}

impl DeploymentOrchestrator {
    pub fn new(artifacts: Arc<dyn ArtifactSource>, deployer: Arc<dyn ContractDeployer>) -> Self {
        Self {
            artifacts,
            deployer,
        }
    }

    /// Deploys Auction, Basket and then Factory(Auction, Basket).
    pub async fn run_standard(&self) -> Result<DeploymentReport, DeployError> {
        self.deploy(&DeploymentPlan::standard()).await
    }

    /// Runs every step of `plan` in order. The first failure aborts the run;
    /// contracts confirmed before it stay deployed.
    pub async fn deploy(&self, plan: &DeploymentPlan) -> Result<DeploymentReport, DeployError> {
        info!(steps = plan.len(), "Deployment started");
        let mut report = DeploymentReport::default();

        for (index, step) in plan.steps().iter().enumerate() {
            let phase = DeploymentPhase::Pending(index);
            info!(%phase, contract = %step.contract, "Next step");

            match self.deploy_step(index, step, &report).await {
                Ok(deployed) => report.record(deployed),
                Err(e) => {
                    let phase = DeploymentPhase::Failed(index);
                    error!(%phase, contract = %step.contract, "Deployment aborted: {}", e);
                    if !report.contracts.is_empty() {
                        warn!(
                            "{} contract(s) already deployed and left on-chain",
                            report.contracts.len()
                        );
                    }
                    return Err(e);
                }
            }
        }

        info!(phase = %DeploymentPhase::Done, "Deployment finished");
        Ok(report)
    }

    #[tracing::instrument(skip(self, step, report), fields(contract = %step.contract))]
    async fn deploy_step(
        &self,
        index: usize,
        step: &DeploymentStep,
        report: &DeploymentReport,
    ) -> Result<DeployedContract, DeployError> {
        let args = Self::constructor_args(step, report)?;
        let artifact = self.artifacts.load(&step.contract)?;

        let tx_hash = self.deployer.submit(&artifact, &args).await?;
        info!(tx = ?tx_hash, "Deployment submitted, waiting for confirmation");

        let address = self
            .deployer
            .await_confirmation(&step.contract, tx_hash)
            .await?;
        info!(address = ?address, "Deployment confirmed");

        Ok(DeployedContract {
            name: step.contract.clone(),
            address,
            tx_hash,
        })
    }

    fn constructor_args(
        step: &DeploymentStep,
        report: &DeploymentReport,
    ) -> Result<Vec<Address>, DeployError> {
        step.constructor_args
            .iter()
            .map(|dep| {
                report.address_of(dep).ok_or_else(|| {
                    DeployError::InvalidPlan(format!(
                        "{} needs the address of {}, which has not been deployed",
                        step.contract, dep
                    ))
                })
            })
            .collect()
    }
}
