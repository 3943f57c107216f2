use ethers::types::H256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Artifact for {contract} not found: {reason}")]
    ArtifactNotFound { contract: String, reason: String },
    #[error("Invalid artifact for {contract}: {reason}")]
    InvalidArtifact { contract: String, reason: String },
    #[error("Cannot encode {contract} deployment: {reason}")]
    Encoding { contract: String, reason: String },
    #[error("Failed to submit {contract} deployment: {reason}")]
    Submission { contract: String, reason: String },
    #[error("{contract} deployment reverted on-chain (tx={tx_hash:?})")]
    Reverted { contract: String, tx_hash: H256 },
    #[error("Confirmation of {contract} deployment failed: {reason}")]
    Confirmation { contract: String, reason: String },
    #[error("Invalid deployment plan: {0}")]
    InvalidPlan(String),
}

impl DeployError {
    /// Name of the contract whose step failed, if the error belongs to a step.
    pub fn contract(&self) -> Option<&str> {
        match self {
            DeployError::ArtifactNotFound { contract, .. }
            | DeployError::InvalidArtifact { contract, .. }
            | DeployError::Encoding { contract, .. }
            | DeployError::Submission { contract, .. }
            | DeployError::Reverted { contract, .. }
            | DeployError::Confirmation { contract, .. } => Some(contract),
            DeployError::InvalidPlan(_) => None,
        }
    }
}
