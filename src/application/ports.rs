use crate::domain::{artifact::ContractArtifact, errors::DeployError};
use async_trait::async_trait;
use ethers::types::{Address, H256};

#[cfg_attr(test, mockall::automock)]
pub trait ArtifactSource: Send + Sync {
    /// Looks up a compiled contract by name, either `Auction` or the fully
    /// qualified `contracts/Auction.sol:Auction`.
    fn load(&self, contract: &str) -> Result<ContractArtifact, DeployError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Broadcasts the deployment transaction and returns its hash immediately.
    async fn submit(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[Address],
    ) -> Result<H256, DeployError>;

    /// Suspends until the deployment is confirmed and returns the address of
    /// the new contract.
    async fn await_confirmation(&self, contract: &str, tx_hash: H256)
        -> Result<Address, DeployError>;
}
