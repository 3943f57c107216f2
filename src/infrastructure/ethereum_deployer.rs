use crate::application::ports::ContractDeployer;
use crate::domain::{artifact::ContractArtifact, errors::DeployError};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIRMATIONS: usize = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub struct EthersDeployer<M: Middleware> {
    client: Arc<M>,
    confirmations: usize,
    poll_interval: Duration,
    legacy: bool,
}

impl<M: Middleware + 'static> EthersDeployer<M> {
    pub fn new(client: Arc<M>) -> Self {
        Self {
            client,
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            legacy: false,
        }
    }

    /// Blocks that must include the deployment (counting its own) before it
    /// counts as confirmed. 1 means "mined".
    pub fn confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Send pre-EIP-1559 transactions, for nodes without a base fee.
    pub fn legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    /// Inspects the receipt of a deployment. `Ok(None)` while the transaction
    /// is unmined or not yet deep enough.
    pub async fn check_receipt(
        &self,
        contract: &str,
        tx_hash: H256,
    ) -> Result<Option<Address>, DeployError> {
        let provider_err = |e: M::Error| DeployError::Confirmation {
            contract: contract.to_string(),
            reason: format!("Provider error: {}", e),
        };

        let receipt = match self
            .client
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(provider_err)?
        {
            Some(r) => r,
            None => return Ok(None),
        };

        if receipt.status == Some(U64::zero()) {
            warn!("{} deployment tx {:?} reverted!", contract, tx_hash);
            return Err(DeployError::Reverted {
                contract: contract.to_string(),
                tx_hash,
            });
        }

        let address = receipt
            .contract_address
            .ok_or_else(|| DeployError::Confirmation {
                contract: contract.to_string(),
                reason: format!("receipt of {:?} has no contract address", tx_hash),
            })?;

        if self.confirmations > 1 {
            let mined_in = match receipt.block_number {
                Some(n) => n,
                None => return Ok(None),
            };
            let head = self.client.get_block_number().await.map_err(provider_err)?;
            let confs = head.as_u64().saturating_sub(mined_in.as_u64()) + 1;
            if confs < self.confirmations as u64 {
                debug!(
                    "{} mined but waiting for confirmations ({}/{})",
                    contract, confs, self.confirmations
                );
                return Ok(None);
            }
        }

        Ok(Some(address))
    }
}

/// Creation code for `artifact`: bytecode followed by the ABI-encoded
/// constructor arguments.
pub fn encode_deploy_data(
    artifact: &ContractArtifact,
    constructor_args: &[Address],
) -> Result<Bytes, DeployError> {
    let encoding_err = |reason: String| DeployError::Encoding {
        contract: artifact.contract_name.clone(),
        reason,
    };
    let tokens: Vec<Token> = constructor_args.iter().copied().map(Token::Address).collect();

    match artifact.abi.constructor() {
        None if tokens.is_empty() => Ok(artifact.bytecode.clone()),
        None => Err(encoding_err(format!(
            "no constructor in ABI but {} argument(s) supplied",
            tokens.len()
        ))),
        Some(constructor) => constructor
            .encode_input(artifact.bytecode.to_vec(), &tokens)
            .map(Bytes::from)
            .map_err(|e| {
                encoding_err(format!(
                    "constructor takes {} parameter(s), got {} address(es): {}",
                    constructor.inputs.len(),
                    tokens.len(),
                    e
                ))
            }),
    }
}

#[async_trait]
impl<M: Middleware + 'static> ContractDeployer for EthersDeployer<M> {
    async fn submit(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[Address],
    ) -> Result<H256, DeployError> {
        let data = encode_deploy_data(artifact, constructor_args)?;

        let tx: TypedTransaction = if self.legacy {
            TransactionRequest::new().data(data).into()
        } else {
            Eip1559TransactionRequest::new().data(data).into()
        };

        // Only broadcast here; confirmation is polled separately
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| DeployError::Submission {
                contract: artifact.contract_name.clone(),
                reason: format!("Tx send failed: {}", e),
            })?;

        let tx_hash = pending.tx_hash();
        info!("{} deployment broadcasted. tx={:?}", artifact.contract_name, tx_hash);
        Ok(tx_hash)
    }

    async fn await_confirmation(
        &self,
        contract: &str,
        tx_hash: H256,
    ) -> Result<Address, DeployError> {
        loop {
            if let Some(address) = self.check_receipt(contract, tx_hash).await? {
                return Ok(address);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::tests::hardhat_json;
    use crate::test_utils::MockRpc;
    use ethers::providers::Provider;
    use ethers::signers::{LocalWallet, Signer};
    use ethers::types::{Block, FeeHistory, TransactionReceipt};

    type TestClient = SignerMiddleware<Provider<MockRpc>, LocalWallet>;

    fn deployer(mock: &MockRpc) -> EthersDeployer<TestClient> {
        let provider = Provider::new(mock.clone());
        let wallet: LocalWallet = "0x0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20"
            .parse()
            .unwrap();
        let client = Arc::new(SignerMiddleware::new(provider, wallet.with_chain_id(1u64)));
        EthersDeployer::new(client).poll_interval(Duration::from_millis(1))
    }

    fn artifact(name: &str, constructor_args: usize) -> ContractArtifact {
        ContractArtifact::from_hardhat_json(name, &hardhat_json(name, "0x6080", constructor_args))
            .unwrap()
    }

    fn mined_receipt(address: Address, block: u64) -> TransactionReceipt {
        TransactionReceipt {
            status: Some(U64::from(1)),
            block_number: Some(U64::from(block)),
            contract_address: Some(address),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_without_constructor() {
        let data = encode_deploy_data(&artifact("Auction", 0), &[]).unwrap();
        assert_eq!(data.to_vec(), vec![0x60, 0x80]);

        let err = encode_deploy_data(&artifact("Auction", 0), &[Address::zero()]).unwrap_err();
        assert!(matches!(err, DeployError::Encoding { .. }));
    }

    #[test]
    fn test_encode_constructor_addresses() {
        let auction = Address::from_low_u64_be(1);
        let basket = Address::from_low_u64_be(2);
        let data = encode_deploy_data(&artifact("Factory", 2), &[auction, basket]).unwrap();

        assert_eq!(data.len(), 2 + 64);
        assert_eq!(&data[..2], &[0x60, 0x80]);
        assert_eq!(&data[2 + 12..2 + 32], auction.as_bytes());
        assert_eq!(&data[2 + 44..], basket.as_bytes());
    }

    #[test]
    fn test_encode_wrong_argument_count() {
        let err = encode_deploy_data(&artifact("Factory", 2), &[Address::zero()]).unwrap_err();
        assert!(err.to_string().contains("constructor takes 2"), "{}", err);
    }

    #[tokio::test]
    async fn test_submit_deployment() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);

        mock.push(U256::from(0)); // eth_getTransactionCount
        let mut block = Block::<H256>::default();
        block.base_fee_per_gas = Some(U256::from(100));
        mock.push(block); // eth_getBlockByNumber
        mock.push(FeeHistory {
            oldest_block: U256::zero(),
            base_fee_per_gas: vec![U256::from(100); 11],
            gas_used_ratio: vec![0.5; 10],
            reward: vec![],
        }); // eth_feeHistory
        mock.push(U256::from(500_000)); // eth_estimateGas
        let hash = H256::random();
        mock.push(hash); // eth_sendRawTransaction

        let res = deployer.submit(&artifact("Auction", 0), &[]).await;
        if let Err(e) = &res {
            println!("Submit error: {:?}", e);
        }
        assert_eq!(res.unwrap(), hash);
        assert_eq!(mock.calls().last().map(String::as_str), Some("eth_sendRawTransaction"));
    }

    #[tokio::test]
    async fn test_submit_provider_failure() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);

        let err = deployer.submit(&artifact("Basket", 0), &[]).await.unwrap_err();
        assert!(matches!(err, DeployError::Submission { .. }));
        assert_eq!(err.contract(), Some("Basket"));
    }

    #[tokio::test]
    async fn test_check_receipt_pending() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);
        mock.push(Option::<TransactionReceipt>::None);

        let res = deployer.check_receipt("Auction", H256::random()).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn test_check_receipt_mined() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);
        let address = Address::random();
        mock.push(mined_receipt(address, 100));

        let res = deployer.check_receipt("Auction", H256::random()).await.unwrap();
        assert_eq!(res, Some(address));
        // depth 1 never asks for the head block
        assert_eq!(mock.calls(), vec!["eth_getTransactionReceipt".to_string()]);
    }

    #[tokio::test]
    async fn test_check_receipt_reverted() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);
        mock.push(TransactionReceipt {
            status: Some(U64::from(0)),
            block_number: Some(U64::from(100)),
            ..Default::default()
        });

        let err = deployer.check_receipt("Factory", H256::random()).await.unwrap_err();
        assert!(matches!(err, DeployError::Reverted { .. }));
    }

    #[tokio::test]
    async fn test_check_receipt_without_contract_address() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);
        mock.push(TransactionReceipt {
            status: Some(U64::from(1)),
            block_number: Some(U64::from(100)),
            ..Default::default()
        });

        let err = deployer.check_receipt("Basket", H256::random()).await.unwrap_err();
        assert!(err.to_string().contains("no contract address"));
    }

    #[tokio::test]
    async fn test_check_receipt_waits_for_depth() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock).confirmations(3);
        let address = Address::random();

        mock.push(mined_receipt(address, 100));
        mock.push(U64::from(101));
        let res = deployer.check_receipt("Auction", H256::random()).await.unwrap();
        assert!(res.is_none());

        mock.push(mined_receipt(address, 100));
        mock.push(U64::from(102));
        let res = deployer.check_receipt("Auction", H256::random()).await.unwrap();
        assert_eq!(res, Some(address));
    }

    #[tokio::test]
    async fn test_await_confirmation_polls_until_mined() {
        let mock = MockRpc::new();
        let deployer = deployer(&mock);
        let address = Address::random();

        mock.push(Option::<TransactionReceipt>::None);
        mock.push(Option::<TransactionReceipt>::None);
        mock.push(mined_receipt(address, 7));

        let res = deployer.await_confirmation("Basket", H256::random()).await.unwrap();
        assert_eq!(res, address);
        assert_eq!(mock.calls().len(), 3);
    }
}
