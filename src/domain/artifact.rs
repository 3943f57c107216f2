use crate::domain::errors::DeployError;
use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A compiled contract, ready to be deployed: interface plus creation code.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: Option<String>,
    pub abi: Abi,
    pub bytecode: Bytes,
}

// Subset of the `hh-sol-artifact-1` format written by Hardhat.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    #[serde(default)]
    source_name: Option<String>,
    abi: Abi,
    bytecode: String,
    #[serde(default)]
    link_references: Map<String, Value>,
}

impl ContractArtifact {
    /// Parses a Hardhat artifact. `contract` is the name the caller asked for
    /// and is used in errors and to check the artifact is the right one.
    pub fn from_hardhat_json(contract: &str, raw: &str) -> Result<Self, DeployError> {
        let invalid = |reason: String| DeployError::InvalidArtifact {
            contract: contract.to_string(),
            reason,
        };

        let artifact: HardhatArtifact =
            serde_json::from_str(raw).map_err(|e| invalid(format!("malformed JSON: {}", e)))?;

        let short_name = contract.rsplit(':').next().unwrap_or(contract);
        if artifact.contract_name != short_name {
            return Err(invalid(format!(
                "artifact declares contractName {}",
                artifact.contract_name
            )));
        }

        if !artifact.link_references.is_empty() || artifact.bytecode.contains("__$") {
            let libs: Vec<&String> = artifact.link_references.keys().collect();
            return Err(invalid(format!(
                "bytecode needs library linking ({:?}), which is not supported",
                libs
            )));
        }

        let code = ethers::utils::hex::decode(artifact.bytecode.trim_start_matches("0x"))
            .map_err(|e| invalid(format!("invalid bytecode hex: {}", e)))?;
        if code.is_empty() {
            return Err(invalid(
                "empty bytecode (abstract contract or interface?)".to_string(),
            ));
        }

        Ok(Self {
            contract_name: artifact.contract_name,
            source_name: artifact.source_name,
            abi: artifact.abi,
            bytecode: code.into(),
        })
    }

    pub fn has_constructor(&self) -> bool {
        self.abi.constructor().is_some()
    }
}
