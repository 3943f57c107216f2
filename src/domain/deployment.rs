use crate::domain::errors::DeployError;
use ethers::types::{Address, H256};
use ethers::utils::to_checksum;
use std::collections::HashSet;
use std::fmt;

pub const AUCTION: &str = "Auction";
pub const BASKET: &str = "Basket";
pub const FACTORY: &str = "Factory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStep {
    pub contract: String,
    /// Earlier steps whose addresses are passed, in order, to the constructor.
    pub constructor_args: Vec<String>,
}

impl DeploymentStep {
    pub fn new(contract: &str) -> Self {
        Self {
            contract: contract.to_string(),
            constructor_args: Vec::new(),
        }
    }

    pub fn with_args(contract: &str, args: &[&str]) -> Self {
        Self {
            contract: contract.to_string(),
            constructor_args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered list of deployments. Every constructor dependency points backwards,
/// so running the steps in order always has the addresses it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    pub fn new(steps: Vec<DeploymentStep>) -> Result<Self, DeployError> {
        if steps.is_empty() {
            return Err(DeployError::InvalidPlan("plan has no steps".to_string()));
        }

        let mut seen = HashSet::new();
        for step in &steps {
            for dep in &step.constructor_args {
                if !seen.contains(dep.as_str()) {
                    return Err(DeployError::InvalidPlan(format!(
                        "{} depends on {}, which is not deployed before it",
                        step.contract, dep
                    )));
                }
            }
            if !seen.insert(step.contract.as_str()) {
                return Err(DeployError::InvalidPlan(format!(
                    "{} appears more than once",
                    step.contract
                )));
            }
        }

        Ok(Self { steps })
    }

    /// Auction, then Basket, then Factory(Auction, Basket).
    pub fn standard() -> Self {
        Self {
            steps: vec![
                DeploymentStep::new(AUCTION),
                DeploymentStep::new(BASKET),
                DeploymentStep::with_args(FACTORY, &[AUCTION, BASKET]),
            ],
        }
    }

    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentPhase {
    Pending(usize),
    Done,
    Failed(usize),
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentPhase::Pending(i) => write!(f, "Pending(step {})", i),
            DeploymentPhase::Done => write!(f, "Done"),
            DeploymentPhase::Failed(i) => write!(f, "Failed(step {})", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub name: String,
    pub address: Address,
    pub tx_hash: H256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentReport {
    pub contracts: Vec<DeployedContract>,
}

impl DeploymentReport {
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.contracts
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.address)
    }

    pub(crate) fn record(&mut self, contract: DeployedContract) {
        self.contracts.push(contract);
    }
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.contracts {
            writeln!(f, "{}: {}", c.name, to_checksum(&c.address, None))?;
        }
        Ok(())
    }
}
