pub mod artifacts_fs;
pub mod ethereum_deployer;
pub mod observability;
