pub mod artifact;
pub mod deployment;
pub mod errors;
