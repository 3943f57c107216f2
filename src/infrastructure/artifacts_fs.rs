use crate::application::ports::ArtifactSource;
use crate::domain::{artifact::ContractArtifact, errors::DeployError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads Hardhat artifacts (`<root>/<source>.sol/<Name>.json`) from disk.
pub struct FsArtifactSource {
    root: PathBuf,
}

impl FsArtifactSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, contract: &str) -> Result<PathBuf, DeployError> {
        let not_found = |reason: String| DeployError::ArtifactNotFound {
            contract: contract.to_string(),
            reason,
        };

        if !self.root.is_dir() {
            return Err(not_found(format!(
                "artifacts directory {} does not exist (contracts not compiled?)",
                self.root.display()
            )));
        }

        // contracts/Auction.sol:Auction
        if let Some((source, name)) = contract.split_once(':') {
            let path = self.root.join(source).join(format!("{}.json", name));
            return if path.is_file() {
                Ok(path)
            } else {
                Err(not_found(format!("{} does not exist", path.display())))
            };
        }

        let mut matches = Vec::new();
        collect_matches(&self.root, &format!("{}.json", contract), &mut matches)
            .map_err(|e| not_found(format!("cannot scan {}: {}", self.root.display(), e)))?;

        match matches.len() {
            0 => Err(not_found(format!(
                "no artifact under {}",
                self.root.display()
            ))),
            1 => Ok(matches.remove(0)),
            _ => {
                matches.sort();
                let candidates: Vec<String> = matches
                    .iter()
                    .filter_map(|p| self.qualified_name(p))
                    .collect();
                Err(not_found(format!(
                    "multiple artifacts match, use a fully qualified name: {}",
                    candidates.join(", ")
                )))
            }
        }
    }

    fn qualified_name(&self, path: &Path) -> Option<String> {
        let source = path.parent()?.strip_prefix(&self.root).ok()?;
        let name = path.file_stem()?.to_str()?;
        let source = source
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(format!("{}:{}", source, name))
    }
}

fn collect_matches(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect_matches(&path, file_name, out)?;
        } else if path.file_name().is_some_and(|n| n == file_name)
            && path
                .parent()
                .and_then(|p| p.extension())
                .is_some_and(|ext| ext == "sol")
        {
            out.push(path);
        }
    }
    Ok(())
}

impl ArtifactSource for FsArtifactSource {
    fn load(&self, contract: &str) -> Result<ContractArtifact, DeployError> {
        let path = self.locate(contract)?;
        debug!(contract, path = %path.display(), "Loading artifact");

        let raw = fs::read_to_string(&path).map_err(|e| DeployError::ArtifactNotFound {
            contract: contract.to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        ContractArtifact::from_hardhat_json(contract, &raw)
    }
}
