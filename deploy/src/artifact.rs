use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

use crate::utils::decode_hex;

/// Location of the compiled contract inside the Hardhat project.
pub const ARTIFACT_PATH: &str = "artifacts/contracts/AshNFT.sol/AshNFT.json";

/// The artifact of the `contracts` Hardhat project next to this crate.
pub fn default_artifact() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("contracts")
        .join(ARTIFACT_PATH)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: Abi,
    bytecode: String,
}

/// A compiled contract ready to be deployed.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read artifact {}", path.display()))?;
        let artifact = Self::from_json(&raw)
            .with_context(|| format!("invalid artifact {}", path.display()))?;
        log::debug!(
            "loaded {} from {} ({} bytes of bytecode)",
            artifact.contract_name,
            path.display(),
            artifact.bytecode.len()
        );
        Ok(artifact)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: HardhatArtifact = serde_json::from_str(raw)?;
        let bytecode = decode_hex(&artifact.bytecode)
            .map_err(|err| anyhow!("bytecode format error: {err}"))?;
        if bytecode.is_empty() {
            return Err(anyhow!(
                "{} has no creation bytecode",
                artifact.contract_name
            ));
        }

        Ok(Self {
            contract_name: artifact.contract_name,
            abi: artifact.abi,
            bytecode: bytecode.into(),
        })
    }
}
