//! Solidity compilation through the `solc` command line

use std::collections::BTreeMap;
use std::path::Path;

use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::error::{DeployError, Result};

/// ABI and creation bytecode of one compiled contract
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

/// `solc --combined-json abi,bin` output
#[derive(Debug, Deserialize)]
struct CombinedJson {
    contracts: BTreeMap<String, CombinedContract>,
}

#[derive(Debug, Deserialize)]
struct CombinedContract {
    abi: AbiField,
    bin: String,
}

/// Older solc releases embed the ABI as a JSON string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AbiField {
    Inline(JsonAbi),
    Encoded(String),
}

impl AbiField {
    fn into_abi(self) -> Result<JsonAbi> {
        match self {
            AbiField::Inline(abi) => Ok(abi),
            AbiField::Encoded(s) => serde_json::from_str(&s)
                .map_err(|e| DeployError::CompilerOutput(format!("Failed to parse ABI: {}", e))),
        }
    }
}

/// Runs the solc binary against a single source file
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    binary: String,
    evm_version: String,
}

impl SolcCompiler {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            evm_version: config.evm_version.clone(),
        }
    }

    /// Command line arguments for compiling `source`
    pub fn args(&self, source: &Path) -> Vec<String> {
        vec![
            "--evm-version".to_string(),
            self.evm_version.clone(),
            "--combined-json".to_string(),
            "abi,bin".to_string(),
            source.display().to_string(),
        ]
    }

    /// Compile `source` and extract contract `name` from the output
    pub async fn compile(&self, source: &Path, name: &str) -> Result<CompiledContract> {
        let args = self.args(source);
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|source| DeployError::CompilerSpawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DeployError::CompilerFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| DeployError::CompilerOutput(format!("Output is not UTF-8: {}", e)))?;

        let compiled = parse_combined_json(&stdout, &artifact_key(source, name))?;
        info!(
            "Compiled {} ({} bytes of bytecode, {} functions)",
            name,
            compiled.bytecode.len(),
            compiled.abi.functions().count()
        );
        Ok(compiled)
    }
}

/// Key under which solc reports `name` from `source`
pub fn artifact_key(source: &Path, name: &str) -> String {
    format!("{}:{}", source.display(), name)
}

/// Extract the contract stored under `key` from combined JSON output
pub fn parse_combined_json(output: &str, key: &str) -> Result<CompiledContract> {
    let mut combined: CombinedJson = serde_json::from_str(output)
        .map_err(|e| DeployError::CompilerOutput(format!("Failed to parse JSON: {}", e)))?;

    let Some(contract) = combined.contracts.remove(key) else {
        return Err(DeployError::ContractNotFound {
            key: key.to_string(),
            available: combined.contracts.into_keys().collect(),
        });
    };

    let abi = contract.abi.into_abi()?;
    let bytecode = hex::decode(contract.bin.trim())
        .map_err(|e| DeployError::CompilerOutput(format!("Invalid bytecode hex: {}", e)))?;
    if bytecode.is_empty() {
        return Err(DeployError::CompilerOutput(format!(
            "'{}' has no bytecode (abstract contract or interface?)",
            key
        )));
    }

    Ok(CompiledContract {
        abi,
        bytecode: Bytes::from(bytecode),
    })
}
