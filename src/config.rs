use std::path::PathBuf;

use serde::Deserialize;

use crate::args::ContractArg;
use crate::error::{DeployError, Result};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "DEPLOY_CONFIG";
/// Config file read when `DEPLOY_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "deploy.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub key: KeyConfig,
    pub network: NetworkConfig,
    pub compiler: CompilerConfig,
    pub contract: ContractConfig,
    pub transfer: TransferConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub binary: String,
    pub evm_version: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub path: PathBuf,
    pub name: String,
    pub constructor_args: Vec<ContractArg>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub amount: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("privkey.txt"),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc-testnet.qanplatform.com".to_string(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            binary: "solc".to_string(),
            evm_version: "paris".to_string(),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sample.sol"),
            name: "SampleToken".to_string(),
            // name, symbol, decimals, total supply
            constructor_args: vec![
                ContractArg::Text("The Quantum Cat".to_string()),
                ContractArg::Text("QCAT".to_string()),
                ContractArg::Uint(18),
                ContractArg::Uint(2_000_000_000),
            ],
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { amount: 1 }
    }
}

impl Config {
    /// Load from `deploy.toml` (or `$DEPLOY_CONFIG`) and `DEPLOY__*` environment variables.
    /// Every value is optional and falls back to the built-in defaults.
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file)
    }

    pub fn load_from(file: &str) -> Result<Self> {
        let config_builder = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            // Environment variables with prefix "DEPLOY__", e.g. DEPLOY__NETWORK__RPC_URL
            .add_source(
                config::Environment::with_prefix("DEPLOY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| DeployError::Configuration(e.to_string()))?;

        let config: Config = config_builder
            .try_deserialize()
            .map_err(|e| DeployError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(DeployError::Configuration("network.rpc_url is empty".to_string()));
        }
        if self.contract.name.trim().is_empty() {
            return Err(DeployError::Configuration("contract.name is empty".to_string()));
        }
        if self.compiler.binary.trim().is_empty() {
            return Err(DeployError::Configuration("compiler.binary is empty".to_string()));
        }
        Ok(())
    }
}
