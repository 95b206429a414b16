//! JSON-RPC connection with a local signing wallet attached

use alloy::network::EthereumWallet;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use tracing::info;

use crate::error::{DeployError, Result};

/// Provider plus the identity that signs everything sent through it
#[derive(Clone)]
pub struct NetworkClient {
    provider: DynProvider,
    signer_address: Address,
}

impl NetworkClient {
    /// Connect to `rpc_url` with `signer` as the default transaction signer.
    ///
    /// Nonce, gas and chain id are filled by the provider's recommended fillers.
    pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self> {
        let http_url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| DeployError::Configuration(format!("Invalid RPC URL: {}", e)))?;

        let signer_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(http_url)
            .erased();

        info!("Connected to {} as {}", rpc_url, signer_address);

        Ok(Self::from_provider(provider, signer_address))
    }

    /// Wrap an already built provider whose wallet signs as `signer_address`
    pub fn from_provider(provider: DynProvider, signer_address: Address) -> Self {
        Self {
            provider,
            signer_address,
        }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Address derived from the loaded private key
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Check connection to the RPC endpoint
    pub async fn check_connection(&self) -> Result<u64> {
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| DeployError::Provider(format!("Failed to get block number: {}", e)))?;

        Ok(block_number)
    }
}
