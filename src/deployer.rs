//! Contract deployment: constructor encoding, submission and confirmation

use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::JsonAbiExt;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{PendingTransactionBuilder, Provider};
use tracing::{debug, info};

use crate::args::{coerce_args, ContractArg};
use crate::error::{DeployError, Result};
use crate::provider::NetworkClient;

/// Creation bytecode followed by the ABI-encoded constructor arguments
pub fn encode_deploy_code(abi: &JsonAbi, bytecode: &Bytes, args: &[ContractArg]) -> Result<Bytes> {
    let encoded_args = match abi.constructor() {
        Some(constructor) => {
            let values = coerce_args(&constructor.inputs, args)?;
            constructor.abi_encode_input(&values).map_err(|e| {
                DeployError::Encoding(format!("Failed to encode constructor arguments: {}", e))
            })?
        }
        None if args.is_empty() => Vec::new(),
        None => {
            return Err(DeployError::Encoding(format!(
                "Contract has no constructor but {} arguments were given",
                args.len()
            )))
        }
    };

    let mut code = Vec::with_capacity(bytecode.len() + encoded_args.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(&encoded_args);
    Ok(Bytes::from(code))
}

/// Submits contract creation transactions through a [`NetworkClient`]
pub struct Deployer<'a> {
    client: &'a NetworkClient,
}

impl<'a> Deployer<'a> {
    pub fn new(client: &'a NetworkClient) -> Self {
        Self { client }
    }

    /// Send the creation transaction without waiting for it to be mined
    pub async fn submit(
        &self,
        abi: &JsonAbi,
        bytecode: &Bytes,
        args: &[ContractArg],
    ) -> Result<PendingTransactionBuilder<Ethereum>> {
        let code = encode_deploy_code(abi, bytecode, args)?;
        debug!("Deploy code is {} bytes ({} constructor args)", code.len(), args.len());

        let tx = TransactionRequest::default()
            .with_from(self.client.signer_address())
            .with_deploy_code(code);

        let pending = self
            .client
            .provider()
            .send_transaction(tx)
            .await
            .map_err(|e| DeployError::Deployment(format!("Failed to submit deployment: {}", e)))?;

        Ok(pending)
    }

    /// Wait for the creation receipt and return the new contract's address
    pub async fn confirm(&self, pending: PendingTransactionBuilder<Ethereum>) -> Result<Address> {
        let tx_hash: B256 = *pending.tx_hash();
        let receipt = pending.get_receipt().await.map_err(|e| {
            DeployError::Deployment(format!("Failed to confirm deployment {}: {}", tx_hash, e))
        })?;

        let address = deployed_address(&receipt)?;
        info!(
            "Contract deployed at {} in block {:?} (gas used {})",
            address,
            receipt.block_number(),
            receipt.gas_used()
        );
        Ok(address)
    }
}

/// Address of the contract created by a mined deployment.
///
/// A reverted receipt, or one without a contract address, means nothing was deployed.
pub fn deployed_address<R: ReceiptResponse>(receipt: &R) -> Result<Address> {
    let tx_hash = receipt.transaction_hash();
    if !receipt.status() {
        return Err(DeployError::Deployment(format!(
            "Deployment transaction {} reverted",
            tx_hash
        )));
    }

    receipt.contract_address().ok_or_else(|| {
        DeployError::Deployment(format!("Receipt for {} has no contract address", tx_hash))
    })
}
