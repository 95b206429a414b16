//! Read and write calls against a deployed contract using its JSON ABI

use alloy::network::{Ethereum, ReceiptResponse};
use alloy_contract::{ContractInstance, Interface};
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, B256};
use alloy_provider::PendingTransactionBuilder;
use tracing::info;

use crate::args::{coerce_args, ContractArg};
use crate::error::{DeployError, Result};
use crate::provider::NetworkClient;
use crate::record::ContractHandle;

/// Build a live handle to the contract at `address`, signing with the client's wallet
pub fn contract_handle(client: &NetworkClient, address: Address, abi: JsonAbi) -> ContractHandle {
    ContractInstance::new(address, client.provider().clone(), Interface::new(abi))
}

/// Issues calls through a contract handle
pub struct ContractCaller<'a> {
    instance: &'a ContractHandle,
}

impl<'a> ContractCaller<'a> {
    pub fn new(instance: &'a ContractHandle) -> Self {
        Self { instance }
    }

    /// Get function by name
    pub fn get_function(&self, name: &str) -> Result<&Function> {
        self.instance
            .abi()
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| DeployError::ContractCall(format!("Function '{}' not found in ABI", name)))
    }

    /// Call a read-only function
    pub async fn call_function(&self, name: &str, args: &[ContractArg]) -> Result<Vec<DynSolValue>> {
        let values = coerce_args(&self.get_function(name)?.inputs, args)?;

        let call = self
            .instance
            .function(name, &values)
            .map_err(|e| DeployError::ContractCall(format!("Failed to create function call: {}", e)))?;

        let result = call
            .call()
            .await
            .map_err(|e| DeployError::ContractCall(format!("Function call '{}' failed: {}", name, e)))?;

        Ok(result)
    }

    /// Send a state-changing call without waiting for it to be mined
    pub async fn send_function(
        &self,
        name: &str,
        args: &[ContractArg],
    ) -> Result<PendingTransactionBuilder<Ethereum>> {
        let values = coerce_args(&self.get_function(name)?.inputs, args)?;

        let call = self
            .instance
            .function(name, &values)
            .map_err(|e| DeployError::ContractCall(format!("Failed to create transaction: {}", e)))?;

        let pending_tx = call
            .send()
            .await
            .map_err(|e| DeployError::Transaction(format!("Transaction '{}' failed: {}", name, e)))?;

        Ok(pending_tx)
    }

    /// `name()` of the token
    pub async fn name(&self) -> Result<String> {
        let result = self.call_function("name", &[]).await?;
        result
            .first()
            .and_then(|value| value.as_str())
            .map(|name| name.to_string())
            .ok_or_else(|| DeployError::Decoding("name() did not return a string".to_string()))
    }

    /// Submit `transfer(to, amount)`
    pub async fn transfer(&self, to: Address, amount: u64) -> Result<PendingTransactionBuilder<Ethereum>> {
        self.send_function("transfer", &transfer_args(to, amount)).await
    }
}

/// Arguments of `transfer(address,uint256)`, in call order
pub fn transfer_args(to: Address, amount: u64) -> Vec<ContractArg> {
    vec![ContractArg::from(to), ContractArg::from(amount)]
}

/// Wait for a submitted call to be mined; a reverted receipt is an error
pub async fn wait_for_receipt(pending: PendingTransactionBuilder<Ethereum>) -> Result<B256> {
    let tx_hash = *pending.tx_hash();
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| DeployError::Transaction(format!("Failed to get receipt for {}: {}", tx_hash, e)))?;

    check_receipt(&receipt)?;
    info!("Transaction {} mined in block {:?}", tx_hash, receipt.block_number());
    Ok(tx_hash)
}

/// A mined receipt counts only when its status is success
pub fn check_receipt<R: ReceiptResponse>(receipt: &R) -> Result<B256> {
    let tx_hash = receipt.transaction_hash();
    if !receipt.status() {
        return Err(DeployError::Transaction(format!("Transaction {} reverted", tx_hash)));
    }
    Ok(tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::network::EthereumWallet;
    use alloy::rpc::types::TransactionReceipt;
    use alloy::signers::local::PrivateKeySigner;
    use alloy_transport::mock::Asserter;
    use alloy_primitives::{Bytes, U256};
    use alloy_provider::{Provider, ProviderBuilder};

    const TOKEN_ABI: &str = r#"[
        {"inputs":[],"name":"name","outputs":[{"internalType":"string","name":"","type":"string"}],"stateMutability":"view","type":"function"},
        {"inputs":[{"internalType":"address","name":"to","type":"address"},{"internalType":"uint256","name":"value","type":"uint256"}],"name":"transfer","outputs":[{"internalType":"bool","name":"","type":"bool"}],"stateMutability":"nonpayable","type":"function"}
    ]"#;

    fn mocked_handle(asserter: &Asserter) -> (NetworkClient, ContractHandle) {
        let signer = PrivateKeySigner::random();
        let signer_address = signer.address();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .connect_mocked_client(asserter.clone())
            .erased();
        let client = NetworkClient::from_provider(provider, signer_address);
        let abi: JsonAbi = serde_json::from_str(TOKEN_ABI).unwrap();
        let instance = contract_handle(&client, Address::repeat_byte(0x42), abi);
        (client, instance)
    }

    fn receipt(status: bool) -> TransactionReceipt {
        serde_json::from_value(serde_json::json!({
            "transactionHash": format!("{}", B256::repeat_byte(0xab)),
            "transactionIndex": "0x0",
            "blockHash": format!("{}", B256::repeat_byte(0x01)),
            "blockNumber": "0x10",
            "from": format!("{}", Address::repeat_byte(0x11)),
            "to": format!("{}", Address::repeat_byte(0x42)),
            "contractAddress": null,
            "cumulativeGasUsed": "0xb4e0",
            "gasUsed": "0xb4e0",
            "effectiveGasPrice": "0x3b9aca00",
            "logs": [],
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "type": "0x2",
            "status": if status { "0x1" } else { "0x0" },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_points_at_address() {
        let (_client, instance) = mocked_handle(&Asserter::new());
        let caller = ContractCaller::new(&instance);

        assert_eq!(*instance.address(), Address::repeat_byte(0x42));
        assert!(caller.get_function("transfer").is_ok());
        assert!(caller.get_function("mint").is_err());
    }

    #[tokio::test]
    async fn test_transfer_to_self_encodes_amount_one() {
        let (client, instance) = mocked_handle(&Asserter::new());
        let caller = ContractCaller::new(&instance);
        let me = client.signer_address();

        let transfer = caller.get_function("transfer").unwrap();
        let values = coerce_args(&transfer.inputs, &transfer_args(me, 1)).unwrap();
        assert_eq!(
            values,
            vec![DynSolValue::Address(me), DynSolValue::Uint(U256::from(1), 256)]
        );
    }

    #[tokio::test]
    async fn test_name_decodes_string_result() {
        let asserter = Asserter::new();
        let encoded = DynSolValue::Tuple(vec![DynSolValue::String("The Quantum Cat".to_string())])
            .abi_encode_params();
        asserter.push_success(&Bytes::from(encoded));

        let (_client, instance) = mocked_handle(&asserter);
        let name = ContractCaller::new(&instance).name().await.unwrap();
        assert_eq!(name, "The Quantum Cat");
    }

    #[tokio::test]
    async fn test_name_rpc_failure() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("execution reverted");

        let (_client, instance) = mocked_handle(&asserter);
        let err = ContractCaller::new(&instance).name().await.unwrap_err();
        assert!(matches!(err, DeployError::ContractCall(_)));
    }

    #[tokio::test]
    async fn test_rejected_transfer() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("insufficient funds for gas * price + value");

        let (client, instance) = mocked_handle(&asserter);
        let err = ContractCaller::new(&instance)
            .transfer(client.signer_address(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Transaction(_)));
    }

    #[test]
    fn test_check_receipt() {
        assert_eq!(check_receipt(&receipt(true)).unwrap(), B256::repeat_byte(0xab));

        let err = check_receipt(&receipt(false)).unwrap_err();
        assert!(matches!(err, DeployError::Transaction(_)));
        assert!(err.to_string().contains("reverted"));
    }
}
