//! The deployment run: key, connection, compile, deploy, read, transfer

use std::fmt;
use std::io::Write;

use tracing::info;

use crate::caller::{contract_handle, wait_for_receipt, ContractCaller};
use crate::compiler::SolcCompiler;
use crate::config::Config;
use crate::deployer::Deployer;
use crate::error::{DeployError, Result};
use crate::key::{load_private_key, signer_from_key};
use crate::provider::NetworkClient;
use crate::record::{ContractRecord, Stage, StageTracker};

/// Run every stage once, in order, writing the progress lines to `out`.
///
/// The first failure stops the run and is returned wrapped with the stage
/// that was being attempted.
pub async fn run<W: Write>(config: &Config, out: &mut W) -> Result<ContractRecord> {
    let mut stages = StageTracker::new();

    let client = connect(config, &mut stages).await?;
    let record = deploy(config, &client, &mut stages, out).await?;
    exercise(&client, record, config.transfer.amount, &mut stages, out).await
}

async fn connect(config: &Config, stages: &mut StageTracker) -> Result<NetworkClient> {
    let private_key = load_private_key(&config.key.path)
        .await
        .map_err(|e| e.at(Stage::KeyLoaded))?;
    stages.advance(Stage::KeyLoaded)?;

    let signer = signer_from_key(&private_key).map_err(|e| e.at(Stage::Connected))?;
    let client = NetworkClient::new(&config.network.rpc_url, signer).map_err(|e| e.at(Stage::Connected))?;
    let block_number = client
        .check_connection()
        .await
        .map_err(|e| e.at(Stage::Connected))?;
    info!("Current block on {}: {}", config.network.rpc_url, block_number);
    stages.advance(Stage::Connected)?;

    Ok(client)
}

/// Compile the configured contract, submit its creation and wait for the address
pub async fn deploy<W: Write>(
    config: &Config,
    client: &NetworkClient,
    stages: &mut StageTracker,
    out: &mut W,
) -> Result<ContractRecord> {
    let mut record = ContractRecord::new(&config.contract.path, &config.contract.name);
    let compiled = SolcCompiler::new(&config.compiler)
        .compile(record.path(), record.name())
        .await
        .map_err(|e| e.at(Stage::Compiled))?;
    record.set_artifact(compiled.abi, compiled.bytecode)?;
    stages.advance(Stage::Compiled)?;

    let deployer = Deployer::new(client);
    let (abi, bytecode) = record.artifact()?;
    let pending = deployer
        .submit(abi, bytecode, &config.contract.constructor_args)
        .await
        .map_err(|e| e.at(Stage::Submitted))?;
    let deploy_tx = *pending.tx_hash();
    record.set_tx_hash(deploy_tx)?;
    announce(out, Stage::Submitted, format_args!("deployment tx in progress: {}", deploy_tx))?;
    stages.advance(Stage::Submitted)?;

    let address = deployer
        .confirm(pending)
        .await
        .map_err(|e| e.at(Stage::Confirmed))?;
    record.set_address(address)?;
    stages.advance(Stage::Confirmed)?;

    Ok(record)
}

/// Read `name()` from the deployed contract, then transfer `amount` to the signer itself.
///
/// "transfer completed!" is written only once the transfer receipt confirms success.
pub async fn exercise<W: Write>(
    client: &NetworkClient,
    mut record: ContractRecord,
    amount: u64,
    stages: &mut StageTracker,
    out: &mut W,
) -> Result<ContractRecord> {
    let address = record
        .address()
        .ok_or_else(|| DeployError::Record("contract has not been deployed".to_string()))?;
    let abi = record.artifact()?.0.clone();
    let instance = record.set_instance(contract_handle(client, address, abi))?;
    let caller = ContractCaller::new(instance);

    let on_chain_name = caller.name().await.map_err(|e| e.at(Stage::Queried))?;
    announce(out, Stage::Queried, format_args!("on-chain contract name: {}", on_chain_name))?;
    stages.advance(Stage::Queried)?;

    let pending = caller
        .transfer(client.signer_address(), amount)
        .await
        .map_err(|e| e.at(Stage::TransferSubmitted))?;
    announce(
        out,
        Stage::TransferSubmitted,
        format_args!("transfer tx in progress: {}", pending.tx_hash()),
    )?;
    stages.advance(Stage::TransferSubmitted)?;

    wait_for_receipt(pending)
        .await
        .map_err(|e| e.at(Stage::TransferConfirmed))?;
    stages.advance(Stage::TransferConfirmed)?;

    announce(out, Stage::Done, format_args!("transfer completed!"))?;
    stages.advance(Stage::Done)?;

    Ok(record)
}

/// Write one progress line and flush it before the next network wait
fn announce<W: Write>(out: &mut W, stage: Stage, line: fmt::Arguments<'_>) -> Result<()> {
    writeln!(out, "{}", line)
        .and_then(|_| out.flush())
        .map_err(|e| DeployError::Output(e).at(stage))
}
