//! In-memory record of the contract being deployed and the pipeline stages

use std::fmt;
use std::path::{Path, PathBuf};

use alloy_contract::ContractInstance;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::DynProvider;

use crate::error::{DeployError, Result};

/// Live handle to a deployed contract
pub type ContractHandle = ContractInstance<DynProvider>;

/// Pipeline stages, in the only order they can be reached.
///
/// When the pipeline fails, the error carries the stage it was trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    KeyLoaded,
    Connected,
    Compiled,
    Submitted,
    Confirmed,
    Queried,
    TransferSubmitted,
    TransferConfirmed,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::KeyLoaded,
        Stage::Connected,
        Stage::Compiled,
        Stage::Submitted,
        Stage::Confirmed,
        Stage::Queried,
        Stage::TransferSubmitted,
        Stage::TransferConfirmed,
        Stage::Done,
    ];

    /// The stage following this one, `None` once done
    pub fn next(self) -> Option<Stage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::KeyLoaded => "KeyLoaded",
            Stage::Connected => "Connected",
            Stage::Compiled => "Compiled",
            Stage::Submitted => "Submitted",
            Stage::Confirmed => "Confirmed",
            Stage::Queried => "Queried",
            Stage::TransferSubmitted => "TransferSubmitted",
            Stage::TransferConfirmed => "TransferConfirmed",
            Stage::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Tracks the current stage; only ever moves forward one step at a time
#[derive(Debug, Default)]
pub struct StageTracker {
    current: Option<Stage>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stage reached, `None` before the key is loaded
    pub fn current(&self) -> Option<Stage> {
        self.current
    }

    /// The stage the pipeline is working towards
    pub fn pending(&self) -> Option<Stage> {
        match self.current {
            None => Some(Stage::KeyLoaded),
            Some(stage) => stage.next(),
        }
    }

    /// Move to `stage`, which must be the immediate successor of the current one
    pub fn advance(&mut self, stage: Stage) -> Result<()> {
        if self.pending() != Some(stage) {
            return Err(DeployError::Record(format!(
                "cannot move from {:?} to {}",
                self.current, stage
            )));
        }
        tracing::info!(stage = %stage, "Pipeline stage reached");
        self.current = Some(stage);
        Ok(())
    }
}

/// The contract being deployed.
///
/// Fields are filled left to right: artifact (ABI and bytecode), deployment
/// transaction hash, address, handle. Each setter refuses to run out of order
/// or to overwrite a value.
pub struct ContractRecord {
    path: PathBuf,
    name: String,
    abi: Option<JsonAbi>,
    bytecode: Option<Bytes>,
    tx_hash: Option<B256>,
    address: Option<Address>,
    instance: Option<ContractHandle>,
}

impl ContractRecord {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            abi: None,
            bytecode: None,
            tx_hash: None,
            address: None,
            instance: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of this contract in solc's combined JSON output
    pub fn artifact_key(&self) -> String {
        crate::compiler::artifact_key(&self.path, &self.name)
    }

    /// ABI and creation bytecode, once compiled
    pub fn artifact(&self) -> Result<(&JsonAbi, &Bytes)> {
        match (&self.abi, &self.bytecode) {
            (Some(abi), Some(bytecode)) => Ok((abi, bytecode)),
            _ => Err(DeployError::Record(format!(
                "{} has not been compiled",
                self.artifact_key()
            ))),
        }
    }

    pub fn tx_hash(&self) -> Option<B256> {
        self.tx_hash
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn set_artifact(&mut self, abi: JsonAbi, bytecode: Bytes) -> Result<()> {
        if self.abi.is_some() {
            return Err(DeployError::Record("artifact already set".to_string()));
        }
        self.abi = Some(abi);
        self.bytecode = Some(bytecode);
        Ok(())
    }

    pub fn set_tx_hash(&mut self, tx_hash: B256) -> Result<()> {
        if self.abi.is_none() {
            return Err(DeployError::Record(
                "deployment submitted before compilation".to_string(),
            ));
        }
        if self.tx_hash.is_some() {
            return Err(DeployError::Record("deployment tx hash already set".to_string()));
        }
        self.tx_hash = Some(tx_hash);
        Ok(())
    }

    pub fn set_address(&mut self, address: Address) -> Result<()> {
        if self.tx_hash.is_none() {
            return Err(DeployError::Record(
                "address set before deployment was submitted".to_string(),
            ));
        }
        if self.address.is_some() {
            return Err(DeployError::Record("address already set".to_string()));
        }
        self.address = Some(address);
        Ok(())
    }

    pub fn set_instance(&mut self, instance: ContractHandle) -> Result<&ContractHandle> {
        if self.address.is_none() {
            return Err(DeployError::Record(
                "instance created before deployment was confirmed".to_string(),
            ));
        }
        if self.instance.is_some() {
            return Err(DeployError::Record("instance already set".to_string()));
        }
        let instance: &ContractHandle = self.instance.insert(instance);
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut tracker = StageTracker::new();
        for stage in Stage::ALL {
            tracker.advance(stage).unwrap();
        }
        assert_eq!(tracker.current(), Some(Stage::Done));
        assert_eq!(tracker.pending(), None);
    }

    #[test]
    fn test_stage_cannot_skip_or_repeat() {
        let mut tracker = StageTracker::new();
        assert!(tracker.advance(Stage::Connected).is_err());

        tracker.advance(Stage::KeyLoaded).unwrap();
        assert!(tracker.advance(Stage::KeyLoaded).is_err());
        assert_eq!(tracker.pending(), Some(Stage::Connected));
    }

    #[test]
    fn test_artifact_key() {
        let record = ContractRecord::new("sample.sol", "SampleToken");
        assert_eq!(record.artifact_key(), "sample.sol:SampleToken");
    }

    #[test]
    fn test_record_fills_in_order() {
        let mut record = ContractRecord::new("sample.sol", "SampleToken");

        assert!(record.artifact().is_err());
        assert!(record.set_tx_hash(B256::ZERO).is_err());
        assert!(record.set_address(Address::ZERO).is_err());

        record
            .set_artifact(JsonAbi::new(), Bytes::from_static(&[0x60, 0x80]))
            .unwrap();
        assert_eq!(record.artifact().unwrap().1, &Bytes::from_static(&[0x60, 0x80]));
        assert!(record
            .set_artifact(JsonAbi::new(), Bytes::new())
            .is_err());

        assert!(record.set_address(Address::ZERO).is_err());
        record.set_tx_hash(B256::repeat_byte(1)).unwrap();
        assert!(record.set_tx_hash(B256::repeat_byte(2)).is_err());
        assert_eq!(record.tx_hash(), Some(B256::repeat_byte(1)));

        record.set_address(Address::repeat_byte(7)).unwrap();
        assert!(record.set_address(Address::ZERO).is_err());
        assert_eq!(record.address(), Some(Address::repeat_byte(7)));
    }
}
