//! Compile, deploy and exercise the `SampleToken` contract on an EVM test network.
//!
//! The run is a single linear pipeline (see [`pipeline::run`]):
//! load the private key, connect, compile with `solc`, deploy with the fixed
//! constructor arguments, read `name()` and finally `transfer` one unit to the
//! deployer's own address.

pub mod args;
pub mod caller;
pub mod compiler;
pub mod config;
pub mod deployer;
pub mod error;
pub mod key;
pub mod pipeline;
pub mod provider;
pub mod record;

pub use crate::config::Config;
pub use crate::error::{DeployError, Result};
pub use crate::record::{ContractRecord, Stage};
