//! Error types for the deployment pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::record::Stage;

/// Result type alias
pub type Result<T> = std::result::Result<T, DeployError>;

/// Main error type for the deployment pipeline
#[derive(Debug, Error)]
pub enum DeployError {
    /// Key file does not exist
    #[error("private key '{}' was not found! exiting.", path.display())]
    KeyFileMissing { path: PathBuf },

    /// Key file exists but could not be read
    #[error("Failed to read private key file {}: {source}", path.display())]
    KeyFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key contents rejected by the signer
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Compiler process could not be started
    #[error("Failed to run compiler '{binary}': {source}")]
    CompilerSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// Compiler process exited unsuccessfully
    #[error("Compiler exited with {status}: {stderr}")]
    CompilerFailed { status: String, stderr: String },

    /// Compiler output was not in the expected shape
    #[error("Invalid compiler output: {0}")]
    CompilerOutput(String),

    /// Requested contract is absent from the compiler output
    #[error("Contract '{key}' not found in compiler output (available: {available:?})")]
    ContractNotFound { key: String, available: Vec<String> },

    /// Encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Decoding error
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Deployment error
    #[error("Deployment error: {0}")]
    Deployment(String),

    /// Contract call error
    #[error("Contract call error: {0}")]
    ContractCall(String),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Record filled out of order or twice
    #[error("Contract record error: {0}")]
    Record(String),

    /// Progress line could not be written
    #[error("Failed to write progress: {0}")]
    Output(#[source] std::io::Error),

    /// Pipeline failed while in a given stage
    #[error("Pipeline halted at {stage}: {source}")]
    Halted {
        stage: Stage,
        #[source]
        source: Box<DeployError>,
    },
}

impl DeployError {
    /// Wrap an error with the stage the pipeline had reached
    pub fn at(self, stage: Stage) -> Self {
        match self {
            already @ DeployError::Halted { .. } => already,
            other => DeployError::Halted {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, unwrapping any stage wrapper
    pub fn root(&self) -> &DeployError {
        match self {
            DeployError::Halted { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error (or the one it wraps) is the missing key file
    pub fn is_key_missing(&self) -> bool {
        matches!(self.root(), DeployError::KeyFileMissing { .. })
    }
}
