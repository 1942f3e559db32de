//! Definitions of errors that can occur during the execution of the Diamond management scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy::primitives::TxHash;
use diamond_core::errors::DiamondError;

/// Errors that can occur during the execution of the Diamond management scripts
#[derive(Debug)]
pub enum ScriptError {
    /// The manifest is malformed or inconsistent with the observed state
    Manifest(DiamondError),
    /// Error reading an input file
    ReadFile(String),
    /// Error writing an output file
    WriteFile(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// The command line arguments are incomplete for the requested operation
    InvalidArguments(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error running the compilation toolchain
    Compilation(String),
    /// Error talking to the block explorer
    Explorer(String),
    /// Neither the CLI nor the manifest name the Diamond's address
    MissingDiamondAddress,
    /// The `diamondCut` transaction was mined but reverted
    CutFailed {
        /// The hash of the reverted transaction
        tx_hash: TxHash,
    },
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Manifest(e) => write!(f, "manifest error: {}", e),
            ScriptError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ScriptError::WriteFile(s) => write!(f, "error writing file: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::InvalidArguments(s) => write!(f, "invalid arguments: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Compilation(s) => write!(f, "error compiling contracts: {}", s),
            ScriptError::Explorer(s) => write!(f, "block explorer error: {}", s),
            ScriptError::MissingDiamondAddress => write!(
                f,
                "no diamond address given, pass --address or deploy the diamond first"
            ),
            ScriptError::CutFailed { tx_hash } => {
                write!(f, "diamond upgrade failed: {:#x}", tx_hash)
            }
        }
    }
}

impl Error for ScriptError {}

impl From<DiamondError> for ScriptError {
    fn from(e: DiamondError) -> Self {
        ScriptError::Manifest(e)
    }
}
