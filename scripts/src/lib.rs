//! Scripts for deploying and upgrading an EIP-2535 Diamond from a local manifest.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod constants;
pub mod errors;
pub mod explorer;
pub mod toolchain;
pub mod utils;
