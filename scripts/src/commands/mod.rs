//! Implementations of the Diamond management commands

pub mod add;
pub mod cut;
pub mod deploy;
pub mod init;
pub mod remove;
pub mod status;

use std::collections::BTreeMap;

use alloy::{
    primitives::{Address, Bytes},
    providers::DynProvider,
};
use tracing::{debug, info, warn};

use crate::{
    artifacts::ArtifactStore,
    cli::ScriptConfig,
    errors::ScriptError,
    explorer::{ExplorerClient, VerificationRequest},
    utils::{deploy_bytecode, setup_client},
};

/// The collaborators a command talks to
pub struct TaskContext<'a> {
    /// The script configuration
    pub config: &'a ScriptConfig,
    /// The chain client
    pub client: DynProvider,
    /// The local build artifacts
    pub artifacts: ArtifactStore,
    /// The block explorer, if one is configured
    pub explorer: Option<ExplorerClient>,
}

/// A contract deployed during a run, pending verification
pub struct DeployedContract {
    /// The artifact name
    pub name: String,
    /// The deployed address
    pub address: Address,
    /// The ABI-encoded constructor arguments
    pub constructor_args: Bytes,
}

impl<'a> TaskContext<'a> {
    /// Sets up the collaborators from the script configuration
    pub fn new(config: &'a ScriptConfig) -> Result<Self, ScriptError> {
        Ok(Self {
            config,
            client: setup_client(config)?,
            artifacts: ArtifactStore::new(&config.artifacts_dir),
            explorer: ExplorerClient::from_config(config),
        })
    }

    /// Deploys a contract from its artifact, deploying and linking its libraries
    /// first, one at a time
    pub async fn deploy_contract(
        &self,
        name: &str,
        links: &[String],
        constructor_args: Bytes,
    ) -> Result<DeployedContract, ScriptError> {
        let mut libraries = BTreeMap::new();
        for link in links {
            let library = self.artifacts.artifact(link)?;
            let code = library.link(&BTreeMap::new())?;
            let address = deploy_bytecode(&self.client, link, code).await?;
            libraries.insert(link.clone(), address);
        }

        let artifact = self.artifacts.artifact(name)?;
        let mut creation_code = artifact.link(&libraries)?.to_vec();
        creation_code.extend_from_slice(&constructor_args);
        let address = deploy_bytecode(&self.client, name, creation_code.into()).await?;

        Ok(DeployedContract {
            name: name.to_string(),
            address,
            constructor_args,
        })
    }

    /// Submits deployed contracts to the explorer for verification.
    ///
    /// Failures are logged and never abort the run.
    pub async fn verify_contracts(&self, contracts: &[DeployedContract]) {
        let Some(explorer) = &self.explorer else {
            debug!("no explorer configured, skipping verification");
            return;
        };

        for contract in contracts {
            match self.verify_contract(explorer, contract).await {
                Ok(guid) => info!("{} submitted for verification ({guid})", contract.name),
                Err(e) => warn!("could not verify {}: {e}", contract.name),
            }
        }
    }

    /// Submits a single contract for verification
    async fn verify_contract(
        &self,
        explorer: &ExplorerClient,
        contract: &DeployedContract,
    ) -> Result<String, ScriptError> {
        let artifact = self.artifacts.artifact(&contract.name)?;
        let build_info = self.artifacts.build_info(&contract.name)?;

        explorer
            .verify(VerificationRequest {
                address: contract.address,
                artifact: &artifact,
                build_info: &build_info,
                constructor_args: &contract.constructor_args,
            })
            .await
    }
}
