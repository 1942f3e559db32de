//! Utilities for talking to the chain and to the deployed Diamond

use std::str::FromStr;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use diamond_abi::{IDiamondCut, IDiamondLoupe};
use diamond_core::{
    manifest::Manifest,
    state::{DiamondState, RemoteFacet},
    types::CutEntry,
};
use tracing::{debug, info};

use crate::{
    cli::ScriptConfig, constants::CUT_GAS_LIMIT, errors::ScriptError, explorer::ExplorerClient,
};

/// Parses the configured private key
pub fn parse_signer(config: &ScriptConfig) -> Result<PrivateKeySigner, ScriptError> {
    let key = config.priv_key.as_deref().ok_or_else(|| {
        ScriptError::ClientInitialization("a private key is required, set --priv-key".to_string())
    })?;

    PrivateKeySigner::from_str(key).map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// Sets up the client with which to query and transact with the chain.
///
/// The client signs with the configured private key if there is one, and is
/// read-only otherwise.
pub fn setup_client(config: &ScriptConfig) -> Result<DynProvider, ScriptError> {
    let url = Url::parse(&config.rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    if config.priv_key.is_none() {
        return Ok(DynProvider::new(ProviderBuilder::new().connect_http(url)));
    }

    let signer = parse_signer(config)?;
    let provider = ProviderBuilder::new()
        .wallet(signer)
        .with_simple_nonce_management()
        .connect_http(url);

    Ok(DynProvider::new(provider))
}

/// Resolves the Diamond's address from the CLI, falling back to the manifest
pub fn diamond_address(
    address: Option<Address>,
    manifest: &Manifest,
) -> Result<Address, ScriptError> {
    address
        .or(manifest.address)
        .ok_or(ScriptError::MissingDiamondAddress)
}

/// Deploys a contract from its creation code and waits for the receipt
pub async fn deploy_bytecode(
    client: &DynProvider,
    name: &str,
    creation_code: Bytes,
) -> Result<Address, ScriptError> {
    let tx = TransactionRequest::default().with_deploy_code(creation_code);
    let receipt = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(format!("{name}: {e}")))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(format!("{name}: {e}")))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "{name}: deployment reverted in {:#x}",
            receipt.transaction_hash
        )));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!("{name}: no contract address in receipt"))
    })?;
    info!("{name} deployed at {address:#x}");

    Ok(address)
}

// ---------------------
// | Diamond Interface |
// ---------------------

/// Fetches the facets and selectors registered on the Diamond through its loupe.
///
/// Each facet is named after the manifest contract recorded at its address, then
/// after its verified name on the explorer, and otherwise after the address itself.
/// An explorer name taken by a facet pending deployment is keyed as `name@address`.
pub async fn fetch_remote_state(
    client: &DynProvider,
    diamond: Address,
    manifest: &Manifest,
    explorer: Option<&ExplorerClient>,
) -> Result<DiamondState, ScriptError> {
    let loupe = IDiamondLoupe::new(diamond, client.clone());
    let addresses = loupe
        .facetAddresses()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let mut facets = Vec::with_capacity(addresses.len());
    for address in addresses {
        let selectors = loupe
            .facetFunctionSelectors(address)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        let name = remote_facet_name(address, manifest, explorer).await;
        debug!("facet {name} at {address:#x} has {} selectors", selectors.len());
        facets.push(RemoteFacet {
            name,
            address,
            selectors,
        });
    }

    Ok(DiamondState::from_remote_facets(facets)?)
}

/// Names a facet found on the Diamond
async fn remote_facet_name(
    address: Address,
    manifest: &Manifest,
    explorer: Option<&ExplorerClient>,
) -> String {
    if let Some(facet) = manifest.contract_at(address) {
        return facet.name.clone();
    }

    if let Some(explorer) = explorer {
        match explorer.contract_metadata(address).await {
            Ok(metadata) => return manifest.remote_facet_key(metadata.name, address),
            Err(e) => debug!("no explorer name for {address:#x}: {e}"),
        }
    }

    address.to_string()
}

/// Sends a `diamondCut` transaction and waits for it to succeed
pub async fn send_cut(
    client: &DynProvider,
    diamond: Address,
    entries: &[CutEntry],
    init: Address,
    calldata: Bytes,
) -> Result<TxHash, ScriptError> {
    let cut_facet = IDiamondCut::new(diamond, client.clone());
    let cut: Vec<IDiamondCut::FacetCut> = entries.iter().map(Into::into).collect();

    let pending_tx = cut_facet
        .diamondCut(cut, init, calldata)
        .gas(CUT_GAS_LIMIT)
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let tx_hash = *pending_tx.tx_hash();
    info!("diamond cut sent in {tx_hash:#x}");

    let receipt = pending_tx
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if !receipt.status() {
        return Err(ScriptError::CutFailed { tx_hash });
    }

    Ok(tx_hash)
}
