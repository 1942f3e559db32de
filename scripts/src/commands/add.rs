//! Registers a facet and its functions in the manifest

use std::{fs, path::Path};

use alloy::{json_abi::JsonAbi, primitives::Address};
use diamond_core::{
    errors::DiamondError,
    introspection::{functions_from_abi, FacetIntrospection},
    manifest::Manifest,
    types::Facet,
};
use serde_json::Value;
use tracing::info;

use crate::{
    artifacts::{read_json, ArtifactStore},
    cli::{AddArgs, ScriptConfig},
    errors::ScriptError,
    explorer::ExplorerClient,
    toolchain::compile,
};

/// Adds a remote or local facet to the manifest
pub async fn add(args: AddArgs, config: &ScriptConfig) -> Result<(), ScriptError> {
    let mut manifest = Manifest::load_or_default(&config.manifest)?;

    let name = if args.remote {
        add_remote(&args, config, &mut manifest).await?
    } else {
        add_local(&args, config, &mut manifest)?
    };

    manifest.save(&config.manifest)?;
    info!("added facet {name} to {}", config.manifest.display());
    Ok(())
}

/// Adds a deployed facet, reading its ABI from a file or from the explorer
async fn add_remote(
    args: &AddArgs,
    config: &ScriptConfig,
    manifest: &mut Manifest,
) -> Result<String, ScriptError> {
    let address = args.address.ok_or_else(|| {
        ScriptError::InvalidArguments("--remote requires --address".to_string())
    })?;

    let (name, abi, metadata) = match (&args.abi, ExplorerClient::from_config(config)) {
        (Some(path), _) => {
            let abi = read_abi_file(path)?;
            let name = args.name.clone().ok_or_else(|| {
                ScriptError::InvalidArguments("--abi requires --name".to_string())
            })?;
            let metadata = serde_json::to_value(&abi)
                .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
            (name, abi, metadata)
        }
        (None, Some(explorer)) => {
            let metadata = explorer.contract_metadata(address).await?;
            let name = args.name.clone().unwrap_or(metadata.name);
            (name, metadata.abi, metadata.raw)
        }
        (None, None) => {
            return Err(ScriptError::Explorer(
                "no ABI source for a remote facet, pass --abi or configure an explorer"
                    .to_string(),
            ))
        }
    };

    add_remote_facet(manifest, &name, address, &abi, args.skip_functions)?;

    if args.save_metadata {
        save_metadata(&config.metadata_dir, &name, &metadata)?;
    }

    Ok(name)
}

/// Adds a facet to be deployed from the local artifacts
fn add_local(
    args: &AddArgs,
    config: &ScriptConfig,
    manifest: &mut Manifest,
) -> Result<String, ScriptError> {
    let name = args.name.clone().ok_or_else(|| {
        ScriptError::InvalidArguments("--local requires --name".to_string())
    })?;

    compile(config)?;
    let artifact = ArtifactStore::new(&config.artifacts_dir).artifact(&name)?;
    add_local_facet(
        manifest,
        &name,
        args.links.clone(),
        &artifact.abi,
        args.skip_functions,
    )?;

    Ok(name)
}

/// Records a deployed facet and, unless skipped, assigns it every function in its ABI
pub fn add_remote_facet(
    manifest: &mut Manifest,
    name: &str,
    address: Address,
    abi: &JsonAbi,
    skip_functions: bool,
) -> Result<(), DiamondError> {
    manifest.insert_facet(Facet::remote(name, address));
    if skip_functions {
        return Ok(());
    }

    let facet = FacetIntrospection::new(address, abi);
    manifest.add_functions(name, &facet.functions)
}

/// Records a facet pending deployment and, unless skipped, assigns it every
/// function in its ABI
pub fn add_local_facet(
    manifest: &mut Manifest,
    name: &str,
    links: Vec<String>,
    abi: &JsonAbi,
    skip_functions: bool,
) -> Result<(), DiamondError> {
    let links = links.into_iter().filter(|link| !link.is_empty()).collect();
    manifest.insert_facet(Facet::local(name, links));
    if skip_functions {
        return Ok(());
    }

    manifest.add_functions(name, &functions_from_abi(abi))
}

/// Reads an ABI from either a bare ABI file or a build artifact
fn read_abi_file(path: &Path) -> Result<JsonAbi, ScriptError> {
    let value: Value = read_json(path)?;
    let abi = match value.get("abi") {
        Some(abi) => abi.clone(),
        None => value,
    };

    serde_json::from_value(abi)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}

/// Writes a facet's metadata to `<dir>/<name>.json`
fn save_metadata(dir: &Path, name: &str, metadata: &Value) -> Result<(), ScriptError> {
    fs::create_dir_all(dir).map_err(|e| ScriptError::WriteFile(e.to_string()))?;
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, metadata.to_string())
        .map_err(|e| ScriptError::WriteFile(format!("{}: {e}", path.display())))?;

    info!("saved metadata of {name} to {}", path.display());
    Ok(())
}
