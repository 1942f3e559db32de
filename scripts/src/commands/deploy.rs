//! Deploys a new Diamond with the standard facets

use alloy::primitives::{Address, Bytes};
use diamond_abi::diamond_constructor_args;
use diamond_core::manifest::Manifest;
use tracing::info;

use crate::{
    cli::{DeployArgs, ScriptConfig},
    commands::{add::add_remote_facet, cut::run_cut, DeployedContract, TaskContext},
    constants::{
        DIAMOND_CONTRACT, DIAMOND_CUT_FACET, DIAMOND_INIT, DIAMOND_LOUPE_FACET, OWNERSHIP_FACET,
    },
    errors::ScriptError,
    toolchain::compile,
    utils::parse_signer,
};

/// Deploys the Diamond and registers the standard facets on it.
///
/// The proxy is constructed with the cut and loupe facets. The manifest is then
/// seeded with all four standard facets and the ownership and init functions are
/// cut in.
pub async fn deploy(args: DeployArgs, config: &ScriptConfig) -> Result<(), ScriptError> {
    let owner = parse_signer(config)?.address();
    compile(config)?;
    let ctx = TaskContext::new(config)?;

    info!("deploying diamond owned by {owner:#x}");
    let mut to_verify = Vec::new();

    let cut_facet =
        deploy_or_reuse(&ctx, DIAMOND_CUT_FACET, args.diamond_cut_facet, &mut to_verify).await?;
    let loupe_facet =
        deploy_or_reuse(&ctx, DIAMOND_LOUPE_FACET, args.diamond_loupe_facet, &mut to_verify)
            .await?;

    let diamond = ctx
        .deploy_contract(
            DIAMOND_CONTRACT,
            &[],
            diamond_constructor_args(owner, cut_facet, loupe_facet),
        )
        .await?;
    let diamond_address = diamond.address;
    to_verify.push(diamond);

    let diamond_init =
        deploy_or_reuse(&ctx, DIAMOND_INIT, args.diamond_init, &mut to_verify).await?;

    let mut manifest = Manifest::for_diamond(diamond_address);
    manifest.save(&config.manifest)?;
    info!("diamond deployed at {diamond_address:#x}");

    let ownership_facet =
        deploy_or_reuse(&ctx, OWNERSHIP_FACET, args.ownership_facet, &mut to_verify).await?;

    ctx.verify_contracts(&to_verify).await;

    for (name, address) in [
        (DIAMOND_CUT_FACET, cut_facet),
        (DIAMOND_INIT, diamond_init),
        (DIAMOND_LOUPE_FACET, loupe_facet),
        (OWNERSHIP_FACET, ownership_facet),
    ] {
        let abi = ctx.artifacts.artifact(name)?.abi;
        add_remote_facet(&mut manifest, name, address, &abi, false)?;
        info!("added facet {name} to {}", config.manifest.display());
    }
    manifest.save(&config.manifest)?;

    run_cut(&ctx, diamond_address, manifest, None).await
}

/// Returns the given address, or deploys the named contract and queues it for
/// verification
async fn deploy_or_reuse(
    ctx: &TaskContext<'_>,
    name: &str,
    existing: Option<Address>,
    to_verify: &mut Vec<DeployedContract>,
) -> Result<Address, ScriptError> {
    if let Some(address) = existing {
        info!("using {name} at {address:#x}");
        return Ok(address);
    }

    let contract = ctx.deploy_contract(name, &[], Bytes::new()).await?;
    let address = contract.address;
    to_verify.push(contract);

    Ok(address)
}
