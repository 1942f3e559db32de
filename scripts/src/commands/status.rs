//! Reports the differences between the manifest and the deployed Diamond

use std::fmt::Write;

use alloy::primitives::Address;
use diamond_abi::IERC173;
use diamond_core::{
    manifest::Manifest,
    reconciler::{Diff, Reconciler},
};
use tracing::debug;

use crate::{
    cli::{ScriptConfig, StatusArgs},
    errors::ScriptError,
    explorer::ExplorerClient,
    utils::{diamond_address, fetch_remote_state, setup_client},
};

/// Prints the changes a cut would make, without sending anything
pub async fn status(args: StatusArgs, config: &ScriptConfig) -> Result<(), ScriptError> {
    let manifest = Manifest::load(&config.manifest)?;
    let diamond = diamond_address(args.address, &manifest)?;
    let client = setup_client(config)?;
    let explorer = ExplorerClient::from_config(config);

    let remote = fetch_remote_state(&client, diamond, &manifest, explorer.as_ref()).await?;
    let local = manifest.to_state()?;
    let diff = Reconciler::new(&remote, &local).diff();

    let owner = match IERC173::new(diamond, client.clone()).owner().call().await {
        Ok(owner) => Some(owner),
        Err(e) => {
            debug!("could not fetch the diamond owner: {e}");
            None
        }
    };

    print!("{}", format_status(diamond, owner, &diff));
    Ok(())
}

/// Renders a diff as a human-readable report
pub fn format_status(diamond: Address, owner: Option<Address>, diff: &Diff) -> String {
    let mut out = String::new();
    // Writing to a `String` cannot fail
    let _ = writeln!(out, "Diamond {diamond}");
    if let Some(owner) = owner {
        let _ = writeln!(out, "Owner   {owner}");
    }

    for (label, changes) in [
        ("Add", &diff.add),
        ("Remove", &diff.remove),
        ("Replace", &diff.replace),
    ] {
        let _ = writeln!(out, "\n{label}: {}", changes.len());
        for change in changes {
            let _ = writeln!(out, "\t{change}");
        }
    }

    let _ = writeln!(out, "\nContracts to deploy: {}", diff.deploy.len());
    for facet in &diff.deploy {
        if facet.links.is_empty() {
            let _ = writeln!(out, "\t{}", facet.name);
        } else {
            let _ = writeln!(out, "\t{} (links {})", facet.name, facet.links.join(", "));
        }
    }

    out
}
