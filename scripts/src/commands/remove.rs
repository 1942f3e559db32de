//! Strips a facet's functions from the manifest

use diamond_core::manifest::Manifest;
use tracing::{info, warn};

use crate::{
    cli::{RemoveArgs, ScriptConfig},
    errors::ScriptError,
};

/// Removes every function owned by the named facet from the manifest.
///
/// The facet's contract record is kept, so a later cut can still resolve the
/// facet's address.
pub fn remove(args: RemoveArgs, config: &ScriptConfig) -> Result<(), ScriptError> {
    let mut manifest = Manifest::load(&config.manifest)?;

    let removed = manifest.remove_facet_functions(&args.name);
    if removed == 0 {
        warn!("facet {} owns no functions", args.name);
    }

    manifest.save(&config.manifest)?;
    info!(
        "removed {removed} functions of facet {} from {}",
        args.name,
        config.manifest.display()
    );

    Ok(())
}
