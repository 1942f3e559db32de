//! Batching of selector changes into `diamondCut` entries

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, Selector};

use crate::{
    errors::DiamondError,
    reconciler::Diff,
    state::DiamondState,
    types::{CutEntry, FacetCutAction},
};

/// Groups selectors into cut entries, one per distinct `(address, action)` pair.
///
/// Entries appear in order of the first selector routed to them, and selectors keep
/// their order of discovery within an entry.
pub fn group_cut(
    changes: impl IntoIterator<Item = (Address, FacetCutAction, Selector)>,
) -> Vec<CutEntry> {
    let mut entries: Vec<CutEntry> = Vec::new();
    let mut index: HashMap<(Address, FacetCutAction), usize> = HashMap::new();

    for (facet_address, action, selector) in changes {
        let idx = *index.entry((facet_address, action)).or_insert_with(|| {
            entries.push(CutEntry {
                facet_address,
                action,
                selectors: Vec::new(),
            });
            entries.len() - 1
        });

        let selectors = &mut entries[idx].selectors;
        if !selectors.contains(&selector) {
            selectors.push(selector);
        }
    }

    entries
}

/// Builds the cut entries realizing a diff.
///
/// Adds and replaces are routed to the resolved address of their local facet.
/// Removals are routed to the zero address, but their remote facet must still be
/// resolvable, otherwise the remote state was fetched inconsistently. Any facet
/// without an address aborts the whole cut.
pub fn build_cut(
    diff: &Diff,
    addresses: &BTreeMap<String, Address>,
    remote: &DiamondState,
) -> Result<Vec<CutEntry>, DiamondError> {
    let mut changes = Vec::with_capacity(diff.add.len() + diff.replace.len() + diff.remove.len());

    for (action, functions) in [
        (FacetCutAction::Add, &diff.add),
        (FacetCutAction::Replace, &diff.replace),
    ] {
        for change in functions {
            let address = addresses.get(&change.facet).copied().ok_or_else(|| {
                DiamondError::UnresolvedFacetAddress {
                    facet: change.facet.clone(),
                    selector: change.selector,
                }
            })?;
            changes.push((address, action, change.selector));
        }
    }

    for change in &diff.remove {
        if remote.facet_address(&change.facet).is_none() {
            return Err(DiamondError::UnresolvedFacetAddress {
                facet: change.facet.clone(),
                selector: change.selector,
            });
        }
        changes.push((Address::ZERO, FacetCutAction::Remove, change.selector));
    }

    Ok(group_cut(changes))
}
