//! Computes the changes needed to move a Diamond from its observed state to its
//! declared state.
//!
//! Both states are keyed by selector value, never by function name, so overloads
//! are distinct entries. Iteration follows selector order, which makes every
//! output deterministic for a given pair of states.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::Address;

use crate::{
    state::DiamondState,
    types::{Facet, FacetKind, FunctionChange},
};

/// The full set of changes between two states
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    /// Selectors declared locally but not registered on chain
    pub add: Vec<FunctionChange>,
    /// Selectors registered on chain to a different facet than declared
    pub replace: Vec<FunctionChange>,
    /// Selectors registered on chain but not declared locally
    pub remove: Vec<FunctionChange>,
    /// Local facets that must be deployed before the cut
    pub deploy: Vec<Facet>,
}

impl Diff {
    /// Whether the two states already agree
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.replace.is_empty() && self.remove.is_empty()
    }
}

/// Compares an observed (remote) state against a declared (local) state
#[derive(Clone, Copy, Debug)]
pub struct Reconciler<'a> {
    /// The state observed on chain
    remote: &'a DiamondState,
    /// The state declared in the manifest
    local: &'a DiamondState,
}

impl<'a> Reconciler<'a> {
    /// Constructor
    pub fn new(remote: &'a DiamondState, local: &'a DiamondState) -> Self {
        Self { remote, local }
    }

    /// Every selector present locally but absent remotely, tagged with the local facet
    pub fn functions_to_add(&self) -> Vec<FunctionChange> {
        self.local
            .selectors()
            .iter()
            .filter(|(selector, _)| self.remote.owner(selector).is_none())
            .map(|(selector, owner)| FunctionChange {
                selector: *selector,
                facet: owner.facet.clone(),
                signature: owner.signature.clone(),
            })
            .collect()
    }

    /// Every selector present remotely but absent locally, tagged with the remote facet
    pub fn functions_to_remove(&self) -> Vec<FunctionChange> {
        self.remote
            .selectors()
            .iter()
            .filter(|(selector, _)| self.local.owner(selector).is_none())
            .map(|(selector, owner)| FunctionChange {
                selector: *selector,
                facet: owner.facet.clone(),
                signature: owner.signature.clone(),
            })
            .collect()
    }

    /// Every selector present in both states whose owning facet differs, tagged with
    /// the local facet
    pub fn functions_to_replace(&self) -> Vec<FunctionChange> {
        self.local
            .selectors()
            .iter()
            .filter_map(|(selector, local_owner)| {
                let remote_owner = self.remote.owner(selector)?;
                (remote_owner.facet != local_owner.facet).then(|| FunctionChange {
                    selector: *selector,
                    facet: local_owner.facet.clone(),
                    signature: local_owner
                        .signature
                        .clone()
                        .or_else(|| remote_owner.signature.clone()),
                })
            })
            .collect()
    }

    /// Every local facet referenced by the declared selectors that has no address
    /// resolvable from the remote state, each listed once in order of first reference
    pub fn contracts_to_deploy(&self) -> Vec<Facet> {
        let mut seen = BTreeSet::new();
        let mut deploy = Vec::new();

        for owner in self.local.selectors().values() {
            if !seen.insert(owner.facet.as_str()) {
                continue;
            }

            // `DiamondState` guarantees every owner has a record
            let Some(facet) = self.local.facet(&owner.facet) else {
                continue;
            };
            if facet.kind == FacetKind::Local && self.remote.facet_address(&facet.name).is_none()
            {
                deploy.push(facet.clone());
            }
        }

        deploy
    }

    /// Computes all changes at once
    pub fn diff(&self) -> Diff {
        Diff {
            add: self.functions_to_add(),
            replace: self.functions_to_replace(),
            remove: self.functions_to_remove(),
            deploy: self.contracts_to_deploy(),
        }
    }

    /// Resolves the address of every facet a cut may target.
    ///
    /// Remote addresses are overlaid with the addresses recorded in the manifest, then
    /// with the addresses of facets deployed during this run.
    pub fn resolve_addresses(
        &self,
        deployed: &[(String, Address)],
    ) -> BTreeMap<String, Address> {
        let recorded = self
            .remote
            .contracts()
            .values()
            .chain(self.local.contracts().values())
            .filter_map(|facet| Some((facet.name.clone(), facet.address?)));

        recorded
            .chain(deployed.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Selector;

    use crate::state::RemoteFacet;

    use super::*;

    #[test]
    fn test_identical_states_produce_no_changes() {
        let remote = DiamondState::from_remote_facets([RemoteFacet {
            name: "A".to_string(),
            address: Address::repeat_byte(1),
            selectors: vec![Selector::from([1; 4]), Selector::from([2; 4])],
        }])
        .unwrap();
        let local = remote.clone();

        let diff = Reconciler::new(&remote, &local).diff();
        assert!(diff.is_empty());
        assert!(diff.deploy.is_empty());
    }

    #[test]
    fn test_resolve_addresses_prefers_deployed() {
        let remote = DiamondState::from_remote_facets([RemoteFacet {
            name: "A".to_string(),
            address: Address::repeat_byte(1),
            selectors: vec![Selector::from([1; 4])],
        }])
        .unwrap();
        let local = DiamondState::default();

        let addresses = Reconciler::new(&remote, &local)
            .resolve_addresses(&[("A".to_string(), Address::repeat_byte(9))]);
        assert_eq!(addresses["A"], Address::repeat_byte(9));
    }
}
