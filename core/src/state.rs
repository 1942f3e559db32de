//! The normalized selector -> facet mapping that both the declared and the observed
//! Diamond state are reduced to before reconciliation

use std::collections::{btree_map::Entry, BTreeMap};

use alloy_primitives::{Address, Selector};

use crate::{errors::DiamondError, types::Facet};

/// The facet owning a selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorOwner {
    /// The name of the owning facet
    pub facet: String,
    /// The signature the selector was derived from, if known
    pub signature: Option<String>,
}

/// A facet as reported by the Diamond's loupe
#[derive(Clone, Debug)]
pub struct RemoteFacet {
    /// The name resolved for the facet
    pub name: String,
    /// The address the facet is deployed at
    pub address: Address,
    /// The selectors the Diamond routes to the facet
    pub selectors: Vec<Selector>,
}

/// A selector ownership map plus the records of every facet it references.
///
/// Every selector is guaranteed to be owned by a facet present in the contracts map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiamondState {
    /// Selector ownership, exclusive per selector
    selectors: BTreeMap<Selector, SelectorOwner>,
    /// Facet records keyed by name
    contracts: BTreeMap<String, Facet>,
}

impl DiamondState {
    /// Builds a state, failing if a selector references an unknown facet or a facet
    /// record is keyed under a name other than its own
    pub fn new(
        selectors: BTreeMap<Selector, SelectorOwner>,
        contracts: BTreeMap<String, Facet>,
    ) -> Result<Self, DiamondError> {
        if let Some((key, facet)) = contracts.iter().find(|(key, facet)| **key != facet.name) {
            return Err(DiamondError::FacetNameMismatch {
                key: key.clone(),
                name: facet.name.clone(),
            });
        }

        if let Some((selector, owner)) = selectors
            .iter()
            .find(|(_, owner)| !contracts.contains_key(&owner.facet))
        {
            return Err(DiamondError::UnknownFacet {
                selector: *selector,
                facet: owner.facet.clone(),
            });
        }

        Ok(Self {
            selectors,
            contracts,
        })
    }

    /// Builds the observed state from the facets reported by a live Diamond.
    ///
    /// All facets are of kind [`FacetKind::Remote`](crate::types::FacetKind::Remote).
    /// If two distinct addresses resolve to the same name, the later one is keyed as
    /// `name@address`.
    pub fn from_remote_facets(
        facets: impl IntoIterator<Item = RemoteFacet>,
    ) -> Result<Self, DiamondError> {
        let mut selectors = BTreeMap::new();
        let mut contracts: BTreeMap<String, Facet> = BTreeMap::new();

        for RemoteFacet {
            name,
            address,
            selectors: facet_selectors,
        } in facets
        {
            let name = match contracts.get(&name) {
                Some(existing) if existing.address != Some(address) => {
                    format!("{name}@{address}")
                }
                _ => name,
            };
            contracts
                .entry(name.clone())
                .or_insert_with(|| Facet::remote(name.clone(), address));

            for selector in facet_selectors {
                match selectors.entry(selector) {
                    Entry::Vacant(entry) => {
                        entry.insert(SelectorOwner {
                            facet: name.clone(),
                            signature: None,
                        });
                    }
                    Entry::Occupied(entry) => {
                        return Err(DiamondError::DuplicateSelector {
                            selector,
                            first: entry.get().facet.clone(),
                            second: name,
                        })
                    }
                }
            }
        }

        Self::new(selectors, contracts)
    }

    /// The selector ownership map
    pub fn selectors(&self) -> &BTreeMap<Selector, SelectorOwner> {
        &self.selectors
    }

    /// The facet records
    pub fn contracts(&self) -> &BTreeMap<String, Facet> {
        &self.contracts
    }

    /// The owner of a selector
    pub fn owner(&self, selector: &Selector) -> Option<&SelectorOwner> {
        self.selectors.get(selector)
    }

    /// The record of a facet
    pub fn facet(&self, name: &str) -> Option<&Facet> {
        self.contracts.get(name)
    }

    /// The address a facet is deployed at, if any
    pub fn facet_address(&self, name: &str) -> Option<Address> {
        self.facet(name).and_then(|facet| facet.address)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::FacetKind;

    use super::*;

    #[test]
    fn test_unknown_facet_rejected() {
        let mut selectors = BTreeMap::new();
        selectors.insert(
            Selector::from([1; 4]),
            SelectorOwner {
                facet: "Ghost".to_string(),
                signature: None,
            },
        );

        let err = DiamondState::new(selectors, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, DiamondError::UnknownFacet { facet, .. } if facet == "Ghost"));
    }

    #[test]
    fn test_record_under_foreign_key_rejected() {
        let contracts = BTreeMap::from([("FacetB".to_string(), Facet::local("Other", vec![]))]);

        let err = DiamondState::new(BTreeMap::new(), contracts).unwrap_err();
        assert!(matches!(
            err,
            DiamondError::FacetNameMismatch { key, name } if key == "FacetB" && name == "Other"
        ));
    }

    #[test]
    fn test_remote_facets_are_remote_kind() {
        let state = DiamondState::from_remote_facets([RemoteFacet {
            name: "LoupeFacet".to_string(),
            address: Address::repeat_byte(1),
            selectors: vec![Selector::from([1; 4]), Selector::from([2; 4])],
        }])
        .unwrap();

        assert_eq!(state.selectors().len(), 2);
        let facet = state.facet("LoupeFacet").unwrap();
        assert_eq!(facet.kind, FacetKind::Remote);
        assert_eq!(facet.address, Some(Address::repeat_byte(1)));
    }

    #[test]
    fn test_remote_selector_on_two_facets_rejected() {
        let res = DiamondState::from_remote_facets([
            RemoteFacet {
                name: "A".to_string(),
                address: Address::repeat_byte(1),
                selectors: vec![Selector::from([1; 4])],
            },
            RemoteFacet {
                name: "B".to_string(),
                address: Address::repeat_byte(2),
                selectors: vec![Selector::from([1; 4])],
            },
        ]);

        assert!(matches!(res, Err(DiamondError::DuplicateSelector { .. })));
    }

    #[test]
    fn test_remote_name_collision_disambiguated() {
        let state = DiamondState::from_remote_facets([
            RemoteFacet {
                name: "Facet".to_string(),
                address: Address::repeat_byte(1),
                selectors: vec![Selector::from([1; 4])],
            },
            RemoteFacet {
                name: "Facet".to_string(),
                address: Address::repeat_byte(2),
                selectors: vec![Selector::from([2; 4])],
            },
        ])
        .unwrap();

        assert_eq!(state.contracts().len(), 2);
        let second = format!("Facet@{}", Address::repeat_byte(2));
        assert_eq!(state.owner(&Selector::from([2; 4])).unwrap().facet, second);
    }
}
