//! The manifest file declaring which facet should own which function selector

use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    path::Path,
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    errors::DiamondError,
    introspection::FacetFunction,
    selector::{is_signature_key, parse_selector_key},
    state::{DiamondState, SelectorOwner},
    types::{Facet, FacetKind},
};

/// The suffix of the scratch file a manifest is written to before being moved into place
const TMP_SUFFIX: &str = "tmp";

/// The declared state of a Diamond, as persisted in the manifest file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Function key -> owning facet name. Keys are signatures or hex selectors
    #[serde(default)]
    pub function_selectors: BTreeMap<String, String>,
    /// Facet name -> facet record
    #[serde(default)]
    pub contracts: BTreeMap<String, Facet>,
    /// The address of the Diamond itself, once deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// The kind of the Diamond record, `remote` once deployed
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FacetKind>,
}

impl Manifest {
    /// An empty manifest for a freshly deployed Diamond
    pub fn for_diamond(address: Address) -> Self {
        Self {
            address: Some(address),
            kind: Some(FacetKind::Remote),
            ..Default::default()
        }
    }

    /// Parses a manifest from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, DiamondError> {
        serde_json::from_str(json).map_err(|e| DiamondError::ManifestParse(e.to_string()))
    }

    /// Serializes the manifest to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DiamondError> {
        serde_json::to_string_pretty(self).map_err(|e| DiamondError::ManifestParse(e.to_string()))
    }

    /// Reads the manifest at the given path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiamondError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| DiamondError::ManifestRead(format!("{}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Reads the manifest at the given path, or returns an empty one if it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DiamondError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the manifest to the given path.
    ///
    /// The file is replaced atomically, so an interrupted write leaves the previous
    /// manifest in place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DiamondError> {
        let path = path.as_ref();
        let mut json = self.to_json()?;
        json.push('\n');

        let tmp_path = path.with_extension(TMP_SUFFIX);
        fs::write(&tmp_path, json)
            .map_err(|e| DiamondError::ManifestWrite(format!("{}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, path)
            .map_err(|e| DiamondError::ManifestWrite(format!("{}: {e}", path.display())))
    }

    /// Inserts or replaces a facet record
    pub fn insert_facet(&mut self, facet: Facet) {
        self.contracts.insert(facet.name.clone(), facet);
    }

    /// Assigns the given functions to a facet.
    ///
    /// Any existing key resolving to the same selector is dropped first, so that
    /// selector ownership stays exclusive.
    pub fn add_functions(
        &mut self,
        facet: &str,
        functions: &[FacetFunction],
    ) -> Result<(), DiamondError> {
        let mut existing = BTreeMap::new();
        for key in self.function_selectors.keys() {
            existing.insert(parse_selector_key(key)?, key.clone());
        }

        for function in functions {
            if let Some(key) = existing.remove(&function.selector) {
                self.function_selectors.remove(&key);
            }
            self.function_selectors
                .insert(function.signature.clone(), facet.to_string());
        }

        Ok(())
    }

    /// Removes every function owned by the given facet, returning how many were removed
    pub fn remove_facet_functions(&mut self, facet: &str) -> usize {
        let before = self.function_selectors.len();
        self.function_selectors.retain(|_, owner| owner != facet);
        before - self.function_selectors.len()
    }

    /// Records that a facet has been deployed at the given address
    pub fn mark_deployed(&mut self, name: &str, address: Address) {
        match self.contracts.get_mut(name) {
            Some(facet) => {
                facet.address = Some(address);
                facet.kind = FacetKind::Remote;
            }
            None => self.insert_facet(Facet::remote(name, address)),
        }
    }

    /// The facet recorded at the given address, if any
    pub fn contract_at(&self, address: Address) -> Option<&Facet> {
        self.contracts
            .values()
            .find(|facet| facet.address == Some(address))
    }

    /// The key under which a facet found on the Diamond is tracked, given the name it
    /// was resolved to.
    ///
    /// A facet pending deployment under the same name is the declared replacement of
    /// the one on chain, so the on-chain facet is keyed as `name@address` instead.
    pub fn remote_facet_key(&self, name: String, address: Address) -> String {
        match self.contracts.get(&name) {
            Some(facet) if facet.kind == FacetKind::Local && facet.address.is_none() => {
                format!("{name}@{address}")
            }
            _ => name,
        }
    }

    /// Normalizes the manifest into a [`DiamondState`].
    ///
    /// Fails if a key is malformed, if two keys resolve to the same selector, if a
    /// selector is owned by a facet missing from the contracts map, or if a facet
    /// record is keyed under another name.
    pub fn to_state(&self) -> Result<DiamondState, DiamondError> {
        let mut selectors = BTreeMap::new();
        let mut keys: BTreeMap<_, &String> = BTreeMap::new();

        for (key, facet) in &self.function_selectors {
            let selector = parse_selector_key(key)?;
            match keys.entry(selector) {
                Entry::Vacant(entry) => {
                    entry.insert(key);
                }
                Entry::Occupied(entry) => {
                    return Err(DiamondError::DuplicateSelector {
                        selector,
                        first: entry.get().to_string(),
                        second: key.clone(),
                    })
                }
            }

            let signature = is_signature_key(key).then(|| key.clone());
            selectors.insert(
                selector,
                SelectorOwner {
                    facet: facet.clone(),
                    signature,
                },
            );
        }

        DiamondState::new(selectors, self.contracts.clone())
    }
}
