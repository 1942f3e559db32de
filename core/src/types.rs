//! Type definitions shared by the manifest, the reconciler, and the cut builder

use std::fmt::{self, Display};

use alloy_primitives::{Address, Selector};
use serde::{Deserialize, Serialize};

/// Where a facet's bytecode comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    /// Already deployed, only needs to be registered on the Diamond
    Remote,
    /// Must be deployed from a local build artifact before it can be cut in
    Local,
}

/// A named logic contract whose functions are exposed through the Diamond
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// The unique name of the facet
    pub name: String,
    /// The deployed address of the facet, absent until deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Whether the facet is deployed already or built locally
    #[serde(rename = "type")]
    pub kind: FacetKind,
    /// Names of the libraries that must be linked into the facet before deployment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

impl Facet {
    /// A facet that is already deployed at the given address
    pub fn remote(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address: Some(address),
            kind: FacetKind::Remote,
            links: Vec::new(),
        }
    }

    /// A facet pending deployment from a local artifact
    pub fn local(name: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            kind: FacetKind::Local,
            links,
        }
    }
}

/// The kind of change a cut entry applies to its selectors
///
/// The discriminants match the `FacetCutAction` enum of EIP-2535.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FacetCutAction {
    /// Register new selectors
    Add = 0,
    /// Point existing selectors at a different facet
    Replace = 1,
    /// Unregister selectors
    Remove = 2,
}

impl Display for FacetCutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetCutAction::Add => write!(f, "add"),
            FacetCutAction::Replace => write!(f, "replace"),
            FacetCutAction::Remove => write!(f, "remove"),
        }
    }
}

/// A single entry of a `diamondCut` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutEntry {
    /// The facet the selectors are routed to, the zero address for removals
    pub facet_address: Address,
    /// The action applied to the selectors
    pub action: FacetCutAction,
    /// The selectors, in order of discovery
    pub selectors: Vec<Selector>,
}

/// A selector whose ownership must change, and the facet involved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionChange {
    /// The selector being changed
    pub selector: Selector,
    /// The facet the change concerns: the target facet for adds and replaces,
    /// the currently registered facet for removals
    pub facet: String,
    /// The human readable signature of the function, when known
    pub signature: Option<String>,
}

impl Display for FunctionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.signature {
            Some(signature) => write!(f, "{} {signature} ({})", self.selector, self.facet),
            None => write!(f, "{} ({})", self.selector, self.facet),
        }
    }
}
