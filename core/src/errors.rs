//! Definitions of errors that can occur while loading, normalizing, or reconciling
//! Diamond state

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy_primitives::Selector;

/// Errors that can occur while working with Diamond manifests and state
#[derive(Debug)]
pub enum DiamondError {
    /// A selector is owned by a facet that has no entry in the facet map
    UnknownFacet {
        /// The selector referencing the facet
        selector: Selector,
        /// The name of the missing facet
        facet: String,
    },
    /// Two distinct function keys normalize to the same selector
    DuplicateSelector {
        /// The colliding selector
        selector: Selector,
        /// The key that first claimed the selector
        first: String,
        /// The key that collided with it
        second: String,
    },
    /// A facet record is filed under a different key than its own name
    FacetNameMismatch {
        /// The key the record is filed under
        key: String,
        /// The name the record carries
        name: String,
    },
    /// A manifest key is neither a function signature nor a 4-byte hex selector
    InvalidSelector(String),
    /// A facet slated for a cut has no resolvable on-chain address
    UnresolvedFacetAddress {
        /// The name of the unresolved facet
        facet: String,
        /// The selector whose cut entry needed the address
        selector: Selector,
    },
    /// Error reading the manifest file
    ManifestRead(String),
    /// Error writing the manifest file
    ManifestWrite(String),
    /// Error de/serializing the manifest JSON
    ManifestParse(String),
}

impl Display for DiamondError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DiamondError::UnknownFacet { selector, facet } => write!(
                f,
                "selector {selector} references facet `{facet}`, which is missing from the contracts map"
            ),
            DiamondError::DuplicateSelector {
                selector,
                first,
                second,
            } => write!(
                f,
                "`{first}` and `{second}` both resolve to selector {selector}"
            ),
            DiamondError::FacetNameMismatch { key, name } => write!(
                f,
                "contract `{key}` is recorded under the name `{name}`"
            ),
            DiamondError::InvalidSelector(key) => {
                write!(f, "`{key}` is not a function signature or 4-byte selector")
            }
            DiamondError::UnresolvedFacetAddress { facet, selector } => write!(
                f,
                "facet `{facet}` has no on-chain address, cannot cut selector {selector}"
            ),
            DiamondError::ManifestRead(s) => write!(f, "error reading manifest: {s}"),
            DiamondError::ManifestWrite(s) => write!(f, "error writing manifest: {s}"),
            DiamondError::ManifestParse(s) => write!(f, "error parsing manifest: {s}"),
        }
    }
}

impl Error for DiamondError {}
