//! Enumeration of the functions a facet exposes, from its ABI

use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, Selector};

use crate::selector::{canonical_signature, derive_selector};

/// A function exposed by a facet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacetFunction {
    /// The function name
    pub name: String,
    /// The canonical signature, `name(type1,type2,...)`
    pub signature: String,
    /// The selector derived from the signature
    pub selector: Selector,
}

impl From<&Function> for FacetFunction {
    fn from(function: &Function) -> Self {
        let arg_types: Vec<String> = function
            .inputs
            .iter()
            .map(|param| param.selector_type().into_owned())
            .collect();

        Self {
            name: function.name.clone(),
            signature: canonical_signature(&function.name, &arg_types),
            selector: derive_selector(&function.name, &arg_types),
        }
    }
}

/// The functions of a facet deployed at a known address
#[derive(Clone, Debug)]
pub struct FacetIntrospection {
    /// The address of the facet
    pub address: Address,
    /// The functions the facet exposes
    pub functions: Vec<FacetFunction>,
}

impl FacetIntrospection {
    /// Enumerates the functions in a deployed facet's ABI
    pub fn new(address: Address, abi: &JsonAbi) -> Self {
        Self {
            address,
            functions: functions_from_abi(abi),
        }
    }

    /// Resolves a function name or full signature to its selector.
    ///
    /// A bare name only resolves if it is not overloaded.
    pub fn selector_of(&self, name_or_signature: &str) -> Option<Selector> {
        if let Some(function) = self
            .functions
            .iter()
            .find(|f| f.signature == name_or_signature)
        {
            return Some(function.selector);
        }

        let mut by_name = self.functions.iter().filter(|f| f.name == name_or_signature);
        match (by_name.next(), by_name.next()) {
            (Some(function), None) => Some(function.selector),
            _ => None,
        }
    }
}

/// Lists every function in an ABI with its derived selector
pub fn functions_from_abi(abi: &JsonAbi) -> Vec<FacetFunction> {
    abi.functions().map(FacetFunction::from).collect()
}
