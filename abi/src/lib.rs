//! Solidity interfaces of the EIP-2535 Diamond standard, used to introspect and
//! upgrade a deployed Diamond

#![deny(missing_docs)]

use alloy::{
    primitives::{Address, Bytes},
    sol,
    sol_types::SolValue,
};
use diamond_core::types::{CutEntry, FacetCutAction};

sol! {
    #![sol(all_derives)]
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IDiamondCut {
        enum FacetCutAction {
            Add,
            Replace,
            Remove
        }

        struct FacetCut {
            address facetAddress;
            FacetCutAction action;
            bytes4[] functionSelectors;
        }

        function diamondCut(FacetCut[] calldata _diamondCut, address _init, bytes calldata _calldata) external;

        event DiamondCut(FacetCut[] _diamondCut, address _init, bytes _calldata);
    }
}

sol! {
    #![sol(all_derives)]
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IDiamondLoupe {
        struct Facet {
            address facetAddress;
            bytes4[] functionSelectors;
        }

        function facets() external view returns (Facet[] memory facets_);
        function facetFunctionSelectors(address _facet) external view returns (bytes4[] memory facetFunctionSelectors_);
        function facetAddresses() external view returns (address[] memory facetAddresses_);
        function facetAddress(bytes4 _functionSelector) external view returns (address facetAddress_);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC173 {
        function owner() external view returns (address owner_);
        function transferOwnership(address _newOwner) external;
    }
}

impl From<FacetCutAction> for IDiamondCut::FacetCutAction {
    fn from(action: FacetCutAction) -> Self {
        match action {
            FacetCutAction::Add => IDiamondCut::FacetCutAction::Add,
            FacetCutAction::Replace => IDiamondCut::FacetCutAction::Replace,
            FacetCutAction::Remove => IDiamondCut::FacetCutAction::Remove,
        }
    }
}

impl From<&CutEntry> for IDiamondCut::FacetCut {
    fn from(entry: &CutEntry) -> Self {
        Self {
            facetAddress: entry.facet_address,
            action: entry.action.into(),
            functionSelectors: entry.selectors.clone(),
        }
    }
}

/// ABI-encodes the arguments of the Diamond constructor:
/// `constructor(address _contractOwner, address _diamondCutFacet, address _diamondLoupeFacet)`
pub fn diamond_constructor_args(owner: Address, cut_facet: Address, loupe_facet: Address) -> Bytes {
    (owner, cut_facet, loupe_facet).abi_encode_params().into()
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::Selector,
        sol_types::{SolCall, SolValue},
    };

    use super::*;

    #[test]
    fn test_interface_selectors() {
        assert_eq!(
            IDiamondCut::diamondCutCall::SELECTOR,
            [0x1f, 0x93, 0x1c, 0x1c]
        );
        assert_eq!(IDiamondLoupe::facetsCall::SELECTOR, [0x7a, 0x0e, 0xd6, 0x27]);
        assert_eq!(
            IDiamondLoupe::facetAddressesCall::SELECTOR,
            [0x52, 0xef, 0x6b, 0x2c]
        );
    }

    #[test]
    fn test_cut_entry_conversion() {
        let entry = CutEntry {
            facet_address: Address::ZERO,
            action: FacetCutAction::Remove,
            selectors: vec![Selector::from([1; 4]), Selector::from([2; 4])],
        };

        let cut = IDiamondCut::FacetCut::from(&entry);
        assert_eq!(cut.facetAddress, Address::ZERO);
        assert_eq!(cut.action, IDiamondCut::FacetCutAction::Remove);
        assert_eq!(cut.functionSelectors, entry.selectors);

        // The action is encoded as its EIP-2535 discriminant
        let encoded = cut.abi_encode_params();
        assert_eq!(encoded[32 * 2 - 1], FacetCutAction::Remove as u8);
    }

    #[test]
    fn test_constructor_args_layout() {
        let owner = Address::repeat_byte(1);
        let encoded = diamond_constructor_args(owner, Address::repeat_byte(2), Address::repeat_byte(3));
        assert_eq!(encoded.len(), 3 * 32);
        assert_eq!(&encoded[12..32], owner.as_slice());
    }
}
