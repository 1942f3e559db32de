//! Derivation of function selectors from function signatures

use std::str::FromStr;

use alloy_primitives::{keccak256, Selector};

use crate::errors::DiamondError;

/// The number of bytes in a function selector
pub const SELECTOR_LEN: usize = 4;

/// Builds the canonical signature `name(type1,type2,...)` of a function
pub fn canonical_signature<S: AsRef<str>>(name: &str, arg_types: &[S]) -> String {
    let args: Vec<&str> = arg_types.iter().map(AsRef::as_ref).collect();
    format!("{name}({})", args.join(","))
}

/// Derives the selector of a function from its name and ordered argument types
pub fn derive_selector<S: AsRef<str>>(name: &str, arg_types: &[S]) -> Selector {
    selector_from_signature(&canonical_signature(name, arg_types))
}

/// Hashes a canonical signature and truncates it to a selector.
///
/// The signature is assumed to already be in canonical form, i.e. no whitespace
/// and no argument names.
pub fn selector_from_signature(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..SELECTOR_LEN])
}

/// Parses a manifest key into a selector.
///
/// Keys are either raw hex selectors (`0x12345678`) or function signatures
/// (`transfer(address,uint256)`). Whitespace inside a signature is ignored.
pub fn parse_selector_key(key: &str) -> Result<Selector, DiamondError> {
    let key = key.trim();
    if key.starts_with("0x") && !key.contains('(') {
        return Selector::from_str(key).map_err(|_| DiamondError::InvalidSelector(key.to_string()));
    }

    let signature: String = key.chars().filter(|c| !c.is_whitespace()).collect();
    let open = signature
        .find('(')
        .ok_or_else(|| DiamondError::InvalidSelector(key.to_string()))?;
    let name = &signature[..open];
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid_name || !signature.ends_with(')') {
        return Err(DiamondError::InvalidSelector(key.to_string()));
    }

    Ok(selector_from_signature(&signature))
}

/// Returns whether the key is a function signature rather than a raw selector
pub fn is_signature_key(key: &str) -> bool {
    key.contains('(')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        // Selectors taken from the ERC20 and EIP-2535 interfaces
        assert_eq!(
            derive_selector("transfer", &["address", "uint256"]),
            Selector::from_str("0xa9059cbb").unwrap()
        );
        assert_eq!(
            derive_selector::<&str>("facets", &[]),
            Selector::from_str("0x7a0ed627").unwrap()
        );
        assert_eq!(
            derive_selector("diamondCut", &["(address,uint8,bytes4[])[]", "address", "bytes"]),
            Selector::from_str("0x1f931c1c").unwrap()
        );
    }

    #[test]
    fn test_argument_types_distinguish_selectors() {
        let a = derive_selector("mint", &["uint256"]);
        let b = derive_selector("mint", &["address", "uint256"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_hex_key() {
        let selector = parse_selector_key("0xAAAAAAAA").unwrap();
        assert_eq!(selector, Selector::from([0xaa; 4]));
    }

    #[test]
    fn test_parse_signature_key_ignores_whitespace() {
        let selector = parse_selector_key("transfer(address, uint256)").unwrap();
        assert_eq!(selector, Selector::from_str("0xa9059cbb").unwrap());
    }

    #[test]
    fn test_parse_invalid_keys() {
        assert!(parse_selector_key("0x1234").is_err());
        assert!(parse_selector_key("transfer").is_err());
        assert!(parse_selector_key("(address)").is_err());
        assert!(parse_selector_key("transfer(address").is_err());
    }
}
