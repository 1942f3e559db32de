//! End-to-end reconciliation scenarios, from manifests and loupe results to cut entries

use std::{collections::BTreeMap, str::FromStr};

use alloy_primitives::{Address, Selector};
use diamond_core::{
    cut::build_cut,
    manifest::Manifest,
    reconciler::Reconciler,
    state::{DiamondState, RemoteFacet},
    types::{CutEntry, Facet, FacetCutAction, FacetKind},
};
use eyre::Result;

// -----------
// | Helpers |
// -----------

/// Parse a hex selector
fn sel(hex: &str) -> Selector {
    Selector::from_str(hex).unwrap()
}

/// A remote facet owning the given selectors
fn remote_facet(name: &str, address: Address, selectors: &[&str]) -> RemoteFacet {
    RemoteFacet {
        name: name.to_string(),
        address,
        selectors: selectors.iter().map(|s| sel(s)).collect(),
    }
}

/// A manifest assigning each key to a facet, with the given facet records
fn manifest(selectors: &[(&str, &str)], contracts: Vec<Facet>) -> Manifest {
    let mut manifest = Manifest::default();
    for facet in contracts {
        manifest.insert_facet(facet);
    }
    for (key, facet) in selectors {
        manifest
            .function_selectors
            .insert(key.to_string(), facet.to_string());
    }
    manifest
}

// ---------
// | Tests |
// ---------

#[test]
fn test_new_local_facet_is_added_and_deployed() -> Result<()> {
    let remote = DiamondState::from_remote_facets([remote_facet(
        "FacetA",
        Address::with_last_byte(1),
        &["0xAAAAAAAA"],
    )])?;
    let local = manifest(
        &[("0xAAAAAAAA", "FacetA"), ("0xBBBBBBBB", "FacetB")],
        vec![
            Facet::remote("FacetA", Address::with_last_byte(1)),
            Facet::local("FacetB", vec![]),
        ],
    )
    .to_state()?;

    let reconciler = Reconciler::new(&remote, &local);
    let add = reconciler.functions_to_add();
    assert_eq!(add.len(), 1);
    assert_eq!(add[0].selector, sel("0xBBBBBBBB"));
    assert_eq!(add[0].facet, "FacetB");
    assert!(reconciler.functions_to_remove().is_empty());
    assert!(reconciler.functions_to_replace().is_empty());

    let deploy = reconciler.contracts_to_deploy();
    assert_eq!(deploy.len(), 1);
    assert_eq!(deploy[0].name, "FacetB");
    assert_eq!(deploy[0].kind, FacetKind::Local);

    Ok(())
}

#[test]
fn test_changed_owner_is_replaced_with_local_facet() -> Result<()> {
    let remote = DiamondState::from_remote_facets([remote_facet(
        "FacetX",
        Address::with_last_byte(0x10),
        &["0xCCCCCCCC"],
    )])?;
    let local = manifest(
        &[("0xCCCCCCCC", "FacetY")],
        vec![
            Facet::remote("FacetX", Address::with_last_byte(0x10)),
            Facet::remote("FacetY", Address::with_last_byte(0x11)),
        ],
    )
    .to_state()?;

    let diff = Reconciler::new(&remote, &local).diff();
    assert!(diff.add.is_empty());
    assert!(diff.remove.is_empty());
    assert!(diff.deploy.is_empty());
    assert_eq!(diff.replace.len(), 1);
    assert_eq!(diff.replace[0].selector, sel("0xCCCCCCCC"));
    assert_eq!(diff.replace[0].facet, "FacetY");

    Ok(())
}

#[test]
fn test_omitted_selector_is_removed_from_remote_facet() -> Result<()> {
    let remote = DiamondState::from_remote_facets([remote_facet(
        "FacetZ",
        Address::with_last_byte(0x20),
        &["0xDDDDDDDD"],
    )])?;
    let local = manifest(&[], vec![]).to_state()?;

    let diff = Reconciler::new(&remote, &local).diff();
    assert!(diff.add.is_empty());
    assert!(diff.replace.is_empty());
    assert_eq!(diff.remove.len(), 1);
    assert_eq!(diff.remove[0].selector, sel("0xDDDDDDDD"));
    assert_eq!(diff.remove[0].facet, "FacetZ");

    Ok(())
}

#[test]
fn test_every_selector_lands_in_exactly_one_bucket() -> Result<()> {
    let remote = DiamondState::from_remote_facets([
        remote_facet(
            "Kept",
            Address::with_last_byte(1),
            &["0x00000001", "0x00000002"],
        ),
        remote_facet(
            "Old",
            Address::with_last_byte(2),
            &["0x00000003", "0x00000004"],
        ),
    ])?;
    let local = manifest(
        &[
            ("0x00000001", "Kept"),
            ("0x00000002", "Kept"),
            ("0x00000003", "New"),
            ("0x00000005", "New"),
            ("0x00000006", "New"),
        ],
        vec![
            Facet::remote("Kept", Address::with_last_byte(1)),
            Facet::local("New", vec![]),
        ],
    )
    .to_state()?;

    let diff = Reconciler::new(&remote, &local).diff();
    let selectors = |changes: &[diamond_core::types::FunctionChange]| {
        changes.iter().map(|c| c.selector).collect::<Vec<_>>()
    };

    assert_eq!(selectors(&diff.add), vec![sel("0x00000005"), sel("0x00000006")]);
    assert_eq!(selectors(&diff.replace), vec![sel("0x00000003")]);
    assert_eq!(selectors(&diff.remove), vec![sel("0x00000004")]);
    // Unchanged selectors appear nowhere
    for unchanged in [sel("0x00000001"), sel("0x00000002")] {
        assert!(!selectors(&diff.add).contains(&unchanged));
        assert!(!selectors(&diff.replace).contains(&unchanged));
        assert!(!selectors(&diff.remove).contains(&unchanged));
    }
    // A facet with several new selectors is deployed once
    assert_eq!(diff.deploy.len(), 1);
    assert_eq!(diff.deploy[0].name, "New");

    Ok(())
}

#[test]
fn test_local_facet_already_on_chain_is_not_redeployed() -> Result<()> {
    let remote = DiamondState::from_remote_facets([remote_facet(
        "Facet",
        Address::with_last_byte(1),
        &["0x00000001"],
    )])?;
    let local = manifest(
        &[("0x00000001", "Facet")],
        vec![Facet::local("Facet", vec![])],
    )
    .to_state()?;

    assert!(Reconciler::new(&remote, &local)
        .contracts_to_deploy()
        .is_empty());

    Ok(())
}

#[test]
fn test_readded_local_facet_is_redeployed_and_replaced() -> Result<()> {
    let on_chain = Address::with_last_byte(1);
    let rebuilt = Address::with_last_byte(2);

    // `add --local` cleared the facet's address, so the loupe result is named as the
    // explorer reports it and then keyed against the manifest
    let local_manifest = manifest(&[("0x00000001", "F")], vec![Facet::local("F", vec![])]);
    let name = local_manifest.remote_facet_key("F".to_string(), on_chain);
    let remote =
        DiamondState::from_remote_facets([remote_facet(&name, on_chain, &["0x00000001"])])?;
    let local = local_manifest.to_state()?;

    let reconciler = Reconciler::new(&remote, &local);
    let diff = reconciler.diff();
    assert!(!diff.is_empty());
    assert_eq!(diff.deploy.len(), 1);
    assert_eq!(diff.deploy[0].name, "F");
    assert!(diff.add.is_empty() && diff.remove.is_empty());
    assert_eq!(diff.replace.len(), 1);
    assert_eq!(diff.replace[0].facet, "F");

    let addresses = reconciler.resolve_addresses(&[("F".to_string(), rebuilt)]);
    let cut = build_cut(&diff, &addresses, &remote)?;
    assert_eq!(
        cut,
        vec![CutEntry {
            facet_address: rebuilt,
            action: FacetCutAction::Replace,
            selectors: vec![sel("0x00000001")],
        }]
    );

    Ok(())
}

#[test]
fn test_mismatched_record_name_fails_before_deployment() {
    let mut local = Manifest::default();
    local
        .contracts
        .insert("FacetB".to_string(), Facet::local("Other", vec![]));
    local
        .function_selectors
        .insert("0x00000001".to_string(), "FacetB".to_string());

    assert!(local.to_state().is_err());
}

#[test]
fn test_signature_keys_compare_by_selector() -> Result<()> {
    // `transfer(address,uint256)` is 0xa9059cbb on chain
    let remote = DiamondState::from_remote_facets([remote_facet(
        "Token",
        Address::with_last_byte(1),
        &["0xa9059cbb"],
    )])?;
    let local = manifest(
        &[
            ("transfer(address,uint256)", "Token"),
            ("transfer(address,uint256,bytes)", "Token"),
        ],
        vec![Facet::remote("Token", Address::with_last_byte(1))],
    )
    .to_state()?;

    let diff = Reconciler::new(&remote, &local).diff();
    assert!(diff.remove.is_empty());
    assert!(diff.replace.is_empty());
    assert_eq!(diff.add.len(), 1);
    assert_eq!(
        diff.add[0].signature.as_deref(),
        Some("transfer(address,uint256,bytes)")
    );

    Ok(())
}

#[test]
fn test_full_cut_after_deployment() -> Result<()> {
    let old = Address::with_last_byte(0xa);
    let existing = Address::with_last_byte(0xb);
    let deployed = Address::with_last_byte(0xc);

    let remote = DiamondState::from_remote_facets([
        remote_facet("OldFacet", old, &["0x00000001", "0x00000002"]),
        remote_facet("Existing", existing, &["0x00000003"]),
    ])?;
    let local = manifest(
        &[
            ("0x00000001", "NewFacet"),
            ("0x00000003", "Existing"),
            ("0x00000004", "NewFacet"),
            ("0x00000005", "Existing"),
        ],
        vec![
            Facet::remote("Existing", existing),
            Facet::local("NewFacet", vec![]),
        ],
    )
    .to_state()?;

    let reconciler = Reconciler::new(&remote, &local);
    let diff = reconciler.diff();
    assert_eq!(diff.deploy.len(), 1);

    let addresses = reconciler.resolve_addresses(&[("NewFacet".to_string(), deployed)]);
    let cut = build_cut(&diff, &addresses, &remote)?;

    assert_eq!(
        cut,
        vec![
            CutEntry {
                facet_address: deployed,
                action: FacetCutAction::Add,
                selectors: vec![sel("0x00000004")],
            },
            CutEntry {
                facet_address: existing,
                action: FacetCutAction::Add,
                selectors: vec![sel("0x00000005")],
            },
            CutEntry {
                facet_address: deployed,
                action: FacetCutAction::Replace,
                selectors: vec![sel("0x00000001")],
            },
            CutEntry {
                facet_address: Address::ZERO,
                action: FacetCutAction::Remove,
                selectors: vec![sel("0x00000002")],
            },
        ]
    );

    Ok(())
}

#[test]
fn test_cut_without_deployment_fails_for_local_facet() -> Result<()> {
    let remote = DiamondState::default();
    let local = manifest(
        &[("0x00000001", "Pending")],
        vec![Facet::local("Pending", vec![])],
    )
    .to_state()?;

    let reconciler = Reconciler::new(&remote, &local);
    let res = build_cut(&reconciler.diff(), &reconciler.resolve_addresses(&[]), &remote);
    assert!(res.is_err());

    Ok(())
}

#[test]
fn test_rediff_is_stable() -> Result<()> {
    let remote = DiamondState::from_remote_facets([remote_facet(
        "A",
        Address::with_last_byte(1),
        &["0x00000001", "0x00000002"],
    )])?;
    let local = manifest(
        &[("0x00000002", "B"), ("0x00000003", "B")],
        vec![
            Facet::remote("A", Address::with_last_byte(1)),
            Facet::local("B", vec![]),
        ],
    )
    .to_state()?;

    let first = Reconciler::new(&remote, &local).diff();
    let second = Reconciler::new(&remote, &local).diff();
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_manifest_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("diamond.json");

    let mut original = Manifest::for_diamond(Address::with_last_byte(0x42));
    original.insert_facet(Facet::local("Facet", vec!["LibA".to_string()]));
    original.insert_facet(Facet::remote("Other", Address::with_last_byte(7)));
    original
        .function_selectors
        .insert("doThing(uint256[],(address,bool))".to_string(), "Facet".to_string());
    original
        .function_selectors
        .insert("0xdeadbeef".to_string(), "Other".to_string());

    original.save(&path)?;
    let loaded = Manifest::load(&path)?;
    assert_eq!(original, loaded);

    // No scratch file is left behind
    let entries: BTreeMap<_, _> = std::fs::read_dir(dir.path())?
        .map(|e| (e.unwrap().file_name(), ()))
        .collect();
    assert_eq!(entries.len(), 1);

    Ok(())
}
