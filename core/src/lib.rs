//! The data model and reconciliation logic for managing an EIP-2535 Diamond proxy.
//!
//! A [`manifest::Manifest`] declares which facet should own which function selector.
//! Both the manifest and the selectors observed on a live Diamond are normalized into
//! a [`state::DiamondState`], and the [`reconciler::Reconciler`] computes the changes
//! needed to move the on-chain state to the declared one. The [`cut`] module batches
//! those changes into the entries accepted by the Diamond's `diamondCut` method.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cut;
pub mod errors;
pub mod introspection;
pub mod manifest;
pub mod reconciler;
pub mod selector;
pub mod state;
pub mod types;
