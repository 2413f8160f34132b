//! # Engine Module
//!
//! The stateful core of the perturbation generator: for every bonded term
//! of the morph topology it locates the structurally equivalent terms in
//! the initial and final end states, classifies the misses (dummy atom
//! involved versus topologically invalid mapping), applies the dummy-atom
//! substitution policy and accumulates the perturbation record.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - build options and the strategy switch
//! - **Matching** ([`matcher`]) - structural term lookup under the per-class
//!   atom-order equivalence relations
//! - **Policy** ([`policy`]) - dummy substitutions, emission predicate and
//!   consistency checks
//! - **Assembly** ([`builder`]) - the per-class driver loops and the
//!   unmapped-term reconcilers
//! - **Patching** ([`patch`]) - finite mass/element substitutions for dummies
//! - **Error Handling** ([`error`]) - the fatal-condition taxonomy

pub(crate) mod builder;
pub mod config;
pub mod error;
pub(crate) mod matcher;
pub mod patch;
pub(crate) mod policy;
