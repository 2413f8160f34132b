//! # pertgen Core Library
//!
//! A library for generating perturbation topology files for alchemical
//! free-energy molecular dynamics. Given a molecule's initial and final
//! chemical states plus an atom mapping between them, it reconciles the
//! three parallel force-field descriptions (initial, final and the
//! constructed morph) and decides, for every bond, angle, dihedral and
//! improper, how its parameters interpolate across the simulation's lambda
//! coordinate.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer separation:
//!
//! - **[`core`]: The Foundation.** Stateless data models (topologies, atoms,
//!   the atom mapping), pure potential representations with their equality
//!   tests, and the perturbation-file writer.
//!
//! - **[`engine`]: The Logic Core.** The degree-of-freedom matcher, the
//!   dummy-atom policy engine and the record builder, together with the
//!   fatal-condition taxonomy for topologically invalid atom mappings.
//!
//! - **[`workflows`]: The Public API.** The complete build procedure: match,
//!   classify, reconcile and write, as a single entry point.

pub mod core;
pub mod engine;
pub mod workflows;
