//! # Core Models Module
//!
//! Fundamental data structures representing the three parallel force-field
//! descriptions a perturbation build reconciles.
//!
//! ## Key Components
//!
//! - [`atom`] - Per-atom identity, charge, LJ and type data, plus the dummy flag
//! - [`topology`] - Bonded-term lists (bonds, angles, dihedrals, impropers)
//! - [`mapping`] - The partial morph/final atom correspondence and its inverse
//! - [`elements`] - Static element data (atomic numbers, masses)
//! - [`ids`] - The per-topology atom index type
//!
//! All models are fully materialized before the matching algorithm runs and
//! are read-only for its duration.

pub mod atom;
pub mod elements;
pub mod ids;
pub mod mapping;
pub mod topology;
