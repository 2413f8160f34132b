//! # Core Module
//!
//! Stateless building blocks of the perturbation generator: the data models
//! for atoms, topologies and the atom mapping, the potential representations
//! with their equality tests, and the perturbation-file writer.
//!
//! Nothing in this module carries build state; the matching and
//! classification logic lives in [`crate::engine`].

pub mod forcefield;
pub mod io;
pub mod models;
