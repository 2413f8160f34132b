//! # Workflows Module
//!
//! The public entry points of the library. A workflow ties the [`crate::core`]
//! models and the [`crate::engine`] matching logic together into one complete
//! procedure: building the perturbation record for a morph and writing it to
//! a perturbation file.

pub mod make_pert;
